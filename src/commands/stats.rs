use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, OnceLock, PoisonError,
    },
    time::Duration,
};

use poise::{command, CreateReply};
use simple_moving_average::{NoSumSMA, SMA};

use crate::{
    commands::{CommandResult, Context},
    message_utils::info_embed,
    store::store,
};

#[derive(Debug)]
pub struct Stats {
    secs_per_sync_cycle: Mutex<NoSumSMA<Duration, u32, 10>>,
    sync_cycles: AtomicU64,
}

impl Stats {
    fn new() -> Self {
        Self {
            secs_per_sync_cycle: Mutex::new(NoSumSMA::from_zero(Duration::ZERO)),
            sync_cycles: AtomicU64::new(0),
        }
    }
    pub fn secs_per_sync_cycle(&self) -> Duration {
        self.secs_per_sync_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_average()
    }
    pub fn sync_cycles(&self) -> u64 {
        self.sync_cycles.load(Ordering::Relaxed)
    }
    pub fn add_sync_cycle(&self, cycle: Duration) {
        self.secs_per_sync_cycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add_sample(cycle);
        self.sync_cycles.fetch_add(1, Ordering::Relaxed);
    }
}
impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

static STATS: OnceLock<Stats> = OnceLock::new();

pub fn get_stats() -> &'static Stats {
    STATS.get_or_init(Stats::new)
}

/// Get global stats for the bot
#[command(slash_command, ephemeral)]
pub async fn stats(ctx: Context<'_>) -> CommandResult {
    ctx.send(CreateReply::default().embed(
        info_embed(format!(
            "Linked accounts: {}\nGuild syncs since start: {}\nSeconds per guild sync: {:.2}",
            store().await.len(),
            get_stats().sync_cycles(),
            get_stats().secs_per_sync_cycle().as_secs_f32()
        ))
        .title("Bot stats"),
    ))
    .await?;
    Ok(())
}
