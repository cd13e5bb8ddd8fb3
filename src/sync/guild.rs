use super::{
    is_bypassed,
    member::{sync_member, SyncContext},
    report::SyncReport,
    RoleIds,
};
use crate::{
    commands::stats::get_stats,
    config::settings,
    constants::{SYNC_DISABLED_POLL, SYNC_MEMBER_DELAY},
    hypixel::{self, ApiError, PlayerUuid},
    retry_strategies::discord_retry_strategy,
    store::store,
};
use backon::Retryable;
use poise::serenity_prelude::{
    futures::TryStreamExt, CreateMessage, Error as SerenityError, Http, Member, RoleId,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::{
    sync::{Mutex, MutexGuard},
    time::{self, Instant},
};
use tracing::{error, info, warn};

static SYNC_LOCK: Mutex<()> = Mutex::const_new(());

#[derive(Debug, Error)]
pub enum GuildSyncError {
    #[error("A guild-wide sync is already running.")]
    AlreadyRunning,
    #[error("failed to fetch the Hypixel guild: {0}")]
    Roster(#[from] Arc<ApiError>),
    #[error("failed to list Discord members: {0}")]
    Discord(#[from] SerenityError),
}

/// Whether a caller queues behind a running sync or gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Wait,
    Skip,
}

async fn acquire(lock: &Mutex<()>, mode: LockMode) -> Result<MutexGuard<'_, ()>, GuildSyncError> {
    match mode {
        LockMode::Wait => Ok(lock.lock().await),
        LockMode::Skip => lock.try_lock().map_err(|_| GuildSyncError::AlreadyRunning),
    }
}

/// The parts of a Discord member the guild sync sorts on.
struct Candidate<'a> {
    bot: bool,
    roles: &'a [RoleId],
    display_name: &'a str,
    username: &'a str,
}

impl<'a> From<&'a Member> for Candidate<'a> {
    fn from(member: &'a Member) -> Self {
        Self {
            bot: member.user.bot,
            roles: &member.roles,
            display_name: member.display_name(),
            username: &member.user.name,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Skip,
    Bypassed(String),
    Unverified(String),
    Sync(PlayerUuid),
}

/// Bots are ignored and bypass roles win over a missing link.
fn classify(candidate: &Candidate<'_>, link: Option<PlayerUuid>, roles: &RoleIds) -> Action {
    if candidate.bot {
        return Action::Skip;
    }
    if is_bypassed(candidate.roles, roles) {
        return Action::Bypassed(candidate.display_name.to_owned());
    }
    link.map_or_else(
        || Action::Unverified(candidate.username.to_owned()),
        Action::Sync,
    )
}

/// Syncs every linked, non-bypassed human member of the Discord guild.
///
/// Members are handled one after another with a fixed pause in between, and
/// only one guild-wide sync runs at a time.
pub async fn sync_guild(http: &Http, mode: LockMode) -> Result<SyncReport, GuildSyncError> {
    let _guard = acquire(&SYNC_LOCK, mode).await?;
    let start_time = Instant::now();
    let (config, requirements) = settings().refreshed().await;
    hypixel::invalidate_rosters();
    let roster = hypixel::guild_roster(&config.guild_name).await?;
    info!(
        "Starting guild sync for {} ({} Hypixel members)",
        config.guild_name,
        roster.member_count()
    );
    let members: Vec<Member> = config
        .discord_guild_id
        .members_iter(http)
        .try_collect()
        .await?;
    let ctx = SyncContext {
        http,
        roles: &config.roles,
        requirements: &requirements,
        roster: &roster,
    };
    let links = store().await;
    if links.is_empty() {
        info!("No linked accounts yet, every member will be reported as unverified");
    }
    let mut report = SyncReport::default();
    for member in members {
        let link = links.get(member.user.id);
        let uuid = match classify(&Candidate::from(&member), link, &config.roles) {
            Action::Skip => continue,
            Action::Bypassed(name) => {
                report.bypassed.push(name);
                continue;
            }
            Action::Unverified(name) => {
                report.unverified.push(name);
                continue;
            }
            Action::Sync(uuid) => uuid,
        };
        match sync_member(&ctx, &member, &uuid).await {
            Ok(outcome) => report.record(member.display_name(), &outcome),
            Err(err) => {
                warn!("Failed to sync {} ({}): {}", member.user.name, uuid, err);
                report.failed.push(member.user.name.clone());
            }
        }
        time::sleep(SYNC_MEMBER_DELAY).await;
    }
    get_stats().add_sync_cycle(start_time.elapsed());
    info!(
        "Guild sync finished in {:.1}s: {} synced, {} failed",
        start_time.elapsed().as_secs_f32(),
        report.synced.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn post_report(http: &Http, report: &SyncReport) {
    let Some(channel) = settings().config().log_channel_id else {
        return;
    };
    let message = CreateMessage::new().embed(report.embed());
    let res = (|| channel.send_message(http, message.clone()))
        .retry(discord_retry_strategy())
        .await;
    if let Err(err) = res {
        warn!("Failed to post sync report to {}: {}", channel, err);
    }
}

/// Runs a guild-wide sync every configured interval and posts the report to
/// the log channel.
pub async fn sync_loop(http: Arc<Http>) {
    loop {
        let Some(interval) = settings().config().sync_interval() else {
            time::sleep(SYNC_DISABLED_POLL).await;
            settings().reload().await;
            continue;
        };
        time::sleep(interval).await;
        match sync_guild(&http, LockMode::Wait).await {
            Ok(report) => post_report(&http, &report).await,
            Err(err) => error!("Scheduled guild sync failed: {}", err),
        }
    }
}
