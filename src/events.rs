use crate::{
    commands::CommandError, config::settings, message_utils::member_left_embed, store::store,
};
use poise::{
    serenity_prelude::{Context, CreateMessage, FullEvent, GuildId, User},
    FrameworkContext,
};
use tracing::{info, warn};

pub async fn handle(
    ctx: &Context,
    event: &FullEvent,
    _framework: FrameworkContext<'_, (), CommandError>,
) -> Result<(), CommandError> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("{} is online", data_about_bot.user.name);
        }
        FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            member_left(ctx, *guild_id, user).await?;
        }
        _ => {}
    }
    Ok(())
}

/// Unlinks members leaving the server and reports it to the log channel.
async fn member_left(ctx: &Context, guild_id: GuildId, user: &User) -> Result<(), CommandError> {
    let config = settings().config();
    if guild_id != config.discord_guild_id {
        return Ok(());
    }
    let Some(uuid) = store().await.unlink(user.id).await? else {
        return Ok(());
    };
    info!("{} ({}) left, unlinked {}", user.name, user.id, uuid);
    if let Some(channel) = config.log_channel_id {
        let message = CreateMessage::new().embed(member_left_embed(&user.tag()));
        if let Err(err) = channel.send_message(ctx, message).await {
            warn!("Failed to post leave notice to {}: {}", channel, err);
        }
    }
    Ok(())
}
