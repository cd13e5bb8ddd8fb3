use super::{CommandResult, Context};
use crate::sync::guild::{sync_guild, LockMode};
use poise::{command, CreateReply};

#[command(
    slash_command,
    required_bot_permissions = "MANAGE_ROLES | EMBED_LINKS",
    default_member_permissions = "MANAGE_ROLES",
    guild_only
)]
/// Syncs roles for the entire discord
pub async fn updateall(ctx: Context<'_>) -> CommandResult {
    ctx.defer().await?;
    let report = sync_guild(&ctx.serenity_context().http, LockMode::Skip).await?;
    ctx.send(CreateReply::default().embed(report.embed())).await?;
    Ok(())
}
