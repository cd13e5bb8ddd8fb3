use super::{set_nickname, sync_after_link, CommandResult, Context};
use crate::{hypixel, message_utils::success_message, store::store};
use poise::{command, serenity_prelude::Member};
use tracing::info;

#[command(
    slash_command,
    required_bot_permissions = "MANAGE_ROLES | MANAGE_NICKNAMES",
    default_member_permissions = "MANAGE_ROLES",
    guild_only,
    ephemeral
)]
/// Force verify a user (Admin)
pub async fn forceverify(
    ctx: Context<'_>,
    #[description = "The user"] user: Member,
    #[description = "Minecraft Username"]
    #[max_length = 16]
    ign: String,
) -> CommandResult {
    ctx.defer_ephemeral().await?;
    let profile = hypixel::resolve_username(ign.trim()).await?;
    store().await.link(user.user.id, profile.id.clone()).await?;
    info!(
        "{} force-verified {} as {} ({})",
        ctx.author().name,
        user.user.name,
        profile.name,
        profile.id
    );
    set_nickname(ctx, &user, &profile.name).await;
    sync_after_link(ctx, &user, &profile.id).await;
    ctx.send(success_message(format!(
        "Force-verified **{}**.",
        user.user.name
    )))
    .await?;
    Ok(())
}
