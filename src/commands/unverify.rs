use super::{CommandResult, Context};
use crate::{config::settings, message_utils::success_message, store::store, sync::member};
use poise::{command, serenity_prelude::Member};
use tracing::info;

#[command(
    slash_command,
    required_bot_permissions = "MANAGE_ROLES",
    default_member_permissions = "MANAGE_ROLES",
    guild_only,
    ephemeral
)]
/// Unlink a user
pub async fn unverify(
    ctx: Context<'_>,
    #[description = "The user to unverify"] user: Member,
) -> CommandResult {
    let removed = store().await.unlink(user.user.id).await?;
    let failures =
        member::clear_roles(&ctx.serenity_context().http, &user, &settings().config().roles).await;
    info!(
        "{} unverified {} (was {:?}, {} role edits failed)",
        ctx.author().name,
        user.user.name,
        removed.map(|uuid| uuid.to_string()),
        failures
    );
    ctx.send(success_message(format!("Cleared **{}**.", user.user.name)))
        .await?;
    Ok(())
}
