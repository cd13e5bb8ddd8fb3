use super::{linked_uuid, sync_one, CommandError, CommandResult, Context};
use crate::{message_utils::success_message, sync::member::SyncOutcome};
use poise::{command, serenity_prelude::Member};

#[command(
    slash_command,
    required_bot_permissions = "MANAGE_ROLES",
    default_member_permissions = "MANAGE_ROLES",
    guild_only
)]
/// Update a single user
pub async fn update(
    ctx: Context<'_>,
    #[description = "The user to update"] user: Member,
) -> CommandResult {
    let uuid = linked_uuid(user.user.id).await?;
    ctx.defer().await?;
    let outcome = sync_one(ctx, &user, &uuid).await.map_err(|err| match err {
        CommandError::Expected(msg) => {
            CommandError::Expected(format!("Failed to update **{}**: {msg}", user.display_name()))
        }
        err @ CommandError::Unexpected(_) => err,
    })?;
    let detail = match outcome {
        SyncOutcome::Guest => String::from("not in the guild"),
        SyncOutcome::Member { tier, rank, .. } => format!("{tier}, in-game {rank}"),
    };
    ctx.send(success_message(format!(
        "Updated **{}** ({detail}).",
        user.display_name()
    )))
    .await?;
    Ok(())
}
