use crate::{commands::CommandError, message_utils::failure_embed};
use anyhow::Result;
use poise::{CreateReply, FrameworkError};
use tracing::{error, warn};

type Context<'a, U> = poise::Context<'a, U, CommandError>;

async fn reply_failure<U: Send + Sync>(ctx: Context<'_, U>, msg: impl Into<String>) -> Result<()> {
    ctx.send(
        CreateReply::default()
            .embed(failure_embed(msg))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn handle<T: Send + Sync>(error: FrameworkError<'_, T, CommandError>) -> Result<()> {
    match error {
        FrameworkError::Setup { error, .. } => {
            error!("Error during framework setup: {:?}", error);
        }
        FrameworkError::EventHandler { error, event, .. } => error!(
            "Event handler failed on {} event: {}",
            event.snake_case_name(),
            error
        ),
        FrameworkError::Command { ctx, error, .. } => {
            let msg = match error {
                CommandError::Expected(msg) => msg,
                CommandError::Unexpected(err) => {
                    error!(
                        "Unexpected error in command {}: {:?}",
                        ctx.command().name,
                        &err
                    );
                    format!("Something went wrong while running this command:\n{err}")
                }
            };
            reply_failure(ctx, msg).await?;
        }
        FrameworkError::CommandPanic { ctx, payload, .. } => {
            // The payload may contain internals, keep it in the logs
            error!(
                "Command {} panicked with payload: {:?}",
                ctx.command().name,
                payload
            );
            reply_failure(ctx, "An unexpected internal error has occurred.").await?;
        }
        FrameworkError::ArgumentParse {
            ctx, input, error, ..
        } => {
            let msg = input.map_or_else(
                || format!("**{error}**"),
                |input| format!("**Cannot parse `{input}` as argument: {error}**"),
            );
            reply_failure(ctx, msg).await?;
        }
        FrameworkError::CommandStructureMismatch {
            ctx, description, ..
        } => {
            error!(
                "Failed to deserialize interaction arguments for `/{}`: {}",
                ctx.command.name, description,
            );
        }
        FrameworkError::CommandCheckFailed { ctx, error, .. } => {
            warn!(
                "Command check failed in command {} for user {}: {:?}",
                ctx.command().name,
                ctx.author().name,
                error,
            );
        }
        FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let msg = format!(
                "You're too fast. Please wait {} seconds before retrying.",
                remaining_cooldown.as_secs()
            );
            reply_failure(ctx, msg).await?;
        }
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let msg = format!("The bot is lacking permissions: {missing_permissions}");
            reply_failure(ctx, msg).await?;
        }
        FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let msg = missing_permissions.map_or_else(
                || format!("You may be lacking permissions for `/{}`.", ctx.command().name),
                |missing_permissions| {
                    format!(
                        "You're lacking permissions for `/{}`: {}",
                        ctx.command().name,
                        missing_permissions,
                    )
                },
            );
            reply_failure(ctx, msg).await?;
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            reply_failure(ctx, "You cannot run this command in DMs.").await?;
        }
        FrameworkError::UnknownInteraction { interaction, .. } => {
            warn!("Received unknown interaction \"{}\"", interaction.data.name);
        }
        other => warn!("Unhandled framework error: {}", other),
    }
    Ok(())
}
