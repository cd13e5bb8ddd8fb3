use super::{CommandResult, Context};
use poise::{builtins, command, samples::HelpConfiguration};

/// An overview of the bot's commands
#[command(slash_command, ephemeral)]
pub async fn help(ctx: Context<'_>) -> CommandResult {
    builtins::help(
        ctx,
        None,
        HelpConfiguration {
            extra_text_at_bottom: "Link your account with /verify after adding your Discord username to your Hypixel profile.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}
