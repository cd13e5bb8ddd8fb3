use super::{set_nickname, sync_after_link, CommandError, CommandResult, Context};
use crate::{hypixel, message_utils::success_message, store::store};
use poise::command;
use tracing::info;

/// Hypixel stores whatever the player typed, so casing may differ.
fn link_matches(link: Option<&str>, username: &str) -> bool {
    link.is_some_and(|link| link.trim().eq_ignore_ascii_case(username))
}

#[command(
    slash_command,
    required_bot_permissions = "MANAGE_ROLES | MANAGE_NICKNAMES",
    guild_only,
    ephemeral
)]
/// Link your Minecraft account
pub async fn verify(
    ctx: Context<'_>,
    #[description = "Your Minecraft Username"]
    #[max_length = 16]
    ign: String,
) -> CommandResult {
    if store().await.get(ctx.author().id).is_some() {
        return Err(CommandError::Expected(String::from("Already verified!")));
    }
    ctx.defer_ephemeral().await?;
    let profile = hypixel::resolve_username(ign.trim()).await?;
    let link = hypixel::discord_link(&profile.id).await?;
    if !link_matches(link.as_deref(), &ctx.author().name) {
        return Err(CommandError::Expected(format!(
            "Mismatch. Hypixel: `{}`.",
            link.as_deref().unwrap_or("None")
        )));
    }
    store().await.link(ctx.author().id, profile.id.clone()).await?;
    info!(
        "{} ({}) verified as {} ({})",
        ctx.author().name,
        ctx.author().id,
        profile.name,
        profile.id
    );
    if let Some(member) = ctx.author_member().await {
        set_nickname(ctx, &member, &profile.name).await;
        sync_after_link(ctx, &member, &profile.id).await;
    }
    ctx.send(success_message("Verified!")).await?;
    Ok(())
}
