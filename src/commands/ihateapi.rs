use super::{CommandResult, Context};
use crate::{hypixel, message_utils::info_embed};
use poise::{command, CreateReply};

#[command(
    slash_command,
    default_member_permissions = "ADMINISTRATOR",
    guild_only,
    ephemeral
)]
/// Shows status of Mojang and Hypixel APIs (Admin Only)
pub async fn ihateapi(ctx: Context<'_>) -> CommandResult {
    ctx.defer_ephemeral().await?;
    let lines = hypixel::api_status()
        .await
        .into_iter()
        .map(|status| match status.outcome {
            Ok((code, latency)) if code.is_success() => format!(
                "✅ **{}**: {} ({} ms)",
                status.api,
                code,
                latency.as_millis()
            ),
            Ok((code, latency)) => format!(
                "⚠️ **{}**: {} ({} ms)",
                status.api,
                code,
                latency.as_millis()
            ),
            Err(err) => format!("❌ **{}**: unreachable ({err})", status.api),
        })
        .collect::<Vec<String>>();
    ctx.send(CreateReply::default().embed(info_embed(lines.join("\n")).title("API status")))
        .await?;
    Ok(())
}
