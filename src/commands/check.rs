use super::{linked_uuid, CommandResult, Context};
use crate::{
    hypixel,
    message_utils::{format_networth, info_embed},
};
use poise::{command, serenity_prelude::Member, CreateReply};

#[command(slash_command, guild_only)]
/// Check stats of a verified user
pub async fn check(
    ctx: Context<'_>,
    #[description = "The user to check"] user: Member,
) -> CommandResult {
    let uuid = linked_uuid(user.user.id).await?;
    ctx.defer().await?;
    let stats = hypixel::player_stats(&uuid).await?;
    let embed = info_embed(format!("Minecraft uuid: `{uuid}`"))
        .title(format!("Stats: {}", user.display_name()))
        .field("Level", format!("{:.2}", stats.level), true)
        .field("NW", format_networth(stats.networth), true);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
