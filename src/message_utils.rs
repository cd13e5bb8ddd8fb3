use crate::constants::{FAILURE_COLOR, INFO_COLOR, SUCCESS_COLOR};
use poise::{serenity_prelude::CreateEmbed, CreateReply};

pub fn success_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(format!("✅ {}", content.into()))
        .color(SUCCESS_COLOR)
}

pub fn failure_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(format!("❌ {}", content.into()))
        .color(FAILURE_COLOR)
}

pub fn info_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().description(content).color(INFO_COLOR)
}

pub fn success_message(content: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(success_embed(content))
}

/// Posted to the log channel when a linked member leaves the server.
pub fn member_left_embed(tag: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("User Left")
        .description(format!("**{tag}** left. Unverified."))
        .color(FAILURE_COLOR)
}

/// Formats coins as billions with two decimals.
pub fn format_networth(networth: f64) -> String {
    format!("{:.2}B", networth / 1e9)
}
