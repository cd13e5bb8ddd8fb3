#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::unreadable_literal,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

mod commands;
mod config;
mod constants;
mod error_handler;
mod events;
mod hypixel;
mod message_utils;
mod retry_strategies;
mod store;
mod sync;

use anyhow::{Context, Result};
use commands::{check, forceverify, help, ihateapi, stats, unverify, update, updateall, verify};
use poise::{
    builtins,
    serenity_prelude::{ClientBuilder, CreateAllowedMentions, GatewayIntents},
    Framework, FrameworkOptions,
};
use sync::guild;
use tokio::task;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let settings = config::init().await.context("failed to load configuration")?;
    let token = settings.token()?;
    let guild_id = settings.config().discord_guild_id;
    store::store().await;
    let options = FrameworkOptions {
        commands: vec![
            verify::verify(),
            forceverify::forceverify(),
            unverify::unverify(),
            check::check(),
            update::update(),
            updateall::updateall(),
            ihateapi::ihateapi(),
            stats::stats(),
            help::help(),
        ],
        on_error: |err| {
            Box::pin(async move {
                if let Err(err) = error_handler::handle(err).await {
                    error!("Error while handling error: {}", err);
                }
            })
        },
        event_handler: |ctx, event, framework, _| {
            Box::pin(events::handle(ctx, event, framework))
        },
        allowed_mentions: Some(
            CreateAllowedMentions::new()
                .all_roles(false)
                .all_users(false)
                .replied_user(true),
        ),
        ..Default::default()
    };
    let framework = Framework::builder()
        .setup(move |ctx, _, framework| {
            Box::pin(async move {
                task::spawn(guild::sync_loop(ctx.http.clone()));
                builtins::register_in_guild(ctx, &framework.options().commands, guild_id).await?;
                Ok(())
            })
        })
        .options(options)
        .build();
    let mut client = ClientBuilder::new(
        token,
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS,
    )
    .framework(framework)
    .await?;
    Ok(client.start().await?)
}
