use crate::{
    config::settings,
    hypixel::{self, ApiError, PlayerUuid},
    store::{store, StoreError},
    sync::{
        guild::GuildSyncError,
        member::{sync_member, SyncContext, SyncError, SyncOutcome},
    },
};
use poise::serenity_prelude::{self, EditMember, Member, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub mod check;
pub mod forceverify;
pub mod help;
pub mod ihateapi;
pub mod stats;
pub mod unverify;
pub mod update;
pub mod updateall;
pub mod verify;

type Context<'a> = poise::Context<'a, (), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Expected(String),
    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl From<serenity_prelude::Error> for CommandError {
    fn from(value: serenity_prelude::Error) -> Self {
        Self::Unexpected(value.into())
    }
}

impl From<ApiError> for CommandError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::PlayerNotFound(_) | ApiError::GuildNotFound(_) => {
                Self::Expected(value.to_string())
            }
            _ => Self::Unexpected(value.into()),
        }
    }
}

impl From<Arc<ApiError>> for CommandError {
    fn from(value: Arc<ApiError>) -> Self {
        match Arc::try_unwrap(value) {
            Ok(err) => err.into(),
            Err(shared) => Self::Unexpected(anyhow::anyhow!("{shared}")),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(value: StoreError) -> Self {
        Self::Unexpected(value.into())
    }
}

impl From<SyncError> for CommandError {
    fn from(value: SyncError) -> Self {
        match value {
            SyncError::NoStats => Self::Expected(value.to_string()),
            SyncError::Api(err) => err.into(),
        }
    }
}

impl From<GuildSyncError> for CommandError {
    fn from(value: GuildSyncError) -> Self {
        match value {
            GuildSyncError::AlreadyRunning => Self::Expected(value.to_string()),
            GuildSyncError::Roster(err) => err.into(),
            GuildSyncError::Discord(err) => err.into(),
        }
    }
}

type CommandResult = Result<(), CommandError>;

async fn linked_uuid(user: UserId) -> Result<PlayerUuid, CommandError> {
    store()
        .await
        .get(user)
        .ok_or_else(|| CommandError::Expected(String::from("Not verified.")))
}

/// Renames a member after their Minecraft account. Failures (e.g. the server
/// owner) are ignored.
async fn set_nickname(ctx: Context<'_>, member: &Member, name: &str) {
    if let Err(err) = member
        .guild_id
        .edit_member(ctx, member.user.id, EditMember::new().nickname(name))
        .await
    {
        debug!("Could not rename {} to {}: {}", member.user.name, name, err);
    }
}

/// Syncs one member against freshly read settings and a cached guild roster.
async fn sync_one(
    ctx: Context<'_>,
    member: &Member,
    uuid: &PlayerUuid,
) -> Result<SyncOutcome, CommandError> {
    let (config, requirements) = settings().refreshed().await;
    let roster = hypixel::guild_roster(&config.guild_name).await?;
    let sync_ctx = SyncContext {
        http: &ctx.serenity_context().http,
        roles: &config.roles,
        requirements: &requirements,
        roster: &roster,
    };
    Ok(sync_member(&sync_ctx, member, uuid).await?)
}

/// Like [`sync_one`], for commands where the link already succeeded.
async fn sync_after_link(ctx: Context<'_>, member: &Member, uuid: &PlayerUuid) {
    if let Err(err) = sync_one(ctx, member, uuid).await {
        warn!("Initial sync for {} ({}) failed: {}", member.user.name, uuid, err);
    }
}
