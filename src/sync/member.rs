use super::{
    eligible_tier, membership_delta, tier_delta, GuildRank, Membership, RoleDelta, Requirements,
    RoleIds, Tier,
};
use crate::{
    constants::AUDIT_LOG_REASON,
    hypixel::{self, ApiError, GuildRoster, PlayerUuid},
    retry_strategies::discord_retry_strategy,
};
use backon::Retryable;
use poise::serenity_prelude::{Error as SerenityError, Http, HttpError, Member, RoleId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Linked, but not in the Hypixel guild.
    Guest,
    Member {
        tier: Tier,
        rank: GuildRank,
        level: f64,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Hypixel returned no Skyblock stats for this player (API 0).")]
    NoStats,
    #[error(transparent)]
    Api(#[from] Arc<ApiError>),
}

impl From<ApiError> for SyncError {
    fn from(value: ApiError) -> Self {
        Self::Api(Arc::new(value))
    }
}

/// Everything a member sync reads besides the member itself.
pub struct SyncContext<'a> {
    pub http: &'a Http,
    pub roles: &'a RoleIds,
    pub requirements: &'a Requirements,
    pub roster: &'a GuildRoster,
}

// Unknown member/role, missing access and missing permissions won't fix themselves.
const fn is_permanent_role_error(code: isize) -> bool {
    matches!(code, 10007 | 10011 | 50001 | 50013)
}

const fn should_retry_role_edit(err: &SerenityError) -> bool {
    if let SerenityError::Http(HttpError::UnsuccessfulRequest(err)) = err {
        return !is_permanent_role_error(err.error.code);
    }
    true
}

/// Applies a delta one role at a time. Failures are logged and skipped.
async fn apply_delta(http: &Http, member: &Member, delta: &RoleDelta) -> usize {
    if delta.is_empty() {
        return 0;
    }
    let mut failures = 0;
    for role in &delta.add {
        let res = (|| {
            http.add_member_role(member.guild_id, member.user.id, *role, Some(AUDIT_LOG_REASON))
        })
        .retry(discord_retry_strategy())
        .when(should_retry_role_edit)
        .await;
        if let Err(err) = res {
            failures += 1;
            log_role_failure("add", *role, member, &err);
        }
    }
    for role in &delta.remove {
        let res = (|| {
            http.remove_member_role(member.guild_id, member.user.id, *role, Some(AUDIT_LOG_REASON))
        })
        .retry(discord_retry_strategy())
        .when(should_retry_role_edit)
        .await;
        if let Err(err) = res {
            failures += 1;
            log_role_failure("remove", *role, member, &err);
        }
    }
    failures
}

fn log_role_failure(action: &str, role: RoleId, member: &Member, err: &SerenityError) {
    warn!(
        "Failed to {} role {} for {} ({}): {}",
        action, role, member.user.name, member.user.id, err
    );
}

/// Brings one member's managed roles in line with their Hypixel state.
///
/// Membership roles are applied before stats are fetched, so a member whose
/// stats cannot be read still ends up with the right guild role.
pub async fn sync_member(
    ctx: &SyncContext<'_>,
    member: &Member,
    uuid: &PlayerUuid,
) -> Result<SyncOutcome, SyncError> {
    let membership = ctx.roster.membership(uuid);
    let delta = membership_delta(&member.roles, &membership, ctx.roles);
    let failures = apply_delta(ctx.http, member, &delta).await;
    let Membership::InGuild(rank) = membership else {
        debug!("{} is not in the guild ({} role edits failed)", uuid, failures);
        return Ok(SyncOutcome::Guest);
    };

    let stats = hypixel::player_stats(uuid).await?;
    if stats.is_empty() {
        return Err(SyncError::NoStats);
    }
    let tier = eligible_tier(&stats, ctx.requirements);
    let delta = tier_delta(&member.roles, tier, &rank, ctx.roles);
    let failures = failures + apply_delta(ctx.http, member, &delta).await;
    debug!(
        "Synced {} as {} (rank {}, level {:.2}, {} role edits failed)",
        uuid, tier, rank, stats.level, failures
    );
    Ok(SyncOutcome::Member {
        tier,
        rank,
        level: stats.level,
    })
}

/// Strips every managed role from a member.
pub async fn clear_roles(http: &Http, member: &Member, roles: &RoleIds) -> usize {
    let delta = super::role_delta(&member.roles, &[], &roles.managed());
    apply_delta(http, member, &delta).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_discord_errors_are_not_retried() {
        for code in [10007, 10011, 50001, 50013] {
            assert!(is_permanent_role_error(code), "{code}");
        }
        for code in [0, 10004, 50035, 130000] {
            assert!(!is_permanent_role_error(code), "{code}");
        }
    }

    #[test]
    fn transport_errors_are_retried() {
        assert!(should_retry_role_edit(&SerenityError::Other("gateway hiccup")));
        assert!(should_retry_role_edit(&SerenityError::Http(
            HttpError::RateLimitUtf8
        )));
    }
}
