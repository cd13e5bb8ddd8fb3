//! Role decision engine.
//!
//! Everything in this module is pure: it maps a player's stats, guild rank and
//! the requirement table to the exact set of managed roles a member should
//! hold. The I/O side lives in [`member`] and [`guild`].

use ahash::HashSet;
use poise::serenity_prelude::RoleId;
use serde::Deserialize;
use std::fmt;

pub mod guild;
pub mod member;
pub mod report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Enderman,
    Watcher,
    Zealot,
    Voidling,
}

impl Tier {
    pub const ALL: [Self; 4] = [Self::Enderman, Self::Watcher, Self::Zealot, Self::Voidling];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Enderman => "ENDERMAN",
            Self::Watcher => "WATCHER",
            Self::Zealot => "ZEALOT",
            Self::Voidling => "VOIDLING",
        }
    }
    /// The in-game guild rank carrying the same name.
    pub const fn rank_name(self) -> &'static str {
        match self {
            Self::Enderman => "enderman",
            Self::Watcher => "watcher",
            Self::Zealot => "zealot",
            Self::Voidling => "voidling",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Threshold {
    pub level: f64,
    pub networth: f64,
}

impl Threshold {
    fn is_met(&self, stats: &PlayerStats) -> bool {
        stats.level >= self.level && stats.networth >= self.networth
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Requirements {
    pub watcher: Threshold,
    pub zealot: Threshold,
    pub voidling: Threshold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStats {
    pub level: f64,
    pub networth: f64,
}

impl PlayerStats {
    /// Keeps the best level and the best net worth independently.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            level: self.level.max(other.level),
            networth: self.networth.max(other.networth),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.level == 0.0 && self.networth == 0.0
    }
}

/// A lowercased Hypixel guild rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuildRank(String);

impl GuildRank {
    pub fn new(rank: Option<&str>) -> Self {
        Self(rank.map_or_else(|| String::from("member"), str::to_lowercase))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is(&self, tier: Tier) -> bool {
        self.0 == tier.rank_name()
    }
}

impl fmt::Display for GuildRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    InGuild(GuildRank),
    NotInGuild,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RoleIds {
    pub in_guild: RoleId,
    pub not_in_guild: RoleId,
    pub enderman: RoleId,
    pub watcher: RoleId,
    pub zealot: RoleId,
    pub voidling: RoleId,
    pub drag: RoleId,
    pub retired: RoleId,
    pub supervisor: RoleId,
    pub admin: RoleId,
}

impl RoleIds {
    pub const fn tier(&self, tier: Tier) -> RoleId {
        match tier {
            Tier::Enderman => self.enderman,
            Tier::Watcher => self.watcher,
            Tier::Zealot => self.zealot,
            Tier::Voidling => self.voidling,
        }
    }
    pub fn tiers(&self) -> [RoleId; 4] {
        Tier::ALL.map(|tier| self.tier(tier))
    }
    pub const fn membership(&self) -> [RoleId; 2] {
        [self.in_guild, self.not_in_guild]
    }
    /// Every role the bot is allowed to add or remove.
    pub fn managed(&self) -> [RoleId; 6] {
        let [enderman, watcher, zealot, voidling] = self.tiers();
        [
            self.in_guild,
            self.not_in_guild,
            enderman,
            watcher,
            zealot,
            voidling,
        ]
    }
    pub const fn bypass(&self) -> [RoleId; 4] {
        [self.drag, self.retired, self.supervisor, self.admin]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDelta {
    pub add: Vec<RoleId>,
    pub remove: Vec<RoleId>,
}

impl RoleDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

pub fn eligible_tier(stats: &PlayerStats, requirements: &Requirements) -> Tier {
    if requirements.voidling.is_met(stats) {
        Tier::Voidling
    } else if requirements.zealot.is_met(stats) {
        Tier::Zealot
    } else if requirements.watcher.is_met(stats) {
        Tier::Watcher
    } else {
        Tier::Enderman
    }
}

/// The tier role a guild member should wear.
///
/// The Voidling role is only handed out once the in-game rank is already
/// voidling; an eligible player without it is capped at Zealot.
pub fn tier_role(tier: Tier, rank: &GuildRank, roles: &RoleIds) -> RoleId {
    match tier {
        Tier::Voidling if rank.is(Tier::Voidling) => roles.voidling,
        Tier::Voidling => roles.zealot,
        tier => roles.tier(tier),
    }
}

/// The managed roles a member should end up with. `tier` is `None` until the
/// player's stats are known, in which case only the membership role is listed.
pub fn desired_roles(membership: &Membership, tier: Option<Tier>, roles: &RoleIds) -> Vec<RoleId> {
    match (membership, tier) {
        (Membership::InGuild(rank), Some(tier)) => vec![roles.in_guild, tier_role(tier, rank, roles)],
        (Membership::InGuild(_), None) => vec![roles.in_guild],
        (Membership::NotInGuild, _) => vec![roles.not_in_guild],
    }
}

/// Computes the adds and removals turning `current` into `desired` while only
/// ever touching roles in `managed`.
pub fn role_delta(current: &[RoleId], desired: &[RoleId], managed: &[RoleId]) -> RoleDelta {
    let current = current.iter().copied().collect::<HashSet<RoleId>>();
    let desired_set = desired.iter().copied().collect::<HashSet<RoleId>>();
    let mut delta = RoleDelta::default();
    for role in desired {
        if !current.contains(role) && !delta.add.contains(role) {
            delta.add.push(*role);
        }
    }
    for role in managed {
        if current.contains(role) && !desired_set.contains(role) && !delta.remove.contains(role) {
            delta.remove.push(*role);
        }
    }
    delta
}

/// Delta for the guild membership roles. Leaving the guild also strips every
/// tier role.
pub fn membership_delta(current: &[RoleId], membership: &Membership, roles: &RoleIds) -> RoleDelta {
    let desired = desired_roles(membership, None, roles);
    match membership {
        Membership::InGuild(_) => role_delta(current, &desired, &roles.membership()),
        Membership::NotInGuild => role_delta(current, &desired, &roles.managed()),
    }
}

pub fn tier_delta(current: &[RoleId], tier: Tier, rank: &GuildRank, roles: &RoleIds) -> RoleDelta {
    role_delta(current, &[tier_role(tier, rank, roles)], &roles.tiers())
}

pub fn is_bypassed(current: &[RoleId], roles: &RoleIds) -> bool {
    let bypass = roles.bypass();
    current.iter().any(|role| bypass.contains(role))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub from: String,
    pub to: Tier,
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ➜ **{}**", self.from, self.to)
    }
}

/// In-game rank change staff has to make by hand, if any.
pub fn promotion_hint(actual: &GuildRank, deserved: Tier) -> Option<Promotion> {
    if deserved == Tier::Enderman {
        return None;
    }
    let from = actual.to_string();
    if actual.is(Tier::Voidling) {
        return (deserved != Tier::Voidling).then_some(Promotion { from, to: deserved });
    }
    if deserved == Tier::Voidling {
        return (!actual.is(Tier::Zealot)).then_some(Promotion {
            from,
            to: Tier::Zealot,
        });
    }
    (!actual.is(deserved)).then_some(Promotion { from, to: deserved })
}

pub fn voidling_candidate(actual: &GuildRank, deserved: Tier) -> bool {
    deserved == Tier::Voidling && !actual.is(Tier::Voidling)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> RoleIds {
        RoleIds {
            in_guild: RoleId::new(1),
            not_in_guild: RoleId::new(2),
            enderman: RoleId::new(3),
            watcher: RoleId::new(4),
            zealot: RoleId::new(5),
            voidling: RoleId::new(6),
            drag: RoleId::new(7),
            retired: RoleId::new(8),
            supervisor: RoleId::new(9),
            admin: RoleId::new(10),
        }
    }

    fn requirements() -> Requirements {
        Requirements {
            watcher: Threshold {
                level: 100.0,
                networth: 1e9,
            },
            zealot: Threshold {
                level: 200.0,
                networth: 5e9,
            },
            voidling: Threshold {
                level: 300.0,
                networth: 20e9,
            },
        }
    }

    fn stats(level: f64, networth: f64) -> PlayerStats {
        PlayerStats { level, networth }
    }

    #[test]
    fn tier_needs_both_thresholds() {
        let reqs = requirements();
        assert_eq!(eligible_tier(&stats(0.0, 0.0), &reqs), Tier::Enderman);
        assert_eq!(eligible_tier(&stats(100.0, 1e9), &reqs), Tier::Watcher);
        assert_eq!(eligible_tier(&stats(350.0, 4e9), &reqs), Tier::Watcher);
        assert_eq!(eligible_tier(&stats(199.9, 50e9), &reqs), Tier::Watcher);
        assert_eq!(eligible_tier(&stats(250.0, 6e9), &reqs), Tier::Zealot);
        assert_eq!(eligible_tier(&stats(300.0, 20e9), &reqs), Tier::Voidling);
    }

    #[test]
    fn stats_keep_independent_maxima() {
        let merged = stats(120.0, 1e6).max(stats(80.0, 3e9));
        assert_eq!(merged, stats(120.0, 3e9));
        assert!(PlayerStats::default().is_empty());
        assert!(!stats(0.0, 1.0).is_empty());
    }

    #[test]
    fn voidling_role_requires_ingame_rank() {
        let roles = roles();
        let voidling = GuildRank::new(Some("Voidling"));
        let zealot = GuildRank::new(Some("ZEALOT"));
        assert_eq!(tier_role(Tier::Voidling, &voidling, &roles), roles.voidling);
        assert_eq!(tier_role(Tier::Voidling, &zealot, &roles), roles.zealot);
        assert_eq!(tier_role(Tier::Watcher, &voidling, &roles), roles.watcher);
        assert_eq!(
            tier_role(Tier::Enderman, &GuildRank::new(None), &roles),
            roles.enderman
        );
    }

    #[test]
    fn missing_rank_is_member() {
        let rank = GuildRank::new(None);
        assert_eq!(rank.as_str(), "member");
        assert_eq!(rank.to_string(), "MEMBER");
    }

    #[test]
    fn delta_leaves_unmanaged_roles_alone() {
        let roles = roles();
        let unrelated = RoleId::new(99);
        let current = [unrelated, roles.watcher, roles.not_in_guild];
        let rank = GuildRank::new(Some("zealot"));

        let membership = membership_delta(&current, &Membership::InGuild(rank.clone()), &roles);
        assert_eq!(membership.add, vec![roles.in_guild]);
        assert_eq!(membership.remove, vec![roles.not_in_guild]);

        let tier = tier_delta(&current, Tier::Zealot, &rank, &roles);
        assert_eq!(tier.add, vec![roles.zealot]);
        assert_eq!(tier.remove, vec![roles.watcher]);
    }

    #[test]
    fn leaving_guild_strips_tier_roles() {
        let roles = roles();
        let current = [roles.in_guild, roles.zealot, roles.enderman, roles.admin];
        let delta = membership_delta(&current, &Membership::NotInGuild, &roles);
        assert_eq!(delta.add, vec![roles.not_in_guild]);
        assert_eq!(delta.remove, vec![roles.in_guild, roles.enderman, roles.zealot]);
    }

    #[test]
    fn applied_delta_is_idempotent() {
        let roles = roles();
        let rank = GuildRank::new(Some("voidling"));
        let mut current = vec![roles.not_in_guild, roles.enderman];
        for _ in 0..2 {
            let membership =
                membership_delta(&current, &Membership::InGuild(rank.clone()), &roles);
            let tier = tier_delta(&current, Tier::Voidling, &rank, &roles);
            for delta in [membership, tier] {
                current.retain(|role| !delta.remove.contains(role));
                current.extend(delta.add);
            }
        }
        let membership = membership_delta(&current, &Membership::InGuild(rank.clone()), &roles);
        let tier = tier_delta(&current, Tier::Voidling, &rank, &roles);
        assert!(membership.is_empty());
        assert!(tier.is_empty());
        current.sort_unstable();
        assert_eq!(current, vec![roles.in_guild, roles.voidling]);
    }

    #[test]
    fn desired_roles_hold_one_tier() {
        let roles = roles();
        let zealot = Membership::InGuild(GuildRank::new(Some("zealot")));
        assert_eq!(
            desired_roles(&zealot, Some(Tier::Voidling), &roles),
            vec![roles.in_guild, roles.zealot]
        );
        assert_eq!(desired_roles(&zealot, None, &roles), vec![roles.in_guild]);
        assert_eq!(
            desired_roles(&Membership::NotInGuild, Some(Tier::Watcher), &roles),
            vec![roles.not_in_guild]
        );
    }

    #[test]
    fn bypass_roles_are_detected() {
        let roles = roles();
        assert!(is_bypassed(&[RoleId::new(50), roles.retired], &roles));
        assert!(!is_bypassed(&[roles.in_guild, roles.voidling], &roles));
    }

    #[test]
    fn promotion_hints() {
        let rank = |rank: &str| GuildRank::new(Some(rank));
        assert_eq!(promotion_hint(&rank("member"), Tier::Enderman), None);
        assert_eq!(
            promotion_hint(&rank("voidling"), Tier::Zealot)
                .unwrap()
                .to_string(),
            "VOIDLING ➜ **ZEALOT**"
        );
        assert_eq!(promotion_hint(&rank("voidling"), Tier::Voidling), None);
        assert_eq!(
            promotion_hint(&rank("watcher"), Tier::Voidling)
                .unwrap()
                .to_string(),
            "WATCHER ➜ **ZEALOT**"
        );
        assert_eq!(promotion_hint(&rank("zealot"), Tier::Voidling), None);
        assert_eq!(
            promotion_hint(&rank("Member"), Tier::Watcher)
                .unwrap()
                .to_string(),
            "MEMBER ➜ **WATCHER**"
        );
        assert_eq!(promotion_hint(&rank("watcher"), Tier::Watcher), None);
    }

    #[test]
    fn voidling_candidates() {
        assert!(voidling_candidate(&GuildRank::new(Some("zealot")), Tier::Voidling));
        assert!(!voidling_candidate(&GuildRank::new(Some("voidling")), Tier::Voidling));
        assert!(!voidling_candidate(&GuildRank::new(Some("zealot")), Tier::Zealot));
    }
}
