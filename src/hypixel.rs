use crate::{
    config::settings,
    constants::{HYPIXEL_API, MOJANG_API, REQUEST_TIMEOUT, ROSTER_TTL, USER_AGENT},
    retry_strategies::api_retry_strategy,
    sync::{GuildRank, Membership, PlayerStats},
};
use ahash::{HashMap, RandomState};
use backon::Retryable;
use models::{
    GuildResponse, MojangProfile, MuseumMember, MuseumResponse, Player, PlayerResponse, Profile,
    ProfilesResponse,
};
use moka::future::Cache;
use networth::{CoinNetworth, NetworthEstimator};
use ratelimit::ratelimiter;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, OnceLock},
    time::Duration,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

pub mod models;
pub mod networth;
mod ratelimit;

/// A Minecraft account uuid in its dashless lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerUuid(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a valid Minecraft uuid")]
pub struct InvalidUuid(String);

impl PlayerUuid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PlayerUuid {
    type Err = InvalidUuid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = s.trim().replace('-', "").to_ascii_lowercase();
        if uuid.len() == 32 && uuid.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(uuid))
        } else {
            Err(InvalidUuid(s.to_owned()))
        }
    }
}

impl TryFrom<String> for PlayerUuid {
    type Error = InvalidUuid;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerUuid> for String {
    fn from(value: PlayerUuid) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate limited by the {0} API")]
    RateLimited(&'static str),
    #[error("the {api} API responded with {status}")]
    Status {
        api: &'static str,
        status: StatusCode,
    },
    #[error("The Hypixel API key was rejected.")]
    InvalidKey,
    #[error("No Minecraft account is named `{0}`.")]
    PlayerNotFound(String),
    #[error("No Hypixel guild is named `{0}`.")]
    GuildNotFound(String),
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Request(err) => !err.is_decode(),
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Uuid to rank map of one Hypixel guild.
#[derive(Debug, Default)]
pub struct GuildRoster {
    ranks: HashMap<PlayerUuid, GuildRank>,
}

impl GuildRoster {
    pub fn membership(&self, uuid: &PlayerUuid) -> Membership {
        self.ranks
            .get(uuid)
            .map_or(Membership::NotInGuild, |rank| {
                Membership::InGuild(rank.clone())
            })
    }
    pub fn member_count(&self) -> usize {
        self.ranks.len()
    }
}

impl FromIterator<(PlayerUuid, Option<String>)> for GuildRoster {
    fn from_iter<T: IntoIterator<Item = (PlayerUuid, Option<String>)>>(iter: T) -> Self {
        Self {
            ranks: iter
                .into_iter()
                .map(|(uuid, rank)| (uuid, GuildRank::new(rank.as_deref())))
                .collect(),
        }
    }
}

static CLIENT: OnceLock<Client> = OnceLock::new();
static ROSTER_CACHE: OnceLock<Cache<String, Arc<GuildRoster>, RandomState>> = OnceLock::new();

fn client() -> &'static Client {
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default()
    })
}

fn roster_cache() -> &'static Cache<String, Arc<GuildRoster>, RandomState> {
    ROSTER_CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(16)
            .time_to_live(ROSTER_TTL)
            .build_with_hasher(RandomState::new())
    })
}

fn estimator() -> &'static dyn NetworthEstimator {
    &CoinNetworth
}

fn check_status(api: &'static str, res: Response) -> Result<Response, ApiError> {
    match res.status() {
        status if status.is_success() => Ok(res),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited(api)),
        StatusCode::FORBIDDEN if api == "Hypixel" => Err(ApiError::InvalidKey),
        status => Err(ApiError::Status { api, status }),
    }
}

fn hypixel_request(endpoint: &str) -> RequestBuilder {
    client()
        .get(format!("{HYPIXEL_API}/{endpoint}"))
        .header("API-Key", settings().config().hypixel_key.as_str())
}

async fn hypixel_get<T: DeserializeOwned>(
    endpoint: &str,
    query: &[(&str, &str)],
) -> Result<T, ApiError> {
    (|| async move {
        ratelimiter().hypixel.acquire_one().await;
        let res = hypixel_request(endpoint).query(query).send().await?;
        Ok(check_status("Hypixel", res)?.json::<T>().await?)
    })
    .retry(api_retry_strategy())
    .when(ApiError::is_retryable)
    .await
}

pub fn is_valid_username(name: &str) -> bool {
    (1..=16).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Resolves a Minecraft username to its account.
pub async fn resolve_username(name: &str) -> Result<MojangProfile, ApiError> {
    if !is_valid_username(name) {
        return Err(ApiError::PlayerNotFound(name.to_owned()));
    }
    (|| async move {
        ratelimiter().mojang.acquire_one().await;
        let res = client()
            .get(format!("{MOJANG_API}/users/profiles/minecraft/{name}"))
            .send()
            .await?;
        match res.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                Err(ApiError::PlayerNotFound(name.to_owned()))
            }
            _ => Ok(check_status("Mojang", res)?.json::<MojangProfile>().await?),
        }
    })
    .retry(api_retry_strategy())
    .when(ApiError::is_retryable)
    .await
}

/// The Discord username a player linked on their Hypixel profile.
pub async fn discord_link(uuid: &PlayerUuid) -> Result<Option<String>, ApiError> {
    let res: PlayerResponse = hypixel_get("player", &[("uuid", uuid.as_str())]).await?;
    Ok(res.player.and_then(Player::discord_link))
}

async fn museum(profile_id: &str) -> Result<MuseumResponse, ApiError> {
    hypixel_get("skyblock/museum", &[("profile", profile_id)]).await
}

/// Level and net worth of one profile, if the player is a member of it.
pub fn profile_stats(
    uuid: &PlayerUuid,
    profile: &Profile,
    museum: Option<&MuseumMember>,
    estimator: &dyn NetworthEstimator,
) -> Option<PlayerStats> {
    let member = profile.members.get(uuid.as_str())?;
    Some(PlayerStats {
        level: member.level(),
        networth: estimator.estimate(member, profile.bank_balance(), museum),
    })
}

/// Best level and best net worth across every Skyblock profile of a player.
pub async fn player_stats(uuid: &PlayerUuid) -> Result<PlayerStats, ApiError> {
    let res: ProfilesResponse = hypixel_get("skyblock/profiles", &[("uuid", uuid.as_str())]).await?;
    let mut stats = PlayerStats::default();
    for profile in res.profiles.unwrap_or_default() {
        if !profile.members.contains_key(uuid.as_str()) {
            continue;
        }
        let museum = match museum(&profile.profile_id).await {
            Ok(museum) => Some(museum),
            Err(err) => {
                debug!("Museum lookup failed for profile {}: {}", profile.profile_id, err);
                None
            }
        };
        let museum_member = museum
            .as_ref()
            .and_then(|museum| museum.members.get(uuid.as_str()));
        if let Some(found) = profile_stats(uuid, &profile, museum_member, estimator()) {
            stats = stats.max(found);
        }
    }
    Ok(stats)
}

async fn request_roster(name: &str) -> Result<GuildRoster, ApiError> {
    let res: GuildResponse = hypixel_get("guild", &[("name", name)]).await?;
    let guild = res
        .guild
        .ok_or_else(|| ApiError::GuildNotFound(name.to_owned()))?;
    Ok(guild
        .members
        .into_iter()
        .map(|member| (member.uuid, member.rank))
        .collect())
}

/// The roster of a Hypixel guild, cached for a short while.
pub async fn guild_roster(name: &str) -> Result<Arc<GuildRoster>, Arc<ApiError>> {
    roster_cache()
        .try_get_with(name.to_lowercase(), async {
            request_roster(name).await.map(Arc::new)
        })
        .await
}

pub fn invalidate_rosters() {
    roster_cache().invalidate_all();
}

#[derive(Debug)]
pub struct ApiStatus {
    pub api: &'static str,
    pub outcome: Result<(StatusCode, Duration), String>,
}

async fn probe(api: &'static str, request: RequestBuilder) -> ApiStatus {
    let start = Instant::now();
    let outcome = match request.send().await {
        Ok(res) => Ok((res.status(), start.elapsed())),
        Err(err) => {
            warn!("{} status probe failed: {}", api, err);
            Err(err.to_string())
        }
    };
    ApiStatus { api, outcome }
}

/// Pings Mojang and Hypixel once each, bypassing retries.
pub async fn api_status() -> [ApiStatus; 2] {
    let (mojang, hypixel) = tokio::join!(
        probe(
            "Mojang",
            client().get(format!("{MOJANG_API}/users/profiles/minecraft/Notch"))
        ),
        async {
            ratelimiter().hypixel.acquire_one().await;
            probe("Hypixel", hypixel_request("punishmentstats")).await
        }
    );
    [mojang, hypixel]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypixel::models::{Currencies, Leveling, ProfileMember};

    const UUID: &str = "069a79f444e94726a5befca90e38aaf5";

    #[test]
    fn uuid_is_normalized() {
        let uuid: PlayerUuid = "069A79F4-44E9-4726-A5BE-FCA90E38AAF5".parse().unwrap();
        assert_eq!(uuid.as_str(), UUID);
        assert_eq!(uuid.to_string(), UUID);
        assert!("not-a-uuid".parse::<PlayerUuid>().is_err());
        assert!("069a79f444e94726a5befca90e38aaf".parse::<PlayerUuid>().is_err());
        assert!("z69a79f444e94726a5befca90e38aaf5".parse::<PlayerUuid>().is_err());
    }

    #[test]
    fn uuid_serializes_as_plain_string() {
        let uuid: PlayerUuid = UUID.parse().unwrap();
        assert_eq!(serde_json::to_string(&uuid).unwrap(), format!("\"{UUID}\""));
        assert!(serde_json::from_str::<PlayerUuid>("\"nope\"").is_err());
    }

    #[test]
    fn usernames_are_validated() {
        assert!(is_valid_username("Notch"));
        assert!(is_valid_username("a_b_c_123"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("seventeen_chars__"));
        assert!(!is_valid_username("../guild"));
    }

    #[test]
    fn roster_membership() {
        let uuid: PlayerUuid = UUID.parse().unwrap();
        let roster = [(uuid.clone(), Some(String::from("Zealot")))]
            .into_iter()
            .collect::<GuildRoster>();
        assert_eq!(roster.member_count(), 1);
        assert_eq!(
            roster.membership(&uuid),
            Membership::InGuild(GuildRank::new(Some("zealot")))
        );
        let other: PlayerUuid = "853c80ef3c3749fdaa49938b674adae6".parse().unwrap();
        assert_eq!(roster.membership(&other), Membership::NotInGuild);
    }

    #[test]
    fn retryable_errors() {
        assert!(ApiError::RateLimited("Hypixel").is_retryable());
        assert!(ApiError::Status {
            api: "Hypixel",
            status: StatusCode::BAD_GATEWAY
        }
        .is_retryable());
        assert!(!ApiError::Status {
            api: "Hypixel",
            status: StatusCode::BAD_REQUEST
        }
        .is_retryable());
        assert!(!ApiError::InvalidKey.is_retryable());
        assert!(!ApiError::PlayerNotFound(String::from("x")).is_retryable());
    }

    #[test]
    fn profile_stats_skip_foreign_profiles() {
        let uuid: PlayerUuid = UUID.parse().unwrap();
        let mut members = HashMap::default();
        members.insert(
            UUID.to_owned(),
            ProfileMember {
                leveling: Some(Leveling { experience: 15000.0 }),
                currencies: Some(Currencies { coin_purse: 10.0 }),
            },
        );
        let profile = Profile {
            profile_id: String::from("p"),
            members,
            banking: None,
        };
        let museum = MuseumMember { value: 90.0 };
        let stats = profile_stats(&uuid, &profile, Some(&museum), &CoinNetworth).unwrap();
        assert!((stats.level - 150.0).abs() < 1e-9);
        assert!((stats.networth - 100.0).abs() < 1e-9);

        let stranger: PlayerUuid = "853c80ef3c3749fdaa49938b674adae6".parse().unwrap();
        assert!(profile_stats(&stranger, &profile, None, &CoinNetworth).is_none());
    }
}
