use super::PlayerUuid;
use ahash::HashMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MojangProfile {
    pub id: PlayerUuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlayerResponse {
    pub player: Option<Player>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Player {
    pub social_media: Option<SocialMedia>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SocialMedia {
    #[serde(default)]
    pub links: HashMap<String, String>,
}

impl Player {
    pub fn discord_link(self) -> Option<String> {
        self.social_media?.links.remove("DISCORD")
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProfilesResponse {
    #[serde(default)]
    pub profiles: Option<Vec<Profile>>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub profile_id: String,
    #[serde(default)]
    pub members: HashMap<String, ProfileMember>,
    pub banking: Option<Banking>,
}

impl Profile {
    pub fn bank_balance(&self) -> f64 {
        self.banking.as_ref().map_or(0.0, |banking| banking.balance)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileMember {
    pub leveling: Option<Leveling>,
    pub currencies: Option<Currencies>,
}

impl ProfileMember {
    pub fn level(&self) -> f64 {
        self.leveling
            .as_ref()
            .map_or(0.0, |leveling| leveling.experience / 100.0)
    }
    pub fn purse(&self) -> f64 {
        self.currencies
            .as_ref()
            .map_or(0.0, |currencies| currencies.coin_purse)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Leveling {
    #[serde(default)]
    pub experience: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Currencies {
    #[serde(default)]
    pub coin_purse: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Banking {
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MuseumResponse {
    #[serde(default)]
    pub members: HashMap<String, MuseumMember>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MuseumMember {
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct GuildResponse {
    pub guild: Option<Guild>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Guild {
    #[serde(default)]
    pub members: Vec<GuildMember>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GuildMember {
    pub uuid: PlayerUuid,
    pub rank: Option<String>,
}
