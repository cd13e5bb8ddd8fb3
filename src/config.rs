use crate::{
    constants::{CONFIG_FILE, REQUIREMENTS_FILE},
    sync::{Requirements, RoleIds},
};
use arc_swap::ArcSwap;
use poise::serenity_prelude::{ChannelId, GuildId};
use serde::{de::DeserializeOwned, Deserialize};
use std::{
    env,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    time::Duration,
};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no bot token: set TOKEN in the environment or in {CONFIG_FILE}")]
    MissingToken,
    #[error("configuration was already loaded")]
    AlreadyLoaded,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    #[serde(default)]
    pub token: Option<String>,
    pub discord_guild_id: GuildId,
    pub hypixel_key: String,
    pub guild_name: String,
    #[serde(default)]
    pub log_channel_id: Option<ChannelId>,
    pub roles: RoleIds,
    /// Minutes between automatic guild-wide syncs, 0 turns them off.
    #[serde(default)]
    pub sync_interval_minutes: u64,
}

impl Config {
    pub fn sync_interval(&self) -> Option<Duration> {
        (self.sync_interval_minutes > 0).then(|| Duration::from_secs(self.sync_interval_minutes * 60))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Live view of `config.json` and `reqs.json`.
pub struct Settings {
    dir: PathBuf,
    config: ArcSwap<Config>,
    requirements: ArcSwap<Requirements>,
}

impl Settings {
    pub async fn load(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        let config = read_json::<Config>(&dir.join(CONFIG_FILE)).await?;
        let requirements = read_json::<Requirements>(&dir.join(REQUIREMENTS_FILE)).await?;
        Ok(Self {
            dir,
            config: ArcSwap::from_pointee(config),
            requirements: ArcSwap::from_pointee(requirements),
        })
    }
    pub fn config(&self) -> Arc<Config> {
        self.config.load_full()
    }
    pub fn requirements(&self) -> Arc<Requirements> {
        self.requirements.load_full()
    }
    pub fn dir(&self) -> &Path {
        &self.dir
    }
    /// Re-reads both files. A file that fails to load keeps its previous value.
    pub async fn reload(&self) {
        match read_json::<Config>(&self.dir.join(CONFIG_FILE)).await {
            Ok(config) => self.config.store(Arc::new(config)),
            Err(err) => warn!("Keeping previous config: {}", err),
        }
        match read_json::<Requirements>(&self.dir.join(REQUIREMENTS_FILE)).await {
            Ok(requirements) => self.requirements.store(Arc::new(requirements)),
            Err(err) => warn!("Keeping previous requirements: {}", err),
        }
    }
    /// Reloads both files and returns the values a sync should run with.
    pub async fn refreshed(&self) -> (Arc<Config>, Arc<Requirements>) {
        self.reload().await;
        (self.config(), self.requirements())
    }
    pub fn token(&self) -> Result<String, ConfigError> {
        env::var("TOKEN")
            .ok()
            .or_else(|| self.config().token.clone())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Loads the settings from `CONFIG_DIR` (or the working directory).
pub async fn init() -> Result<&'static Settings, ConfigError> {
    let dir = env::var_os("CONFIG_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
    let loaded = Settings::load(dir).await?;
    info!("Loaded configuration from {}", loaded.dir().display());
    SETTINGS
        .set(loaded)
        .map_err(|_| ConfigError::AlreadyLoaded)?;
    Ok(settings())
}

pub fn settings() -> &'static Settings {
    SETTINGS
        .get()
        .expect("settings should be loaded before use")
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::RoleId;
    use std::fs as std_fs;

    const CONFIG: &str = r#"{
        "TOKEN": "abc",
        "CLIENT_ID": "123",
        "DISCORD_GUILD_ID": "111111111111111111",
        "HYPIXEL_KEY": "key",
        "GUILD_NAME": "SkysEnd",
        "LOG_CHANNEL_ID": "222222222222222222",
        "ROLES": {
            "IN_GUILD": "1", "NOT_IN_GUILD": "2", "ENDERMAN": "3", "WATCHER": "4",
            "ZEALOT": "5", "VOIDLING": "6", "DRAG": "7", "RETIRED": "8",
            "SUPERVISOR": "9", "ADMIN": "10"
        }
    }"#;

    const REQS: &str = r#"{
        "WATCHER": { "level": 100, "networth": 1000000000 },
        "ZEALOT": { "level": 200, "networth": 5000000000 },
        "VOIDLING": { "level": 300, "networth": 20000000000 }
    }"#;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("skysend-config-{name}-{}", std::process::id()));
        std_fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn parses_config_files() {
        let dir = temp_dir("parse");
        std_fs::write(dir.join(CONFIG_FILE), CONFIG).unwrap();
        std_fs::write(dir.join(REQUIREMENTS_FILE), REQS).unwrap();
        let settings = Settings::load(&dir).await.unwrap();
        let config = settings.config();
        assert_eq!(config.discord_guild_id, GuildId::new(111111111111111111));
        assert_eq!(config.log_channel_id, Some(ChannelId::new(222222222222222222)));
        assert_eq!(config.roles.voidling, RoleId::new(6));
        assert_eq!(config.sync_interval(), None);
        assert!((settings.requirements().zealot.networth - 5e9).abs() < 1.0);
        std_fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn reload_keeps_last_good_values() {
        let dir = temp_dir("reload");
        std_fs::write(dir.join(CONFIG_FILE), CONFIG).unwrap();
        std_fs::write(dir.join(REQUIREMENTS_FILE), REQS).unwrap();
        let settings = Settings::load(&dir).await.unwrap();

        std_fs::write(dir.join(REQUIREMENTS_FILE), "{ broken").unwrap();
        std_fs::write(
            dir.join(CONFIG_FILE),
            CONFIG.replace("\"SkysEnd\"", "\"Other\""),
        )
        .unwrap();
        settings.reload().await;
        assert_eq!(settings.config().guild_name, "Other");
        assert!((settings.requirements().watcher.level - 100.0).abs() < f64::EPSILON);
        std_fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn refreshed_picks_up_edits() {
        let dir = temp_dir("refresh");
        std_fs::write(dir.join(CONFIG_FILE), CONFIG).unwrap();
        std_fs::write(dir.join(REQUIREMENTS_FILE), REQS).unwrap();
        let settings = Settings::load(&dir).await.unwrap();
        assert_eq!(settings.config().sync_interval(), None);

        std_fs::write(
            dir.join(REQUIREMENTS_FILE),
            REQS.replace("\"level\": 100", "\"level\": 500"),
        )
        .unwrap();
        std_fs::write(
            dir.join(CONFIG_FILE),
            CONFIG.replace("\"TOKEN\"", "\"SYNC_INTERVAL_MINUTES\": 30, \"TOKEN\""),
        )
        .unwrap();
        let (config, requirements) = settings.refreshed().await;
        assert_eq!(config.sync_interval(), Some(Duration::from_secs(30 * 60)));
        assert!((requirements.watcher.level - 500.0).abs() < f64::EPSILON);
        std_fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn init_publishes_loaded_settings() {
        let dir = temp_dir("init");
        std_fs::write(dir.join(CONFIG_FILE), CONFIG).unwrap();
        std_fs::write(dir.join(REQUIREMENTS_FILE), REQS).unwrap();
        env::set_var("CONFIG_DIR", &dir);
        let loaded = init().await.unwrap();
        assert!(std::ptr::eq(loaded, settings()));
        assert_eq!(settings().config().guild_name, "SkysEnd");
        assert!(matches!(init().await, Err(ConfigError::AlreadyLoaded)));
        std_fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let dir = temp_dir("missing");
        let err = Settings::load(&dir).await.err().unwrap();
        assert!(matches!(err, ConfigError::Read { .. }));
        std_fs::remove_dir_all(dir).unwrap();
    }
}
