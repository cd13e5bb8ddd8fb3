use crate::{config::settings, constants::LINKS_FILE, hypixel::PlayerUuid};
use ahash::RandomState;
use dashmap::DashMap;
use poise::serenity_prelude::UserId;
use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};
use thiserror::Error;
use tokio::{
    fs,
    sync::{Mutex, OnceCell},
};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Discord user to Minecraft account links, persisted as a flat JSON object.
pub struct LinkStore {
    path: PathBuf,
    links: DashMap<UserId, PlayerUuid, RandomState>,
    write_lock: Mutex<()>,
}

impl LinkStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let links = DashMap::default();
        match fs::read(&path).await {
            Ok(raw) => {
                let entries: BTreeMap<String, String> =
                    serde_json::from_slice(&raw).map_err(|source| StoreError::Format {
                        path: path.clone(),
                        source,
                    })?;
                for (user, uuid) in entries {
                    match (user.parse::<u64>(), uuid.parse::<PlayerUuid>()) {
                        (Ok(user), Ok(uuid)) if user != 0 => {
                            links.insert(UserId::new(user), uuid);
                        }
                        _ => warn!("Skipping malformed link entry {}: {}", user, uuid),
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { path, source }),
        }
        info!("Loaded {} linked accounts from {}", links.len(), path.display());
        Ok(Self {
            path,
            links,
            write_lock: Mutex::new(()),
        })
    }
    pub fn get(&self, user: UserId) -> Option<PlayerUuid> {
        self.links.get(&user).map(|uuid| uuid.value().clone())
    }
    pub fn len(&self) -> usize {
        self.links.len()
    }
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
    /// Links `user`, returning the account it replaced.
    ///
    /// The file is written before the in-memory map changes, so a failed write
    /// leaves the store as it was.
    pub async fn link(
        &self,
        user: UserId,
        uuid: PlayerUuid,
    ) -> Result<Option<PlayerUuid>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.snapshot();
        snapshot.insert(user.get().to_string(), uuid.to_string());
        self.write(&snapshot).await?;
        Ok(self.links.insert(user, uuid))
    }
    /// Unlinks `user`. The file is only rewritten when a link existed.
    pub async fn unlink(&self, user: UserId) -> Result<Option<PlayerUuid>, StoreError> {
        let _guard = self.write_lock.lock().await;
        if !self.links.contains_key(&user) {
            return Ok(None);
        }
        let mut snapshot = self.snapshot();
        snapshot.remove(&user.get().to_string());
        self.write(&snapshot).await?;
        Ok(self.links.remove(&user).map(|(_, uuid)| uuid))
    }
    fn snapshot(&self) -> BTreeMap<String, String> {
        self.links
            .iter()
            .map(|entry| (entry.key().get().to_string(), entry.value().to_string()))
            .collect()
    }
    async fn write(&self, snapshot: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(snapshot).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, raw).await.map_err(io_err)?;
        fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

static STORE: OnceCell<LinkStore> = OnceCell::const_new();

pub async fn store() -> &'static LinkStore {
    STORE
        .get_or_init(|| async {
            LinkStore::open(settings().dir().join(LINKS_FILE))
                .await
                .expect("Link store should load successfully")
        })
        .await
}
