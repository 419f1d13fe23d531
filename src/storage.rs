use crate::errors::ClientError;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::error;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const THEME_KEY: &str = "theme";

/// String key/value entries persisted as one JSON object, the client's
/// equivalent of browser local storage.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).await;
        Self { path, entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub async fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), ClientError> {
        self.entries.insert(key.to_string(), value.into());
        self.persist().await
    }

    /// Writes several entries with a single flush.
    pub async fn set_many(&mut self, pairs: &[(&str, String)]) -> Result<(), ClientError> {
        for (key, value) in pairs {
            self.entries.insert((*key).to_string(), value.clone());
        }
        self.persist().await
    }

    pub async fn remove(&mut self, keys: &[&str]) -> Result<(), ClientError> {
        let mut changed = false;
        for key in keys {
            changed |= self.entries.remove(*key).is_some();
        }
        if changed {
            self.persist().await?;
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), ClientError> {
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse store file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read store file: {err}");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
pub(crate) fn temp_store_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_web_{tag}_{}_{nanos}.json", std::process::id()));
    path
}
