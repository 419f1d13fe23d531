use crate::errors::ClientError;
use crate::models::User;
use crate::storage::{LocalStore, TOKEN_KEY, USER_KEY};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

pub type SharedStore = Arc<RwLock<LocalStore>>;

/// Token and cached profile of the signed-in user.
///
/// Every read or write of authentication state goes through this handle;
/// clones share the same underlying store.
#[derive(Clone)]
pub struct Session {
    store: SharedStore,
}

impl Session {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub async fn set_auth_data(&self, token: &str, user: &User) -> Result<(), ClientError> {
        let profile = serde_json::to_string(user)?;
        let mut store = self.store.write().await;
        store
            .set_many(&[(TOKEN_KEY, token.to_string()), (USER_KEY, profile)])
            .await
    }

    pub async fn token(&self) -> Option<String> {
        self.store.read().await.get(TOKEN_KEY).map(str::to_string)
    }

    /// Cached profile; an unreadable entry counts as no session.
    pub async fn user(&self) -> Option<User> {
        let store = self.store.read().await;
        let raw = store.get(USER_KEY)?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(err) => {
                error!("failed to parse cached user profile: {err}");
                None
            }
        }
    }

    /// Token presence only; freshness is never checked.
    pub async fn is_authenticated(&self) -> bool {
        self.store.read().await.get(TOKEN_KEY).is_some()
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        self.store.write().await.remove(&[TOKEN_KEY, USER_KEY]).await
    }
}
