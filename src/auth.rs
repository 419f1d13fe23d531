use crate::api::{decode, log_failure};
use crate::errors::ClientError;
use crate::models::{AuthResponse, Credentials, User};
use crate::session::Session;
use reqwest::Client;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AuthService {
    client: Client,
    base_url: String,
    session: Session,
}

impl AuthService {
    pub fn new(client: Client, base_url: impl Into<String>, session: Session) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let result = self.authenticate("/login", username, password).await;
        log_failure("log in", result)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let result = self.authenticate("/register", username, password).await;
        log_failure("register", result)
    }

    /// Drops the stored token and profile. The backend is not contacted.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.clear().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    async fn authenticate(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<User, ClientError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(&Credentials { username, password })
            .send()
            .await?;
        let AuthResponse { token, user } = decode::<AuthResponse>(response).await?;
        match self.session.set_auth_data(&token, &user).await {
            Ok(()) => {}
            Err(err @ ClientError::Storage(_)) => {
                warn!("session not saved, kept for this run only: {err}");
            }
            Err(err) => return Err(err),
        }
        info!(user_id = user.id, username = %user.username, "session established");
        Ok(user)
    }
}
