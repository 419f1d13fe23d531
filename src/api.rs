use crate::errors::ClientError;
use crate::models::{CompletionCounts, Habit, NewHabit};
use crate::session::Session;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{error, info};

/// Habit endpoints of the backend, authorized with the session token.
#[derive(Clone)]
pub struct HabitApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl HabitApi {
    pub fn new(client: Client, base_url: impl Into<String>, session: Session) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session,
        }
    }

    pub async fn current_date(&self) -> Result<NaiveDate, ClientError> {
        let result: Result<NaiveDate, ClientError> = async {
            let response = self.request(Method::GET, "/habits/current-date").await.send().await?;
            let body = ensure_success(response).await?.text().await?;
            parse_server_date(&body)
        }
        .await;
        log_failure("fetch current date", result)
    }

    pub async fn list_habits(&self) -> Result<Vec<Habit>, ClientError> {
        let result: Result<Vec<Habit>, ClientError> = async {
            let response = self.request(Method::GET, "/habits").await.send().await?;
            decode(response).await
        }
        .await;
        log_failure("fetch habits", result)
    }

    pub async fn create_habit(&self, name: &str) -> Result<Habit, ClientError> {
        let result: Result<Habit, ClientError> = async {
            let response = self
                .request(Method::POST, "/habits")
                .await
                .json(&NewHabit { name, streak: 0 })
                .send()
                .await?;
            decode(response).await
        }
        .await;
        log_failure("create habit", result)
    }

    pub async fn delete_habit(&self, id: i64) -> Result<(), ClientError> {
        let result: Result<(), ClientError> = async {
            let path = format!("/habits/{id}");
            let response = self.request(Method::DELETE, &path).await.send().await?;
            ensure_success(response).await?;
            Ok(())
        }
        .await;
        log_failure("delete habit", result)
    }

    pub async fn complete_habit(&self, id: i64) -> Result<Habit, ClientError> {
        let result: Result<Habit, ClientError> = async {
            let path = format!("/habits/complete/{id}");
            let response = self.request(Method::POST, &path).await.send().await?;
            decode(response).await
        }
        .await;
        log_failure("complete habit", result)
    }

    pub async fn completion_counts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CompletionCounts, ClientError> {
        let result: Result<CompletionCounts, ClientError> = async {
            let response = self
                .request(Method::GET, "/habits/completions")
                .await
                .query(&[("start", date_param(start)), ("end", date_param(end))])
                .send()
                .await?;
            decode(response).await
        }
        .await;
        log_failure("fetch completion counts", result)
    }

    /// Overrides the backend's logical today. The endpoint is open, so no
    /// token is attached.
    pub async fn set_custom_date(&self, date: &str) -> Result<String, ClientError> {
        let result: Result<String, ClientError> = async {
            let response = self
                .client
                .post(self.url("/habits/set-date"))
                .query(&[("date", date)])
                .send()
                .await?;
            Ok(ensure_success(response).await?.text().await?)
        }
        .await;
        let text = log_failure("set custom date", result)?;
        info!(date, response = %text, "test date set");
        Ok(text)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = ensure_success(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn log_failure<T>(action: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
    match &result {
        Err(err @ ClientError::Status { body, .. }) if !body.is_empty() => {
            error!(%body, "failed to {action}: {err}");
        }
        Err(err) => error!("failed to {action}: {err}"),
        Ok(_) => {}
    }
    result
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts both a JSON string body (`"2025-03-13"`) and bare text.
pub fn parse_server_date(body: &str) -> Result<NaiveDate, ClientError> {
    let trimmed = body.trim();
    let raw = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed)?
    } else {
        trimmed.to_string()
    };
    let day = raw.get(..10).unwrap_or(raw.as_str());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ClientError::InvalidDate(raw.clone()))
}
