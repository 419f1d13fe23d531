use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_API_URL: &str = "https://habit-tracker-backend-0576.onrender.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the habit backend, without a trailing slash.
    pub api_url: String,
    pub port: u16,
    pub data_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = env::var("HABIT_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        Self {
            api_url: normalize_base_url(&api_url),
            port,
            data_path: resolve_data_path(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/client.json")
}

pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
