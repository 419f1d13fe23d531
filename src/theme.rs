use crate::errors::ClientError;
use crate::session::SharedStore;
use crate::storage::THEME_KEY;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Class placed on the root element.
    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Dark => "dark-mode",
            Theme::Light => "light-mode",
        }
    }
}

pub async fn load_theme(store: &SharedStore) -> Theme {
    store
        .read()
        .await
        .get(THEME_KEY)
        .and_then(Theme::parse)
        .unwrap_or_default()
}

pub async fn toggle_theme(store: &SharedStore) -> Result<Theme, ClientError> {
    let mut store = store.write().await;
    let next = store
        .get(THEME_KEY)
        .and_then(Theme::parse)
        .unwrap_or_default()
        .toggled();
    store.set(THEME_KEY, next.as_str()).await?;
    Ok(next)
}
