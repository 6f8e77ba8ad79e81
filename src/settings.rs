/// Persisted user settings and the storage seam around chrome.storage.sync

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Root settings record, stored as four top-level keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub from_lang: String,
    pub to_lang: String,
    pub auto_translate: bool,
    pub auto_translate_domains: Vec<String>,
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            from_lang: "ko".to_string(),
            to_lang: "en".to_string(),
            auto_translate: false,
            auto_translate_domains: vec![".kr".to_string()],
        }
    }

    /// True when auto-translate is on and some pattern occurs in `url`.
    ///
    /// Plain substring test: `.kr` also matches `https://example.com/?ref=.kr`.
    pub fn should_auto_translate(&self, url: &str) -> bool {
        self.auto_translate
            && self
                .auto_translate_domains
                .iter()
                .any(|domain| url.contains(domain.as_str()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
pub trait SettingsStore {
    /// Read the stored record, `None` when nothing has been written yet
    async fn load(&self) -> Result<Option<Settings>>;

    /// Replace the whole stored record
    async fn save(&self, settings: &Settings) -> Result<()>;

    async fn load_or_default(&self) -> Result<Settings> {
        Ok(self.load().await?.unwrap_or_default())
    }
}

/// Write defaults unless a record already exists. Returns true if written.
pub async fn initialize_defaults(store: &dyn SettingsStore) -> Result<bool> {
    if store.load().await?.is_some() {
        return Ok(false);
    }
    store.save(&Settings::default()).await?;
    Ok(true)
}
