/// Messages exchanged between background, content script and popup
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Toolbar icon state for a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconStatus {
    /// Page language needs translating
    Red,
    /// Page has been translated
    Green,
    /// Neutral, also used for any status name we do not know
    #[default]
    #[serde(other)]
    Gray,
}

/// Tri-size icon set, serialized with the pixel sizes as keys
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconPaths {
    #[serde(rename = "16")]
    pub small: String,
    #[serde(rename = "48")]
    pub medium: String,
    #[serde(rename = "128")]
    pub large: String,
}

impl IconStatus {
    /// Anything other than a known name, including non-strings, is gray
    pub fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("red") => IconStatus::Red,
            Some("green") => IconStatus::Green,
            _ => IconStatus::Gray,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IconStatus::Gray => "gray",
            IconStatus::Red => "red",
            IconStatus::Green => "green",
        }
    }

    pub fn icon_paths(self) -> IconPaths {
        let path = |size: u32| format!("icons/icon-{}-{}.png", self.name(), size);
        IconPaths {
            small: path(16),
            medium: path(48),
            large: path(128),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// content -> background
    UpdateIcon {
        #[serde(default, deserialize_with = "lenient_status")]
        status: IconStatus,
    },
    /// content -> background
    CheckAutoTranslate { url: String },
    /// background -> content
    #[serde(rename_all = "camelCase")]
    AutoTranslate {
        #[serde(default)]
        from_lang: String,
        #[serde(default)]
        to_lang: String,
    },
    /// popup -> content
    #[serde(rename_all = "camelCase")]
    Translate {
        #[serde(default)]
        from_lang: String,
        #[serde(default)]
        to_lang: String,
    },
    /// any -> content
    ResetTranslation,
}

fn lenient_status<'de, D>(deserializer: D) -> std::result::Result<IconStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(IconStatus::from_value(&value))
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::UpdateIcon { .. } => "updateIcon",
            Message::CheckAutoTranslate { .. } => "checkAutoTranslate",
            Message::AutoTranslate { .. } => "autoTranslate",
            Message::Translate { .. } => "translate",
            Message::ResetTranslation => "resetTranslation",
        }
    }
}

/// Response sent back for every handled message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Ack { success: true }
    }
}

/// Receiving side of the extension message bus.
///
/// `accepts` is checked before dispatch; only accepted messages are handled
/// and answered. `handle` returns `None` when there is nothing to answer.
#[async_trait(?Send)]
pub trait MessageHandler {
    /// Whether this context answers `message`
    fn accepts(&self, message: &Message) -> bool;

    async fn handle(&self, message: Message, sender_tab: Option<i32>) -> Option<Ack>;
}

/// Sending side towards content scripts in tabs
#[async_trait(?Send)]
pub trait TabMessenger {
    async fn send_to_tab(&self, tab_id: i32, message: &Message) -> Result<Ack>;

    /// Id of the active tab in the current window, if any
    async fn active_tab_id(&self) -> Result<Option<i32>>;
}

/// Sending side towards the background service worker
#[async_trait(?Send)]
pub trait RuntimeChannel {
    async fn send(&self, message: &Message) -> Result<Ack>;
}
