/// Popup form state and the two actions it offers: translate and save

use thiserror::Error;

use crate::config::AUTO_SOURCE_LANG;
use crate::domains::{format_domains, invalid_domains, parse_domains, validation_message};
use crate::error::TranslatorError;
use crate::messages::{Ack, Message, TabMessenger};
use crate::settings::{Settings, SettingsStore};

/// Languages offered in both selectors (source additionally gets "auto")
pub const LANGUAGES: &[(&str, &str)] = &[
    ("ko", "Korean"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Source and target languages cannot be the same")]
    SameLanguage,

    #[error("Invalid: {}", .0.join(", "))]
    InvalidDomains(Vec<String>),

    #[error("Error: Could not translate page")]
    NoActiveTab,

    #[error("Error: Could not translate page")]
    Delivery(#[source] TranslatorError),

    #[error("Error: Could not save settings")]
    Storage(#[source] TranslatorError),
}

/// What the popup is currently editing
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    pub from_lang: String,
    pub to_lang: String,
    pub auto_translate: bool,
    /// Raw comma separated text as typed
    pub domains_input: String,
}

impl From<&Settings> for SettingsForm {
    fn from(settings: &Settings) -> Self {
        SettingsForm {
            from_lang: settings.from_lang.clone(),
            to_lang: settings.to_lang.clone(),
            auto_translate: settings.auto_translate,
            domains_input: format_domains(&settings.auto_translate_domains),
        }
    }
}

impl Default for SettingsForm {
    fn default() -> Self {
        SettingsForm::from(&Settings::default())
    }
}

impl SettingsForm {
    /// Inline error for the domains field, re-evaluated on every edit
    pub fn domain_error(&self) -> Option<String> {
        validation_message(&self.domains_input)
    }

    /// Message for the active tab; "auto" travels as an empty source
    pub fn translate_message(&self) -> Result<Message, FormError> {
        if self.from_lang == self.to_lang {
            return Err(FormError::SameLanguage);
        }
        let from_lang = if self.from_lang == AUTO_SOURCE_LANG {
            String::new()
        } else {
            self.from_lang.clone()
        };
        Ok(Message::Translate {
            from_lang,
            to_lang: self.to_lang.clone(),
        })
    }

    pub fn to_settings(&self) -> Result<Settings, FormError> {
        let invalid = invalid_domains(&self.domains_input);
        if !invalid.is_empty() {
            return Err(FormError::InvalidDomains(invalid));
        }
        Ok(Settings {
            from_lang: self.from_lang.clone(),
            to_lang: self.to_lang.clone(),
            auto_translate: self.auto_translate,
            auto_translate_domains: parse_domains(&self.domains_input),
        })
    }
}

/// Ask the active tab's content script to translate. Resolves on delivery,
/// not when translation finishes.
pub async fn request_translation(
    form: &SettingsForm,
    tabs: &dyn TabMessenger,
) -> Result<Ack, FormError> {
    let message = form.translate_message()?;
    let tab_id = tabs
        .active_tab_id()
        .await
        .map_err(FormError::Delivery)?
        .ok_or(FormError::NoActiveTab)?;
    tabs.send_to_tab(tab_id, &message)
        .await
        .map_err(FormError::Delivery)
}

/// Validate, deduplicate and persist the whole record
pub async fn save_settings(
    form: &SettingsForm,
    store: &dyn SettingsStore,
) -> Result<Settings, FormError> {
    let settings = form.to_settings()?;
    store.save(&settings).await.map_err(FormError::Storage)?;
    Ok(settings)
}
