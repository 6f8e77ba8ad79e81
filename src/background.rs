/// Background coordinator: icon updates and the auto-translate decision

use std::rc::Rc;

use async_trait::async_trait;

use crate::error::Result;
use crate::logging::log_swallowed;
use crate::messages::{Ack, IconStatus, Message, MessageHandler, TabMessenger};
use crate::settings::{SettingsStore, initialize_defaults};
use crate::tabs::TabChangeInfo;

/// Sets the toolbar icon for one tab
#[async_trait(?Send)]
pub trait IconSetter {
    async fn set_icon(&self, tab_id: i32, status: IconStatus) -> Result<()>;
}

/// What an auto-translate check ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTranslateDecision {
    SettingsUnavailable,
    Disabled,
    NoMatchingDomain,
    Sent,
    DeliveryFailed,
}

pub struct Background {
    store: Rc<dyn SettingsStore>,
    tabs: Rc<dyn TabMessenger>,
    icons: Rc<dyn IconSetter>,
}

impl Background {
    pub fn new(
        store: Rc<dyn SettingsStore>,
        tabs: Rc<dyn TabMessenger>,
        icons: Rc<dyn IconSetter>,
    ) -> Self {
        Background { store, tabs, icons }
    }

    /// Install/update hook: seed defaults without touching an existing record
    pub async fn on_installed(&self) -> bool {
        match initialize_defaults(self.store.as_ref()).await {
            Ok(written) => {
                if written {
                    log::info!("default settings written");
                }
                written
            }
            Err(e) => {
                log_swallowed("background.install", &e);
                false
            }
        }
    }

    pub async fn update_icon(&self, tab_id: i32, status: IconStatus) {
        if let Err(e) = self.icons.set_icon(tab_id, status).await {
            log_swallowed("background.set_icon", &e);
        }
    }

    pub async fn check_auto_translate(&self, url: &str, tab_id: i32) -> AutoTranslateDecision {
        let settings = match self.store.load_or_default().await {
            Ok(settings) => settings,
            Err(e) => {
                log_swallowed("background.settings", &e);
                return AutoTranslateDecision::SettingsUnavailable;
            }
        };

        if !settings.auto_translate || settings.auto_translate_domains.is_empty() {
            log::debug!("auto-translate disabled or no domains configured");
            return AutoTranslateDecision::Disabled;
        }

        if !settings.should_auto_translate(url) {
            log::debug!("no auto-translate domain matches {}", url);
            return AutoTranslateDecision::NoMatchingDomain;
        }

        log::info!("auto-translating tab {} ({})", tab_id, url);
        let message = Message::AutoTranslate {
            from_lang: settings.from_lang,
            to_lang: settings.to_lang,
        };
        match self.tabs.send_to_tab(tab_id, &message).await {
            Ok(_) => AutoTranslateDecision::Sent,
            Err(e) => {
                // Usually the content script is not injected yet
                log_swallowed("background.auto_translate", &e);
                AutoTranslateDecision::DeliveryFailed
            }
        }
    }

    /// `tabs.onUpdated` hook
    pub async fn on_tab_updated(
        &self,
        tab_id: i32,
        change: &TabChangeInfo,
        url: Option<&str>,
    ) -> Option<AutoTranslateDecision> {
        match url {
            Some(url) if change.is_complete() => Some(self.check_auto_translate(url, tab_id).await),
            _ => None,
        }
    }
}

#[async_trait(?Send)]
impl MessageHandler for Background {
    fn accepts(&self, message: &Message) -> bool {
        matches!(
            message,
            Message::UpdateIcon { .. } | Message::CheckAutoTranslate { .. }
        )
    }

    async fn handle(&self, message: Message, sender_tab: Option<i32>) -> Option<Ack> {
        match message {
            Message::UpdateIcon { status } => {
                match sender_tab {
                    Some(tab_id) => self.update_icon(tab_id, status).await,
                    None => log::warn!("updateIcon without a sender tab"),
                }
                Some(Ack::ok())
            }
            Message::CheckAutoTranslate { url } => {
                match sender_tab {
                    Some(tab_id) => {
                        self.check_auto_translate(&url, tab_id).await;
                    }
                    None => log::warn!("checkAutoTranslate without a sender tab"),
                }
                Some(Ack::ok())
            }
            other => {
                log::debug!("background ignores {}", other.kind());
                None
            }
        }
    }
}
