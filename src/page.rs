/// In-page translation: language detection, the text-node walk and session state

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{AUTO_SOURCE_LANG, FALLBACK_DETECTION_LANG, FALLBACK_TARGET_LANG, PipelineConfig};
use crate::error::Result;
use crate::logging::log_swallowed;
use crate::messages::{IconStatus, Message, RuntimeChannel};
use crate::provider::ProviderChain;
use crate::settings::SettingsStore;

/// Elements whose text is never translated
const SKIPPED_PARENTS: [&str; 3] = ["SCRIPT", "STYLE", "NOSCRIPT"];

/// Access to the document the content script runs in
pub trait PageDom {
    type Node;

    /// Every text node under the body, in document order
    fn text_nodes(&self) -> Result<Vec<Self::Node>>;
    /// Upper-case tag name of the node's parent element
    fn parent_tag(&self, node: &Self::Node) -> Option<String>;
    fn node_value(&self, node: &Self::Node) -> Option<String>;
    fn set_node_value(&self, node: &Self::Node, value: &str) -> Result<()>;
    /// `lang` attribute of the document element
    fn declared_language(&self) -> Option<String>;
    fn reload(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Progress,
    Success,
    Failure,
}

/// On-page banner showing translation progress
pub trait StatusOverlay {
    fn show(&self, message: &str, tone: StatusTone);
}

/// Cooperative pause between batches
#[async_trait(?Send)]
pub trait Scheduler {
    async fn pause(&self, millis: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub nodes_found: usize,
    pub translated: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Running { id: Uuid },
    Completed(SessionReport),
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Another session was already running
    Skipped,
    Completed(SessionReport),
    Failed { reason: String },
}

/// Whether a text node takes part in translation
pub fn is_candidate(parent_tag: Option<&str>, value: Option<&str>) -> bool {
    let skipped_parent = parent_tag
        .map(|tag| SKIPPED_PARENTS.iter().any(|s| s.eq_ignore_ascii_case(tag)))
        .unwrap_or(false);
    !skipped_parent && value.is_some_and(|v| !v.trim().is_empty())
}

/// Icon hint from the page's declared language.
///
/// Red when the primary subtag is neither English nor the configured source,
/// or when it is the configured source; gray otherwise.
pub fn icon_status_for_page(declared: Option<&str>, source_lang: &str) -> IconStatus {
    let detected = declared
        .filter(|lang| !lang.is_empty())
        .and_then(|lang| lang.split('-').next())
        .map(str::to_lowercase);

    match detected.as_deref() {
        Some(lang) if lang != "en" && lang != source_lang => IconStatus::Red,
        Some(lang) if lang == source_lang => IconStatus::Red,
        _ => IconStatus::Gray,
    }
}

pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed as f64 / total as f64) * 100.0;
    percent.min(100.0).round() as u8
}

pub fn progress_message(processed: usize, total: usize, translated: usize) -> String {
    format!(
        "Translating... {}% ({} translated)",
        progress_percent(processed, total),
        translated
    )
}

pub struct PageTranslator<P: PageDom> {
    page: P,
    providers: ProviderChain,
    settings: Rc<dyn SettingsStore>,
    runtime: Rc<dyn RuntimeChannel>,
    overlay: Rc<dyn StatusOverlay>,
    scheduler: Rc<dyn Scheduler>,
    config: PipelineConfig,
    state: RefCell<SessionState>,
}

impl<P: PageDom> PageTranslator<P> {
    pub fn new(
        page: P,
        providers: ProviderChain,
        settings: Rc<dyn SettingsStore>,
        runtime: Rc<dyn RuntimeChannel>,
        overlay: Rc<dyn StatusOverlay>,
        scheduler: Rc<dyn Scheduler>,
        config: PipelineConfig,
    ) -> Self {
        PageTranslator {
            page,
            providers,
            settings,
            runtime,
            overlay,
            scheduler,
            config,
            state: RefCell::new(SessionState::Idle),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Running { .. })
    }

    /// Compare the declared page language with the settings and update the icon
    pub async fn detect_page_language(&self) -> IconStatus {
        let source_lang = match self.settings.load().await {
            Ok(Some(settings)) if !settings.from_lang.is_empty() => settings.from_lang,
            Ok(_) => FALLBACK_DETECTION_LANG.to_string(),
            Err(e) => {
                log_swallowed("content.detect", &e);
                FALLBACK_DETECTION_LANG.to_string()
            }
        };

        let declared = self.page.declared_language();
        let status = icon_status_for_page(declared.as_deref(), &source_lang);
        log::debug!("page language {:?}, source {} -> {}", declared, source_lang, status.name());

        if let Err(e) = self.runtime.send(&Message::UpdateIcon { status }).await {
            log_swallowed("content.update_icon", &e);
        }
        status
    }

    /// Translate every candidate text node in place.
    ///
    /// A call made while a session is running does nothing.
    pub async fn translate(&self, from_lang: &str, to_lang: &str) -> SessionOutcome {
        if let SessionState::Running { id } = *self.state.borrow() {
            log::info!("session {} already in progress, ignoring request", id);
            return SessionOutcome::Skipped;
        }

        let id = Uuid::new_v4();
        *self.state.borrow_mut() = SessionState::Running { id };
        log::info!("session {}: starting ({:?} -> {:?})", id, from_lang, to_lang);

        match self.run_session(id, from_lang, to_lang).await {
            Ok(report) => {
                *self.state.borrow_mut() = SessionState::Completed(report);
                log::info!(
                    "session {}: done, {} of {} nodes translated",
                    id,
                    report.translated,
                    report.nodes_found
                );
                self.overlay.show(
                    &format!("Translation complete! ({} items translated)", report.translated),
                    StatusTone::Success,
                );
                let icon = Message::UpdateIcon {
                    status: IconStatus::Green,
                };
                if let Err(e) = self.runtime.send(&icon).await {
                    log_swallowed("content.update_icon", &e);
                }
                SessionOutcome::Completed(report)
            }
            Err(e) => {
                log_swallowed(&format!("content.session.{}", id), &e);
                let reason = e.to_string();
                *self.state.borrow_mut() = SessionState::Failed {
                    reason: reason.clone(),
                };
                self.overlay
                    .show("Translation failed. Please try again.", StatusTone::Failure);
                SessionOutcome::Failed { reason }
            }
        }
    }

    async fn run_session(&self, id: Uuid, from_lang: &str, to_lang: &str) -> Result<SessionReport> {
        self.overlay.show("Translating...", StatusTone::Progress);

        let source = if from_lang.is_empty() { AUTO_SOURCE_LANG } else { from_lang };
        let target = if to_lang.is_empty() { FALLBACK_TARGET_LANG } else { to_lang };

        let nodes = self.candidate_nodes()?;
        let total = nodes.len();
        log::debug!("session {}: {} text nodes", id, total);

        let mut processed = 0;
        let mut translated = 0;
        for batch in nodes.chunks(self.config.batch_size.max(1)) {
            for node in batch {
                processed += 1;
                if self.translate_node(node, source, target).await? {
                    translated += 1;
                }
            }

            self.overlay
                .show(&progress_message(processed, total, translated), StatusTone::Progress);
            self.scheduler.pause(self.config.batch_pause_ms).await;
        }

        Ok(SessionReport {
            nodes_found: total,
            translated,
        })
    }

    fn candidate_nodes(&self) -> Result<Vec<P::Node>> {
        Ok(self
            .page
            .text_nodes()?
            .into_iter()
            .filter(|node| {
                is_candidate(
                    self.page.parent_tag(node).as_deref(),
                    self.page.node_value(node).as_deref(),
                )
            })
            .collect())
    }

    /// Returns true when the node's text was replaced
    async fn translate_node(&self, node: &P::Node, source: &str, target: &str) -> Result<bool> {
        let Some(current) = self.page.node_value(node) else {
            return Ok(false);
        };
        let original = current.trim();
        if original.is_empty() {
            return Ok(false);
        }

        let translated = self.providers.translate(original, source, target).await;
        if translated.is_empty() || translated == original {
            return Ok(false);
        }

        // First occurrence only; surrounding whitespace is preserved
        let replaced = current.replacen(original, &translated, 1);
        self.page.set_node_value(node, &replaced)?;
        Ok(true)
    }

    /// The only undo: reload the page and lose all in-page state
    pub fn reset_translation(&self) {
        if let Err(e) = self.page.reload() {
            log_swallowed("content.reset", &e);
        }
    }
}
