/// DOM, fetch and timer adapters for the content script and popup

use std::cell::Cell;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Node, Response, Window};

use crate::content::{LocalTask, TaskSpawner};
use crate::error::{Result, TranslatorError, describe_js};
use crate::page::{PageDom, Scheduler, StatusOverlay, StatusTone};
use crate::provider::HttpClient;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;
const STATUS_ELEMENT_ID: &str = "translation-status";
const STATUS_STYLE: &str = "position: fixed; top: 20px; right: 20px; padding: 15px 20px; \
    color: white; border-radius: 5px; z-index: 999999; font-family: Arial, sans-serif; \
    font-size: 14px; box-shadow: 0 2px 10px rgba(0,0,0,0.3);";

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| TranslatorError::Page("no window".to_string()))
}

/// Run `f` once after `millis`; returns the timeout handle
pub fn after_delay(millis: u32, f: impl FnOnce() + 'static) -> Option<i32> {
    let window = window().ok()?;
    let callback = Closure::once_into_js(f);
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        millis as i32,
    ) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("setTimeout failed: {}", describe_js(&e));
            None
        }
    }
}

/// The live document
pub struct BrowserPage {
    document: Document,
}

impl BrowserPage {
    pub fn new() -> Result<Self> {
        let document = window()?
            .document()
            .ok_or_else(|| TranslatorError::Page("no document".to_string()))?;
        Ok(BrowserPage { document })
    }

    pub fn location_href(&self) -> Option<String> {
        self.document.location().and_then(|location| location.href().ok())
    }
}

impl PageDom for BrowserPage {
    type Node = Node;

    fn text_nodes(&self) -> Result<Vec<Node>> {
        let body = self
            .document
            .body()
            .ok_or_else(|| TranslatorError::Page("document has no body".to_string()))?;
        let walker = self
            .document
            .create_tree_walker_with_what_to_show(&body, SHOW_TEXT)
            .map_err(|e| TranslatorError::Page(describe_js(&e)))?;

        let mut nodes = Vec::new();
        while let Some(node) = walker
            .next_node()
            .map_err(|e| TranslatorError::Page(describe_js(&e)))?
        {
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn parent_tag(&self, node: &Node) -> Option<String> {
        node.parent_element().map(|parent| parent.tag_name())
    }

    fn node_value(&self, node: &Node) -> Option<String> {
        node.node_value()
    }

    fn set_node_value(&self, node: &Node, value: &str) -> Result<()> {
        node.set_node_value(Some(value));
        Ok(())
    }

    fn declared_language(&self) -> Option<String> {
        self.document
            .document_element()
            .and_then(|root| root.get_attribute("lang"))
            .filter(|lang| !lang.is_empty())
    }

    fn reload(&self) -> Result<()> {
        window()?
            .location()
            .reload()
            .map_err(|e| TranslatorError::Page(describe_js(&e)))
    }
}

/// Fixed-position banner in the page's top right corner
pub struct StatusBanner {
    success_dismiss_ms: u32,
    /// Timeout that will remove a success banner
    pending_dismiss: Cell<Option<i32>>,
}

impl StatusBanner {
    pub fn new(success_dismiss_ms: u32) -> Self {
        StatusBanner {
            success_dismiss_ms,
            pending_dismiss: Cell::new(None),
        }
    }

    fn render(&self, message: &str, tone: StatusTone) -> Result<()> {
        let window = window()?;
        // A newer message replaces the success banner, so it must not be removed
        if let Some(handle) = self.pending_dismiss.take() {
            window.clear_timeout_with_handle(handle);
        }

        let document = window
            .document()
            .ok_or_else(|| TranslatorError::Page("no document".to_string()))?;
        let banner = match document.get_element_by_id(STATUS_ELEMENT_ID) {
            Some(existing) => existing,
            None => {
                let created = document
                    .create_element("div")
                    .map_err(|e| TranslatorError::Page(describe_js(&e)))?;
                created.set_id(STATUS_ELEMENT_ID);
                let body = document
                    .body()
                    .ok_or_else(|| TranslatorError::Page("document has no body".to_string()))?;
                body.append_child(&created)
                    .map_err(|e| TranslatorError::Page(describe_js(&e)))?;
                created
            }
        };

        let background = match tone {
            StatusTone::Progress => "#333",
            StatusTone::Success => "#34a853",
            StatusTone::Failure => "#d93025",
        };
        banner
            .set_attribute("style", &format!("{} background-color: {};", STATUS_STYLE, background))
            .map_err(|e| TranslatorError::Page(describe_js(&e)))?;
        banner.set_text_content(Some(message));

        if tone == StatusTone::Success {
            self.pending_dismiss
                .set(after_delay(self.success_dismiss_ms, move || banner.remove()));
        }
        Ok(())
    }
}

impl StatusOverlay for StatusBanner {
    fn show(&self, message: &str, tone: StatusTone) {
        if let Err(e) = self.render(message, tone) {
            crate::logging::log_swallowed("content.status", &e);
        }
    }
}

/// `setTimeout` wrapped in a promise
pub struct TimerScheduler;

#[async_trait(?Send)]
impl Scheduler for TimerScheduler {
    async fn pause(&self, millis: u32) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            after_delay(millis, move || {
                let _ = resolve.call0(&JsValue::NULL);
            });
        });
        let _ = JsFuture::from(promise).await;
    }
}

/// `window.fetch`
pub struct FetchClient;

#[async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn get_json(&self, url: &Url) -> Result<Value> {
        let response = JsFuture::from(window()?.fetch_with_str(url.as_str()))
            .await
            .map_err(|e| TranslatorError::Network(describe_js(&e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|e| TranslatorError::Network(describe_js(&e)))?;
        if !response.ok() {
            return Err(TranslatorError::Network(format!("HTTP {}", response.status())));
        }

        let body = response
            .json()
            .map_err(|e| TranslatorError::MalformedResponse(describe_js(&e)))?;
        let body = JsFuture::from(body)
            .await
            .map_err(|e| TranslatorError::MalformedResponse(describe_js(&e)))?;
        Ok(serde_wasm_bindgen::from_value(body)?)
    }
}

/// `wasm_bindgen_futures::spawn_local`
pub struct LocalSpawner;

impl TaskSpawner for LocalSpawner {
    fn spawn(&self, task: LocalTask) {
        spawn_local(task);
    }
}
