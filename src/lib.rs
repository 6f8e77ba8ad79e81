/// Page Translator - Chrome Extension for in-page translation
/// Built with Rust + WASM + Yew

mod background;
mod chrome;
mod config;
mod content;
mod domains;
mod error;
mod logging;
mod messages;
mod page;
mod provider;
mod settings;
mod settings_form;
mod tabs;
pub mod ui;
mod web;

#[cfg(test)]
mod testing;

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::background::Background;
use crate::chrome::{ChromeAction, ChromeRuntime, ChromeSettingsStore, ChromeTabs};
use crate::config::PipelineConfig;
use crate::content::ContentAgent;
use crate::error::TranslatorError;
use crate::page::PageTranslator;
use crate::provider::ProviderChain;
use crate::web::{BrowserPage, FetchClient, LocalSpawner, StatusBanner, TimerScheduler};

// Set up panic hook and logging for every extension context
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
}

// Start the service worker: install, message and tab listeners
#[wasm_bindgen]
pub fn start_background() {
    let background = Rc::new(Background::new(
        Rc::new(ChromeSettingsStore),
        Rc::new(ChromeTabs),
        Rc::new(ChromeAction),
    ));
    chrome::register_background(background);
    log::info!("background started");
}

// Start the content script for the current page
#[wasm_bindgen]
pub fn start_content_script() -> Result<(), JsValue> {
    let page = BrowserPage::new().map_err(to_js_error)?;
    let url = page.location_href().unwrap_or_default();
    let config = PipelineConfig::default();
    let runtime = Rc::new(ChromeRuntime);

    let translator = Rc::new(PageTranslator::new(
        page,
        ProviderChain::public(Rc::new(FetchClient)),
        Rc::new(ChromeSettingsStore),
        runtime.clone(),
        Rc::new(StatusBanner::new(config.success_dismiss_ms)),
        Rc::new(TimerScheduler),
        config,
    ));
    let agent = Rc::new(ContentAgent::new(translator.clone(), runtime, Rc::new(LocalSpawner)));

    chrome::listen_for_messages(agent.clone());

    // Initial detection, then again with auto-translate check once loaded
    wasm_bindgen_futures::spawn_local(async move {
        translator.detect_page_language().await;
    });

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let on_load = Closure::once_into_js(move || {
        wasm_bindgen_futures::spawn_local(async move {
            agent.on_page_loaded(&url).await;
        });
    });
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
    Ok(())
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

fn to_js_error(err: TranslatorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
