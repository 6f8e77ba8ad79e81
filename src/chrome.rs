/// Bindings to the chrome.* extension APIs and the trait impls built on them

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::background::{Background, IconSetter};
use crate::error::{Result, TranslatorError, describe_js};
use crate::logging::log_swallowed;
use crate::messages::{Ack, IconPaths, IconStatus, Message, MessageHandler, RuntimeChannel, TabMessenger};
use crate::settings::{Settings, SettingsStore};
use crate::tabs::{MessageSender, TabChangeInfo, TabInfo};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    async fn storage_sync_get(keys: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    async fn storage_sync_set(items: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    async fn tabs_send_message(tab_id: i32, message: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn tabs_query(query: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "action"], js_name = setIcon)]
    async fn action_set_icon(details: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    async fn runtime_send_message(message: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn add_message_listener(callback: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onInstalled"], js_name = addListener)]
    fn add_installed_listener(callback: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onUpdated"], js_name = addListener)]
    fn add_tab_updated_listener(callback: &Closure<dyn FnMut(i32, JsValue, JsValue)>);
}

const SETTINGS_KEYS: [&str; 4] = ["fromLang", "toLang", "autoTranslate", "autoTranslateDomains"];

/// Serialize as a plain JS object (no `Map`s)
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Responses may legitimately be `undefined` when the listener sent nothing
fn ack_from_js(value: JsValue) -> Result<Ack> {
    if value.is_null() || value.is_undefined() {
        Ok(Ack::default())
    } else {
        from_js(value)
    }
}

/// `chrome.storage.sync`
pub struct ChromeSettingsStore;

#[async_trait(?Send)]
impl SettingsStore for ChromeSettingsStore {
    async fn load(&self) -> Result<Option<Settings>> {
        let keys = to_js(&SETTINGS_KEYS)?;
        let stored = storage_sync_get(&keys)
            .await
            .map_err(|e| TranslatorError::Storage(describe_js(&e)))?;

        let is_empty = stored.is_null()
            || stored.is_undefined()
            || js_sys::Object::keys(stored.unchecked_ref::<js_sys::Object>()).length() == 0;
        if is_empty {
            return Ok(None);
        }
        from_js(stored).map(Some)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let items = to_js(settings)?;
        storage_sync_set(&items)
            .await
            .map_err(|e| TranslatorError::Storage(describe_js(&e)))?;
        Ok(())
    }
}

/// `chrome.tabs` messaging
pub struct ChromeTabs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveTabQuery {
    active: bool,
    current_window: bool,
}

#[async_trait(?Send)]
impl TabMessenger for ChromeTabs {
    async fn send_to_tab(&self, tab_id: i32, message: &Message) -> Result<Ack> {
        let payload = to_js(message)?;
        let response = tabs_send_message(tab_id, &payload)
            .await
            .map_err(|e| TranslatorError::Delivery(describe_js(&e)))?;
        ack_from_js(response)
    }

    async fn active_tab_id(&self) -> Result<Option<i32>> {
        let query = to_js(&ActiveTabQuery {
            active: true,
            current_window: true,
        })?;
        let tabs_js = tabs_query(&query)
            .await
            .map_err(|e| TranslatorError::Delivery(describe_js(&e)))?;
        let tabs: Vec<TabInfo> = from_js(tabs_js)?;
        Ok(tabs.first().and_then(|tab| tab.id))
    }
}

/// `chrome.action.setIcon`
pub struct ChromeAction;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetIconDetails {
    tab_id: i32,
    path: IconPaths,
}

#[async_trait(?Send)]
impl IconSetter for ChromeAction {
    async fn set_icon(&self, tab_id: i32, status: IconStatus) -> Result<()> {
        let details = to_js(&SetIconDetails {
            tab_id,
            path: status.icon_paths(),
        })?;
        action_set_icon(&details)
            .await
            .map_err(|e| TranslatorError::Delivery(describe_js(&e)))?;
        Ok(())
    }
}

/// `chrome.runtime.sendMessage`
pub struct ChromeRuntime;

#[async_trait(?Send)]
impl RuntimeChannel for ChromeRuntime {
    async fn send(&self, message: &Message) -> Result<Ack> {
        let payload = to_js(message)?;
        let response = runtime_send_message(&payload)
            .await
            .map_err(|e| TranslatorError::Delivery(describe_js(&e)))?;
        ack_from_js(response)
    }
}

/// Connect `runtime.onMessage` to a handler.
///
/// Returns `true` for messages the handler accepts, keeping the channel open
/// until `sendResponse` is called once the handler's future resolves.
pub fn listen_for_messages(handler: Rc<dyn MessageHandler>) {
    let closure = Closure::wrap(Box::new(
        move |message: JsValue, sender: JsValue, send_response: js_sys::Function| -> JsValue {
            let message: Message = match from_js(message) {
                Ok(message) => message,
                Err(e) => {
                    log::debug!("ignoring unrecognised message: {}", e);
                    return JsValue::FALSE;
                }
            };
            if !handler.accepts(&message) {
                return JsValue::FALSE;
            }
            let sender_tab = from_js::<MessageSender>(sender)
                .ok()
                .and_then(|sender| sender.tab_id());

            let handler = handler.clone();
            spawn_local(async move {
                let Some(ack) = handler.handle(message, sender_tab).await else {
                    return;
                };
                let reply = to_js(&ack).and_then(|value| {
                    send_response
                        .call1(&JsValue::NULL, &value)
                        .map_err(|e| TranslatorError::Delivery(describe_js(&e)))
                });
                if let Err(e) = reply {
                    log_swallowed("listener.respond", &e);
                }
            });
            JsValue::TRUE
        },
    ) as Box<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>);

    add_message_listener(&closure);
    closure.forget();
}

/// Wire the background coordinator to install, message and tab events
pub fn register_background(background: Rc<Background>) {
    let on_installed = {
        let background = background.clone();
        Closure::wrap(Box::new(move |_details: JsValue| {
            let background = background.clone();
            spawn_local(async move {
                background.on_installed().await;
            });
        }) as Box<dyn FnMut(JsValue)>)
    };
    add_installed_listener(&on_installed);
    on_installed.forget();

    let on_updated = {
        let background = background.clone();
        Closure::wrap(Box::new(move |tab_id: i32, change: JsValue, tab: JsValue| {
            let change: TabChangeInfo = from_js(change).unwrap_or_default();
            if !change.is_complete() {
                return;
            }
            let url = from_js::<TabInfo>(tab).ok().and_then(|tab| tab.url);
            let background = background.clone();
            spawn_local(async move {
                background.on_tab_updated(tab_id, &change, url.as_deref()).await;
            });
        }) as Box<dyn FnMut(i32, JsValue, JsValue)>)
    };
    add_tab_updated_listener(&on_updated);
    on_updated.forget();

    listen_for_messages(background);
}
