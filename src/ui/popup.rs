/// Popup UI: settings editor and manual translate trigger

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::chrome::{ChromeSettingsStore, ChromeTabs};
use crate::config::{POPUP_CLOSE_DELAY_MS, SAVED_NOTICE_MS};
use crate::logging::log_swallowed;
use crate::page::StatusTone;
use crate::settings::SettingsStore;
use crate::settings_form::{SettingsForm, request_translation, save_settings};
use crate::ui::components::{LanguageSelect, StatusLine};
use crate::web::after_delay;

#[derive(Clone, PartialEq)]
struct PopupNotice {
    message: String,
    tone: StatusTone,
}

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Ready,
    Busy,
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let form = use_state(SettingsForm::default);
    let notice = use_state(|| None::<PopupNotice>);
    let domain_error = use_state(|| None::<String>);

    // Load settings on mount
    {
        let state = state.clone();
        let form = form.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match ChromeSettingsStore.load_or_default().await {
                    Ok(settings) => form.set(SettingsForm::from(&settings)),
                    Err(e) => log_swallowed("popup.load", &e),
                }
                state.set(PopupState::Ready);
            });
            || ()
        });
    }

    let on_from_lang = {
        let form = form.clone();
        Callback::from(move |lang: String| {
            let mut next = (*form).clone();
            next.from_lang = lang;
            form.set(next);
        })
    };

    let on_to_lang = {
        let form = form.clone();
        Callback::from(move |lang: String| {
            let mut next = (*form).clone();
            next.to_lang = lang;
            form.set(next);
        })
    };

    let on_auto_translate = {
        let form = form.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut next = (*form).clone();
                next.auto_translate = input.checked();
                form.set(next);
            }
        })
    };

    // Live validation while typing
    let on_domains_input = {
        let form = form.clone();
        let domain_error = domain_error.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut next = (*form).clone();
                next.domains_input = input.value();
                domain_error.set(next.domain_error());
                form.set(next);
            }
        })
    };

    let on_translate = {
        let form = form.clone();
        let notice = notice.clone();
        let state = state.clone();
        Callback::from(move |_| {
            let form = (*form).clone();
            let notice = notice.clone();
            let state = state.clone();

            state.set(PopupState::Busy);
            spawn_local(async move {
                match request_translation(&form, &ChromeTabs).await {
                    Ok(_) => {
                        notice.set(Some(PopupNotice {
                            message: "Translation started...".to_string(),
                            tone: StatusTone::Success,
                        }));
                        after_delay(POPUP_CLOSE_DELAY_MS, || {
                            if let Some(window) = web_sys::window() {
                                let _ = window.close();
                            }
                        });
                    }
                    Err(e) => {
                        notice.set(Some(PopupNotice {
                            message: e.to_string(),
                            tone: StatusTone::Failure,
                        }));
                    }
                }
                state.set(PopupState::Ready);
            });
        })
    };

    let on_save = {
        let form = form.clone();
        let notice = notice.clone();
        let domain_error = domain_error.clone();
        Callback::from(move |_| {
            let current = (*form).clone();
            if let Some(error) = current.domain_error() {
                domain_error.set(Some(error));
                return;
            }

            let form = form.clone();
            let notice = notice.clone();
            spawn_local(async move {
                match save_settings(&current, &ChromeSettingsStore).await {
                    Ok(saved) => {
                        form.set(SettingsForm::from(&saved));
                        notice.set(Some(PopupNotice {
                            message: "Settings saved successfully!".to_string(),
                            tone: StatusTone::Success,
                        }));
                        let notice = notice.clone();
                        after_delay(SAVED_NOTICE_MS, move || notice.set(None));
                    }
                    Err(e) => {
                        notice.set(Some(PopupNotice {
                            message: e.to_string(),
                            tone: StatusTone::Failure,
                        }));
                    }
                }
            });
        })
    };

    let is_busy = !matches!(*state, PopupState::Ready);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Page Translator"}</h1>

            if *state == PopupState::Loading {
                <div class="loading-text-center">
                    <Spinner />
                </div>
            }

            <LanguageSelect
                id="fromLang"
                label="From"
                value={form.from_lang.clone()}
                onchange={on_from_lang}
                include_auto={true}
            />
            <LanguageSelect
                id="toLang"
                label="To"
                value={form.to_lang.clone()}
                onchange={on_to_lang}
            />

            <Button onclick={on_translate} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                {"Translate Page"}
            </Button>

            <div class="settings-section">
                <label class="checkbox-label">
                    <input
                        type="checkbox"
                        id="autoTranslate"
                        checked={form.auto_translate}
                        onchange={on_auto_translate}
                    />
                    {" Auto-translate matching domains"}
                </label>

                <input
                    type="text"
                    id="domains"
                    class="domains-input"
                    placeholder=".kr, example.com"
                    value={form.domains_input.clone()}
                    oninput={on_domains_input}
                />
                if let Some(error) = (*domain_error).clone() {
                    <Alert r#type={AlertType::Danger} title={error} inline={true}>
                    </Alert>
                }

                <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Save Settings"}
                </Button>
            </div>

            if let Some(notice) = (*notice).clone() {
                <StatusLine message={notice.message} tone={notice.tone} />
            }

            <p class="footer-popup">
                {"Page Translator v0.1.0"}
            </p>
        </div>
    }
}
