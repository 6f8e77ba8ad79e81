/// Reusable popup components

use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::page::StatusTone;

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    pub message: String,
    pub tone: StatusTone,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    let (bg_color, border_color) = match props.tone {
        StatusTone::Progress => ("#e3f2fd", "#2196f3"),
        StatusTone::Success => ("#e8f5e9", "#4caf50"),
        StatusTone::Failure => ("#ffebee", "#f44336"),
    };

    html! {
        <div style={format!("padding: 10px; border-radius: 4px; background-color: {}; border-left: 4px solid {}; margin: 10px 0;", bg_color, border_color)}>
            <p class="message-paragraph">{&props.message}</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LanguageSelectProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub value: String,
    pub onchange: Callback<String>,
    #[prop_or(false)]
    pub include_auto: bool,
}

#[function_component(LanguageSelect)]
pub fn language_select(props: &LanguageSelectProps) -> Html {
    let onchange = {
        let callback = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                callback.emit(select.value());
            }
        })
    };

    let options = props
        .include_auto
        .then_some(("auto", "Auto-detect"))
        .into_iter()
        .chain(crate::settings_form::LANGUAGES.iter().copied());

    html! {
        <div class="field">
            <label for={props.id.clone()} class="field-label">{&props.label}</label>
            <select id={props.id.clone()} class="field-select" {onchange}>
                {for options.map(|(code, name)| html! {
                    <option value={code} selected={code == props.value}>{name}</option>
                })}
            </select>
        </div>
    }
}
