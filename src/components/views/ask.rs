use crate::api::{ExplanationClient, KeyCheck, MAX_QUESTION_CHARS};
use crate::components::verse_view::paragraphs;
use crate::components::{Icon, ReaderServices, VerseViewSignal};
use crate::db::save_api_key;
use dioxus::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum Answer {
    Waiting,
    Ready(String),
    Failed(String),
}

#[component]
pub fn AskPanel() -> Element {
    let explainer = use_context::<Signal<ExplanationClient>>();
    let has_key = explainer().has_credential();

    rsx! {
        div { class: "ask-panel",
            if has_key {
                QuestionForm {}
            }
            KeyForm { has_key }
        }
    }
}

#[component]
fn QuestionForm() -> Element {
    let explainer = use_context::<Signal<ExplanationClient>>();
    let view = use_context::<VerseViewSignal>().0;
    let mut question = use_signal(String::new);
    let mut about_active = use_signal(|| false);
    let mut answer = use_signal(|| None::<Answer>);

    let active_verse = {
        let state = view();
        state
            .active()
            .and_then(|reference| state.verses.iter().find(|v| v.reference == reference).cloned())
    };
    let context_label = active_verse.as_ref().map(|v| v.label());
    let remaining = MAX_QUESTION_CHARS.saturating_sub(question().chars().count());
    let busy = answer() == Some(Answer::Waiting);

    let on_submit = move |e: FormEvent| {
        e.prevent_default();
        if busy {
            return;
        }
        let client = explainer.peek().clone();
        let text = question.peek().clone();
        let context = if *about_active.peek() {
            active_verse.clone()
        } else {
            None
        };
        answer.set(Some(Answer::Waiting));
        spawn(async move {
            match client.ask(&text, context.as_ref()).await {
                Ok(reply) => answer.set(Some(Answer::Ready(reply))),
                Err(e) => answer.set(Some(Answer::Failed(e.to_string()))),
            }
        });
    };

    rsx! {
        form { class: "ask-form", onsubmit: on_submit,
            label { class: "field",
                span { class: "field__label", "Your question" }
                textarea {
                    class: "field__input",
                    rows: "4",
                    maxlength: "{MAX_QUESTION_CHARS}",
                    placeholder: "What does the Quran say about patience?",
                    value: question,
                    oninput: move |e| question.set(e.value()),
                }
                span { class: "field__hint", "{remaining} characters left" }
            }
            if let Some(label) = context_label {
                label { class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: about_active(),
                        onchange: move |e| about_active.set(e.checked()),
                    }
                    span { "Ask about verse {label}" }
                }
            }
            button { class: "btn btn--primary", r#type: "submit", disabled: busy,
                Icon { name: "sparkles".to_string(), class: "icon".to_string() }
                span { "Ask" }
            }
        }

        match answer() {
            None => rsx! {},
            Some(Answer::Waiting) => rsx! {
                div { class: "explain-box__loading",
                    Icon { name: "loader".to_string(), class: "icon".to_string() }
                    span { "Thinking..." }
                }
            },
            Some(Answer::Ready(text)) => rsx! {
                div { class: "explain-box",
                    for paragraph in paragraphs(&text) {
                        p { "{paragraph}" }
                    }
                }
            },
            Some(Answer::Failed(message)) => rsx! {
                p { class: "error-text", "{message}" }
            },
        }
    }
}

#[component]
fn KeyForm(has_key: bool) -> Element {
    let services = use_context::<ReaderServices>();
    let mut explainer = use_context::<Signal<ExplanationClient>>();
    let mut key_input = use_signal(String::new);
    let mut checking = use_signal(|| false);
    let mut result = use_signal(|| None::<KeyCheck>);

    let on_save = move |e: FormEvent| {
        e.prevent_default();
        if checking() {
            return;
        }
        let key = key_input.peek().trim().to_string();
        let client = explainer.peek().clone();
        let store = services.store.clone();
        checking.set(true);
        spawn(async move {
            let check = client.check_key(Some(&key)).await;
            if check.valid {
                match save_api_key(store.as_ref(), &key) {
                    Ok(()) => {
                        explainer.write().set_api_key(key);
                        key_input.set(String::new());
                        tracing::info!("explanation credential saved");
                    }
                    Err(e) => tracing::warn!("failed to save credential: {e}"),
                }
            }
            result.set(Some(check));
            checking.set(false);
        });
    };

    let status_class = match result() {
        Some(KeyCheck { valid: true, .. }) => "field__hint field__hint--ok",
        Some(_) => "field__hint error-text",
        None => "field__hint",
    };
    let heading = if has_key { "Replace API key" } else { "Gemini API key" };

    rsx! {
        form { class: "key-form", onsubmit: on_save,
            h3 { "{heading}" }
            if !has_key {
                p { class: "hint",
                    "Explanations need a Gemini API key. It is stored only on this device."
                }
            }
            label { class: "field",
                input {
                    class: "field__input",
                    r#type: "password",
                    autocomplete: "off",
                    placeholder: "Paste your key",
                    value: key_input,
                    oninput: move |e| key_input.set(e.value()),
                }
            }
            if let Some(check) = result() {
                span { class: "{status_class}", "{check.message}" }
            }
            button {
                class: "btn btn--ghost",
                r#type: "submit",
                disabled: checking() || key_input().trim().is_empty(),
                if checking() {
                    Icon { name: "loader".to_string(), class: "icon".to_string() }
                    span { "Checking..." }
                } else {
                    span { "Check and save" }
                }
            }
        }
    }
}
