//! The scrollable verse list with its active and preview markers.

mod scroll;
mod state;
mod surface;

pub use scroll::scroll_to_element;
pub use state::{verse_element_id, HighlightOutcome, ViewSource, ViewState};
pub use surface::{surah_view, ViewSurface};

use crate::api::{ExplanationClient, Verse};
use crate::components::{run_player, Icon, PlayerStatusSignal, ReaderServices, VerseViewSignal};
use dioxus::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum Explanation {
    Loading,
    Ready(String),
    Failed(String),
}

/// Splits generated text into paragraphs for rendering.
pub fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim().replace("**", ""))
        .filter(|p| !p.is_empty())
        .collect()
}

#[component]
pub fn VerseList() -> Element {
    let view = use_context::<VerseViewSignal>().0;
    let state = view();

    if state.verses.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { class: "verse-list",
            for verse in state.verses.iter() {
                VerseCard {
                    key: "{verse.reference}",
                    active: state.is_active(verse.reference),
                    preview: state.is_preview(verse.reference),
                    verse: verse.clone(),
                }
            }
        }
    }
}

#[component]
fn VerseCard(verse: Verse, active: bool, preview: bool) -> Element {
    let services = use_context::<ReaderServices>();
    let status = use_context::<PlayerStatusSignal>().0;
    let mut explaining = use_signal(|| false);

    let reference = verse.reference;
    let element_id = verse_element_id(reference);
    let class = match (active, preview) {
        (true, _) => "verse verse--active",
        (false, true) => "verse verse--preview",
        _ => "verse",
    };
    let is_current = status().current == Some(reference);
    let label = verse.label();
    let play_class = if is_current { "icon-btn icon-btn--on" } else { "icon-btn" };
    let explain_class = if explaining() { "icon-btn icon-btn--on" } else { "icon-btn" };
    let sajda_title = verse.sajda.map(|sajda| {
        if sajda.obligatory {
            "Obligatory prostration"
        } else {
            "Recommended prostration"
        }
    });
    let meta = match (verse.juz, verse.page) {
        (Some(juz), Some(page)) => Some(format!("Juz {juz} · Page {page}")),
        _ => None,
    };

    let on_play = {
        let player = services.player.clone();
        move |_| {
            run_player(player.clone(), status, move |player| async move {
                player.play_verse(reference).await
            })
        }
    };

    rsx! {
        article {
            id: "{element_id}",
            class: "{class}",
            "data-surah": "{reference.surah}",
            "data-ayah": "{reference.ayah}",
            header { class: "verse__header",
                span { class: "verse__number", "{label}" }
                if let Some(title) = sajda_title {
                    span { class: "verse__badge", title: "{title}", "۩" }
                }
                div { class: "verse__actions",
                    button {
                        class: "{play_class}",
                        aria_label: "Play verse",
                        onclick: on_play,
                        Icon { name: "play".to_string(), class: "icon".to_string() }
                    }
                    button {
                        class: "{explain_class}",
                        aria_label: "Explain verse",
                        onclick: move |_| explaining.set(!explaining()),
                        Icon { name: "sparkles".to_string(), class: "icon".to_string() }
                    }
                }
            }
            p { class: "verse__arabic", lang: "ar", dir: "rtl", "{verse.text}" }
            if !verse.translation.is_empty() {
                p { class: "verse__translation", "{verse.translation}" }
            }
            if let Some(meta) = meta {
                p { class: "verse__meta", "{meta}" }
            }
            if explaining() {
                ExplainBox { verse: verse.clone() }
            }
        }
    }
}

#[component]
fn ExplainBox(verse: Verse) -> Element {
    let explainer = use_context::<Signal<ExplanationClient>>();
    let mut explanation = use_signal(|| Explanation::Loading);

    use_effect(move || {
        let verse = verse.clone();
        let client = explainer.peek().clone();
        spawn(async move {
            match client.explain_verse(&verse, None).await {
                Ok(text) => explanation.set(Explanation::Ready(text)),
                Err(e) => explanation.set(Explanation::Failed(e.to_string())),
            }
        });
    });

    rsx! {
        div { class: "explain-box",
            match explanation() {
                Explanation::Loading => rsx! {
                    div { class: "explain-box__loading",
                        Icon { name: "loader".to_string(), class: "icon".to_string() }
                        span { "Preparing an explanation..." }
                    }
                },
                Explanation::Ready(text) => rsx! {
                    for paragraph in paragraphs(&text) {
                        p { "{paragraph}" }
                    }
                },
                Explanation::Failed(message) => rsx! {
                    p { class: "error-text", "{message}" }
                },
            }
        }
    }
}
