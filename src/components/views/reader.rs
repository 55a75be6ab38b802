use crate::api::{
    display_name, find_category, ExplanationClient, Surah, SurahInfo, VerseRef, SURAH_COUNT,
};
use crate::components::verse_view::{
    paragraphs, scroll_to_element, surah_view, verse_element_id, HighlightOutcome, VerseList,
    ViewSource, ViewState,
};
use crate::components::{AppView, Icon, ReaderServices, ReaderTarget, VerseViewSignal};
use crate::playback::Timings;
use crate::utils::{sleep_ms, LoadSequence};
use dioxus::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum SurahExplanation {
    Loading,
    Ready(String),
    Failed(String),
}

/// Marks `focus` active and centers it once the list has rendered.
async fn focus_verse(mut view: Signal<ViewState>, focus: VerseRef) {
    let outcome = view.write().activate(focus);
    if let HighlightOutcome::Scrolled(_) | HighlightOutcome::Unchanged = outcome {
        sleep_ms(Timings::default().highlight_delay_ms).await;
        scroll_to_element(&verse_element_id(focus));
    }
}

#[component]
pub fn ReaderView(surah: String, ayah: String, category: String) -> Element {
    let services = use_context::<ReaderServices>();
    let mut view = use_context::<VerseViewSignal>().0;
    let explainer = use_context::<Signal<ExplanationClient>>();
    let navigator = use_navigator();

    let mut loading = use_signal(|| false);
    let mut load_error = use_signal(|| None::<String>);
    let mut loads = use_signal(LoadSequence::default);
    let mut surah_explanation = use_signal(|| None::<SurahExplanation>);

    let target = ReaderTarget::from_query(&surah, &ayah, &category);

    {
        let client = services.client.clone();
        use_effect(use_reactive!(|target| {
            let client = client.clone();
            let generation = loads.with_mut(|loads| loads.begin());
            load_error.set(None);
            loading.set(false);
            surah_explanation.set(None);

            spawn(async move {
                match target {
                    ReaderTarget::Surah { number, focus } => {
                        if !view.peek().shows(&ViewSource::Surah(number)) {
                            loading.set(true);
                            let result = client.get_surah(number).await;
                            if !loads.peek().is_current(generation) {
                                return;
                            }
                            loading.set(false);
                            match result {
                                Ok(loaded) => view.set(surah_view(loaded)),
                                Err(e) => {
                                    tracing::warn!(number, "failed to load surah: {e}");
                                    load_error.set(Some(e.to_string()));
                                    return;
                                }
                            }
                        }
                        focus_verse(view, focus).await;
                    }
                    ReaderTarget::Category(name) => {
                        loading.set(true);
                        let result = client.category_verses(&name).await;
                        if !loads.peek().is_current(generation) {
                            return;
                        }
                        loading.set(false);
                        match result {
                            Ok(verses) => {
                                let title = match find_category(&name) {
                                    Some(found) => format!("{} {}", found.icon, found.name),
                                    None => name.clone(),
                                };
                                view.set(ViewState::new(title, ViewSource::Category(name), verses));
                            }
                            Err(e) => {
                                tracing::warn!(category = %name, "failed to load category: {e}");
                                load_error.set(Some(e.to_string()));
                            }
                        }
                    }
                }
            });
        }));
    }

    let state = view();
    let selected_surah = match &state.source {
        ViewSource::Surah(number) => *number,
        _ => 0,
    };
    let subtitle = match &state.source {
        ViewSource::Surah(number) => {
            format!("Surah {number} · {} verses", state.verses.len())
        }
        ViewSource::Category(_) => format!("{} verses on this topic", state.verses.len()),
        _ => String::new(),
    };

    let on_explain_surah = move |_| {
        let state = view.peek().clone();
        let ViewSource::Surah(number) = state.source else {
            return;
        };
        let client = explainer.peek().clone();
        surah_explanation.set(Some(SurahExplanation::Loading));
        spawn(async move {
            let surah = Surah {
                info: SurahInfo::from_remote(number, &state.title),
                verses: state.verses,
            };
            match client.explain_surah(&surah).await {
                Ok(text) => surah_explanation.set(Some(SurahExplanation::Ready(text))),
                Err(e) => surah_explanation.set(Some(SurahExplanation::Failed(e.to_string()))),
            }
        });
    };

    rsx! {
        section { class: "reader",
            header { class: "reader__header",
                div {
                    h1 { class: "reader__title", "{state.title}" }
                    if !subtitle.is_empty() {
                        p { class: "reader__subtitle", "{subtitle}" }
                    }
                }
                div { class: "reader__tools",
                    select {
                        class: "surah-select",
                        aria_label: "Choose surah",
                        onchange: move |e: Event<FormData>| {
                            if let Ok(number) = e.value().parse::<u16>() {
                                navigator.push(AppView::surah(number));
                            }
                        },
                        if selected_surah == 0 {
                            option { value: "", selected: true, "Choose a surah" }
                        }
                        for number in 1..=SURAH_COUNT {
                            option {
                                value: "{number}",
                                selected: number == selected_surah,
                                "{number}. {display_name(number)}"
                            }
                        }
                    }
                    if selected_surah != 0 {
                        button {
                            class: "btn btn--ghost",
                            onclick: on_explain_surah,
                            Icon { name: "sparkles".to_string(), class: "icon".to_string() }
                            span { "Explain surah" }
                        }
                    }
                }
            }

            if let Some(explanation) = surah_explanation() {
                div { class: "explain-box explain-box--surah",
                    button {
                        class: "icon-btn explain-box__close",
                        aria_label: "Close explanation",
                        onclick: move |_| surah_explanation.set(None),
                        Icon { name: "x".to_string(), class: "icon".to_string() }
                    }
                    match explanation {
                        SurahExplanation::Loading => rsx! {
                            div { class: "explain-box__loading",
                                Icon { name: "loader".to_string(), class: "icon".to_string() }
                                span { "Preparing an explanation..." }
                            }
                        },
                        SurahExplanation::Ready(text) => rsx! {
                            for paragraph in paragraphs(&text) {
                                p { "{paragraph}" }
                            }
                        },
                        SurahExplanation::Failed(message) => rsx! {
                            p { class: "error-text", "{message}" }
                        },
                    }
                }
            }

            if let Some(message) = load_error() {
                div { class: "notice notice--error",
                    p { "Could not load verses: {message}" }
                }
            } else if loading() {
                div { class: "notice",
                    Icon { name: "loader".to_string(), class: "icon".to_string() }
                    span { "Loading verses..." }
                }
            } else if state.verses.is_empty() && matches!(state.source, ViewSource::Category(_)) {
                div { class: "notice", p { "No verses in this topic." } }
            }

            VerseList {}
        }
    }
}
