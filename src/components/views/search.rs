use crate::api::{display_name, SearchMatch};
use crate::components::{AppView, Icon, Navigation, ReaderServices};
use crate::utils::sleep_ms;
use dioxus::prelude::*;

pub const MIN_QUERY_CHARS: usize = 2;
pub const SEARCH_DEBOUNCE_MS: u64 = 500;
pub const MAX_RESULTS: usize = 10;

/// The trimmed query if it is long enough to send.
pub fn searchable_query(raw: &str) -> Option<String> {
    let query = raw.trim();
    (query.chars().count() >= MIN_QUERY_CHARS).then(|| query.to_string())
}

#[derive(Debug, Clone, PartialEq)]
enum SearchState {
    Idle,
    Searching,
    Done(Vec<SearchMatch>),
    Failed(String),
}

#[component]
pub fn SearchPanel() -> Element {
    let services = use_context::<ReaderServices>();
    let navigation = use_context::<Navigation>();
    let navigator = use_navigator();

    let mut search_query = use_signal(String::new);
    let mut results = use_signal(|| SearchState::Idle);
    let mut search_generation = use_signal(|| 0u64);

    // Debounce typing, then drop responses for anything but the latest query.
    {
        let client = services.client.clone();
        use_effect(move || {
            let raw_query = search_query();
            search_generation.with_mut(|value| *value = value.saturating_add(1));
            let generation = *search_generation.peek();

            let Some(query) = searchable_query(&raw_query) else {
                results.set(SearchState::Idle);
                return;
            };

            let client = client.clone();
            spawn(async move {
                sleep_ms(SEARCH_DEBOUNCE_MS).await;
                if *search_generation.peek() != generation {
                    return;
                }
                results.set(SearchState::Searching);

                let outcome = client.search(&query).await;
                if *search_generation.peek() != generation {
                    return;
                }
                match outcome {
                    Ok(mut matches) => {
                        matches.truncate(MAX_RESULTS);
                        results.set(SearchState::Done(matches));
                    }
                    Err(e) => {
                        tracing::warn!(%query, "search failed: {e}");
                        results.set(SearchState::Failed(e.to_string()));
                    }
                }
            });
        });
    }

    rsx! {
        div { class: "search-panel",
            div { class: "search-box",
                Icon { name: "search".to_string(), class: "icon search-box__icon".to_string() }
                input {
                    class: "search-box__input",
                    r#type: "search",
                    placeholder: "Search the translation...",
                    autofocus: true,
                    value: search_query,
                    oninput: move |e| search_query.set(e.value()),
                }
            }

            match results() {
                SearchState::Idle => rsx! {
                    p { class: "hint", "Type at least {MIN_QUERY_CHARS} characters." }
                },
                SearchState::Searching => rsx! {
                    div { class: "notice",
                        Icon { name: "loader".to_string(), class: "icon".to_string() }
                        span { "Searching..." }
                    }
                },
                SearchState::Failed(message) => rsx! {
                    p { class: "error-text", "Search failed: {message}" }
                },
                SearchState::Done(matches) if matches.is_empty() => rsx! {
                    p { class: "hint", "No verses found." }
                },
                SearchState::Done(matches) => rsx! {
                    ul { class: "search-results",
                        for hit in matches {
                            li { key: "{hit.reference}",
                                button {
                                    class: "search-result",
                                    onclick: {
                                        let reference = hit.reference;
                                        move |_| {
                                            navigation.close();
                                            navigator.push(AppView::verse(reference));
                                        }
                                    },
                                    span { class: "search-result__ref",
                                        "{display_name(hit.reference.surah)} {hit.reference.ayah}"
                                    }
                                    span { class: "search-result__text", "{hit.text}" }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queries_are_not_sent() {
        assert_eq!(searchable_query(""), None);
        assert_eq!(searchable_query("  a "), None);
        assert_eq!(searchable_query(" rahmet "), Some("rahmet".to_string()));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(searchable_query("ş"), None);
        assert_eq!(searchable_query("şü"), Some("şü".to_string()));
    }
}
