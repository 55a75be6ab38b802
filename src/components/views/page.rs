use crate::api::PAGE_COUNT;
use crate::components::verse_view::{ViewSource, ViewState, VerseList};
use crate::components::{AppView, Icon, ReaderServices, VerseViewSignal};
use crate::utils::LoadSequence;
use dioxus::prelude::*;

/// Previous and next page numbers, if any.
pub fn page_neighbours(number: u16) -> (Option<u16>, Option<u16>) {
    let number = number.clamp(1, PAGE_COUNT);
    let previous = (number > 1).then(|| number - 1);
    let next = (number < PAGE_COUNT).then(|| number + 1);
    (previous, next)
}

#[component]
pub fn PageView(number: u16) -> Element {
    let services = use_context::<ReaderServices>();
    let mut view = use_context::<VerseViewSignal>().0;
    let navigator = use_navigator();
    let mut load_error = use_signal(|| None::<String>);
    let mut loading = use_signal(|| false);
    let mut loads = use_signal(LoadSequence::default);

    let number = number.clamp(1, PAGE_COUNT);
    let (previous, next) = page_neighbours(number);

    {
        let client = services.client.clone();
        use_effect(use_reactive!(|number| {
            // Any response still in flight belongs to a page we left.
            let generation = loads.with_mut(|loads| loads.begin());
            load_error.set(None);
            if view.peek().shows(&ViewSource::Page(number)) {
                loading.set(false);
                return;
            }
            let client = client.clone();
            loading.set(true);
            spawn(async move {
                let result = client.get_page(number).await;
                if !loads.peek().is_current(generation) {
                    tracing::debug!(number, "dropping stale page response");
                    return;
                }
                loading.set(false);
                match result {
                    Ok(page) => view.set(ViewState::new(
                        format!("Page {}", page.number),
                        ViewSource::Page(number),
                        page.verses,
                    )),
                    Err(e) => {
                        tracing::warn!(number, "failed to load page: {e}");
                        load_error.set(Some(e.to_string()));
                    }
                }
            });
        }));
    }

    let showing = view().shows(&ViewSource::Page(number));

    rsx! {
        section { class: "reader",
            header { class: "reader__header",
                h1 { class: "reader__title", "Page {number}" }
                div { class: "pager",
                    button {
                        class: "icon-btn",
                        aria_label: "Previous page",
                        disabled: previous.is_none(),
                        onclick: move |_| {
                            if let Some(page) = previous {
                                navigator.push(AppView::PageView { number: page });
                            }
                        },
                        Icon { name: "chevron-left".to_string(), class: "icon".to_string() }
                    }
                    span { class: "pager__label", "{number} / {PAGE_COUNT}" }
                    button {
                        class: "icon-btn",
                        aria_label: "Next page",
                        disabled: next.is_none(),
                        onclick: move |_| {
                            if let Some(page) = next {
                                navigator.push(AppView::PageView { number: page });
                            }
                        },
                        Icon { name: "chevron-right".to_string(), class: "icon".to_string() }
                    }
                }
            }

            if let Some(message) = load_error() {
                div { class: "notice notice--error",
                    p { "Could not load page: {message}" }
                }
            } else if loading() {
                div { class: "notice",
                    Icon { name: "loader".to_string(), class: "icon".to_string() }
                    span { "Loading page..." }
                }
            }

            if showing {
                VerseList {}
            }
        }
    }
}
