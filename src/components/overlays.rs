use crate::components::views::{AskPanel, CategoriesPanel, ListenPanel, SearchPanel};
use crate::components::{Icon, Navigation, Overlay};
use dioxus::prelude::*;

/// Renders whichever panel the menu opened, above the reader.
#[component]
pub fn OverlayHost() -> Element {
    let navigation = use_context::<Navigation>();
    let Some(overlay) = navigation.overlay() else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "overlay-backdrop",
            onclick: move |_| navigation.close(),
            div {
                class: "overlay",
                role: "dialog",
                aria_label: "{overlay.title()}",
                onclick: move |evt: MouseEvent| evt.stop_propagation(),
                header { class: "overlay__header",
                    h2 { class: "overlay__title", "{overlay.title()}" }
                    button {
                        class: "icon-btn",
                        aria_label: "Close",
                        onclick: move |_| navigation.close(),
                        Icon { name: "x".to_string(), class: "icon".to_string() }
                    }
                }
                div { class: "overlay__body",
                    match overlay {
                        Overlay::Listen => rsx! { ListenPanel {} },
                        Overlay::Search => rsx! { SearchPanel {} },
                        Overlay::Categories => rsx! { CategoriesPanel {} },
                        Overlay::Ask => rsx! { AskPanel {} },
                    }
                }
            }
        }
    }
}
