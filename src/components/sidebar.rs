use crate::components::{AppView, Icon, Navigation, Overlay};
use dioxus::prelude::*;

#[component]
pub fn Sidebar() -> Element {
    let navigation = use_context::<Navigation>();
    let navigator = use_navigator();
    let route = use_route::<AppView>();
    let open_overlay = navigation.overlay();

    let reading = matches!(route, AppView::ReaderView { .. }) && open_overlay.is_none();
    let paging = matches!(route, AppView::PageView { .. }) && open_overlay.is_none();

    rsx! {
        aside { class: "sidebar",
            div { class: "sidebar__brand",
                div { class: "sidebar__logo", "ق" }
                div {
                    h1 { class: "sidebar__title", "Quran Reader" }
                    p { class: "sidebar__subtitle", "Read, listen, reflect" }
                }
            }

            nav { class: "sidebar__nav",
                p { class: "sidebar__section", "Read" }
                NavItem {
                    icon: "book",
                    label: "Reader",
                    active: reading,
                    onclick: move |_| {
                        navigation.close();
                        navigation.close_menu();
                        navigator.push(AppView::surah(1));
                    },
                }
                NavItem {
                    icon: "grid",
                    label: "Pages",
                    active: paging,
                    onclick: move |_| {
                        navigation.close();
                        navigation.close_menu();
                        navigator.push(AppView::PageView { number: 1 });
                    },
                }
                NavItem {
                    icon: "search",
                    label: "Search",
                    active: open_overlay == Some(Overlay::Search),
                    onclick: move |_| navigation.open(Overlay::Search),
                }
                NavItem {
                    icon: "sparkles",
                    label: "Topics",
                    active: open_overlay == Some(Overlay::Categories),
                    onclick: move |_| navigation.open(Overlay::Categories),
                }

                p { class: "sidebar__section", "Listen & learn" }
                NavItem {
                    icon: "headphones",
                    label: "Listen",
                    active: open_overlay == Some(Overlay::Listen),
                    onclick: move |_| navigation.open(Overlay::Listen),
                }
                NavItem {
                    icon: "sparkles",
                    label: "Ask AI",
                    active: open_overlay == Some(Overlay::Ask),
                    onclick: move |_| navigation.open(Overlay::Ask),
                }
            }
        }
    }
}

#[component]
fn NavItem(icon: String, label: String, active: bool, onclick: EventHandler<MouseEvent>) -> Element {
    let class = if active { "nav-item nav-item--active" } else { "nav-item" };

    rsx! {
        button {
            class: "{class}",
            onclick: move |e| onclick.call(e),
            Icon { name: icon.clone(), class: "icon".to_string() }
            span { "{label}" }
        }
    }
}
