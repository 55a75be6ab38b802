use crate::api::CATEGORIES;
use crate::components::{AppView, Navigation};
use dioxus::prelude::*;

#[component]
pub fn CategoriesPanel() -> Element {
    let navigation = use_context::<Navigation>();
    let navigator = use_navigator();

    rsx! {
        div { class: "category-grid",
            for category in CATEGORIES.iter() {
                button {
                    key: "{category.name}",
                    class: "category-card",
                    onclick: move |_| {
                        navigation.close();
                        navigator.push(AppView::category(category.name));
                    },
                    span { class: "category-card__icon", "{category.icon}" }
                    span { class: "category-card__name", "{category.name}" }
                    span { class: "category-card__count", "{category.verses.len()} verses" }
                }
            }
        }
    }
}
