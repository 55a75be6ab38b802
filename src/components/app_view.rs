//! Routes and the reader target they resolve to.

use crate::api::{verse_count, VerseRef, SURAH_COUNT};
use crate::components::views::{PageView, ReaderView};
use crate::components::AppShell;
use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum AppView {
    #[layout(AppShell)]
        #[route("/?:surah&:ayah&:category")]
        ReaderView { surah: String, ayah: String, category: String },
        #[route("/page/:number")]
        PageView { number: u16 },
}

impl AppView {
    pub fn surah(surah: u16) -> Self {
        AppView::ReaderView {
            surah: surah.to_string(),
            ayah: String::new(),
            category: String::new(),
        }
    }

    pub fn verse(reference: VerseRef) -> Self {
        AppView::ReaderView {
            surah: reference.surah.to_string(),
            ayah: reference.ayah.to_string(),
            category: String::new(),
        }
    }

    pub fn category(name: &str) -> Self {
        AppView::ReaderView {
            surah: String::new(),
            ayah: String::new(),
            category: name.to_string(),
        }
    }
}

pub fn view_label(view: &AppView) -> String {
    match view {
        AppView::ReaderView { .. } => "Reader".to_string(),
        AppView::PageView { number } => format!("Page {number}"),
    }
}

/// What the reader route should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderTarget {
    Surah { number: u16, focus: VerseRef },
    Category(String),
}

impl Default for ReaderTarget {
    fn default() -> Self {
        ReaderTarget::Surah {
            number: 1,
            focus: VerseRef::opening(),
        }
    }
}

impl ReaderTarget {
    /// A valid surah number wins over a category; with neither, the opening.
    pub fn from_query(surah: &str, ayah: &str, category: &str) -> Self {
        if let Some(number) = surah
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|n| (1..=SURAH_COUNT).contains(n))
        {
            let last = verse_count(number).unwrap_or(1);
            let requested = ayah.trim().parse::<u16>().unwrap_or(1);
            let focus = VerseRef::new(number, requested.clamp(1, last));
            return ReaderTarget::Surah { number, focus };
        }

        let category = category.trim();
        if !category.is_empty() {
            return ReaderTarget::Category(category.to_string());
        }
        ReaderTarget::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surah_takes_precedence_over_category() {
        assert_eq!(
            ReaderTarget::from_query("18", "", "Dua"),
            ReaderTarget::Surah {
                number: 18,
                focus: VerseRef::new(18, 1)
            }
        );
    }

    #[test]
    fn ayah_is_clamped_into_the_surah() {
        assert_eq!(
            ReaderTarget::from_query("1", "99", ""),
            ReaderTarget::Surah {
                number: 1,
                focus: VerseRef::new(1, 7)
            }
        );
        assert_eq!(
            ReaderTarget::from_query("2", "0", ""),
            ReaderTarget::Surah {
                number: 2,
                focus: VerseRef::new(2, 1)
            }
        );
        assert_eq!(
            ReaderTarget::from_query("2", "255", ""),
            ReaderTarget::Surah {
                number: 2,
                focus: VerseRef::new(2, 255)
            }
        );
    }

    #[test]
    fn invalid_surah_falls_through_to_category() {
        assert_eq!(
            ReaderTarget::from_query("115", "3", " Sabır "),
            ReaderTarget::Category("Sabır".to_string())
        );
        assert_eq!(
            ReaderTarget::from_query("abc", "", "İlim"),
            ReaderTarget::Category("İlim".to_string())
        );
    }

    #[test]
    fn empty_query_opens_the_first_verse() {
        assert_eq!(ReaderTarget::from_query("", "", ""), ReaderTarget::default());
        assert_eq!(ReaderTarget::from_query("0", "", "  "), ReaderTarget::default());
    }

    #[test]
    fn route_helpers_round_trip_through_the_target() {
        let AppView::ReaderView {
            surah,
            ayah,
            category,
        } = AppView::verse(VerseRef::new(36, 12))
        else {
            panic!("reader route expected");
        };
        assert_eq!(
            ReaderTarget::from_query(&surah, &ayah, &category),
            ReaderTarget::Surah {
                number: 36,
                focus: VerseRef::new(36, 12)
            }
        );
    }
}
