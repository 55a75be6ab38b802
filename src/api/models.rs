use serde::{Deserialize, Serialize};
use std::fmt;

use super::surahs::{surah_name, verse_count, SURAH_COUNT};

/// A `surah:ayah` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseRef {
    pub surah: u16,
    pub ayah: u16,
}

impl VerseRef {
    pub const fn new(surah: u16, ayah: u16) -> Self {
        Self { surah, ayah }
    }

    /// First verse of the first surah.
    pub const fn opening() -> Self {
        Self::new(1, 1)
    }

    pub fn is_valid(&self) -> bool {
        match verse_count(self.surah) {
            Some(count) => self.ayah >= 1 && self.ayah <= count,
            None => false,
        }
    }

    /// Next verse inside the same surah, `None` past its last verse.
    pub fn next_in_surah(&self) -> Option<Self> {
        let count = verse_count(self.surah)?;
        if self.ayah < count {
            Some(Self::new(self.surah, self.ayah + 1))
        } else {
            None
        }
    }

    /// Verse before this one, crossing into the previous surah's last verse
    /// and wrapping from 1:1 to the last verse of surah 114.
    pub fn previous_wrapping(&self) -> Self {
        if self.ayah > 1 {
            return Self::new(self.surah, self.ayah - 1);
        }
        let surah = if self.surah <= 1 {
            SURAH_COUNT
        } else {
            self.surah - 1
        };
        Self::new(surah, verse_count(surah).unwrap_or(1))
    }

    /// The verse shown as a preview shortly before this one ends.
    pub fn preview_successor(&self) -> Self {
        self.next_in_surah().unwrap_or_else(|| {
            let surah = if self.surah >= SURAH_COUNT {
                1
            } else {
                self.surah + 1
            };
            Self::new(surah, 1)
        })
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surah, self.ayah)
    }
}

/// Surah metadata shared by list entries and verse records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SurahInfo {
    pub number: u16,
    /// Transliterated name as returned by the content API.
    pub name: String,
    /// Localized name from the built-in table, API name when the table misses.
    pub localized_name: String,
    #[serde(default)]
    pub english_meaning: Option<String>,
    #[serde(default)]
    pub revelation_type: Option<String>,
    #[serde(default)]
    pub verse_count: Option<u16>,
}

impl SurahInfo {
    pub fn from_remote(number: u16, english_name: &str) -> Self {
        Self {
            number,
            name: english_name.to_string(),
            localized_name: surah_name(number)
                .map(str::to_string)
                .unwrap_or_else(|| english_name.to_string()),
            english_meaning: None,
            revelation_type: None,
            verse_count: verse_count(number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sajda {
    pub id: u16,
    pub recommended: bool,
    pub obligatory: bool,
}

/// One verse with its script text and translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Position in the whole mushaf (1..=6236).
    pub number: u32,
    pub reference: VerseRef,
    pub text: String,
    pub translation: String,
    pub surah: SurahInfo,
    #[serde(default)]
    pub juz: Option<u16>,
    #[serde(default)]
    pub manzil: Option<u16>,
    #[serde(default)]
    pub page: Option<u16>,
    #[serde(default)]
    pub ruku: Option<u16>,
    #[serde(default)]
    pub hizb_quarter: Option<u16>,
    #[serde(default)]
    pub sajda: Option<Sajda>,
}

impl Verse {
    pub fn label(&self) -> String {
        format!("{} · Verse {}", self.surah.localized_name, self.reference.ayah)
    }
}

/// A full surah with its verses in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surah {
    pub info: SurahInfo,
    pub verses: Vec<Verse>,
}

/// One mushaf page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuranPage {
    pub number: u16,
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub reference: VerseRef,
    pub surah_name: String,
    pub text: String,
    pub number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_in_surah_stops_at_last_verse() {
        assert_eq!(VerseRef::new(1, 6).next_in_surah(), Some(VerseRef::new(1, 7)));
        assert_eq!(VerseRef::new(1, 7).next_in_surah(), None);
        assert_eq!(VerseRef::new(114, 6).next_in_surah(), None);
    }

    #[test]
    fn previous_crosses_into_last_verse_of_previous_surah() {
        assert_eq!(VerseRef::new(2, 1).previous_wrapping(), VerseRef::new(1, 7));
        assert_eq!(VerseRef::new(3, 1).previous_wrapping(), VerseRef::new(2, 286));
        assert_eq!(VerseRef::new(2, 5).previous_wrapping(), VerseRef::new(2, 4));
    }

    #[test]
    fn previous_wraps_from_opening_to_last_surah() {
        assert_eq!(VerseRef::opening().previous_wrapping(), VerseRef::new(114, 6));
    }

    #[test]
    fn previous_lands_on_every_surah_last_verse() {
        for surah in 2..=SURAH_COUNT {
            let prev = VerseRef::new(surah, 1).previous_wrapping();
            assert_eq!(prev.surah, surah - 1);
            assert_eq!(Some(prev.ayah), verse_count(surah - 1));
            assert!(prev.is_valid());
        }
    }

    #[test]
    fn preview_successor_moves_to_next_surah_and_wraps() {
        assert_eq!(VerseRef::new(1, 7).preview_successor(), VerseRef::new(2, 1));
        assert_eq!(VerseRef::new(114, 6).preview_successor(), VerseRef::new(1, 1));
        assert_eq!(VerseRef::new(2, 10).preview_successor(), VerseRef::new(2, 11));
    }

    #[test]
    fn validity_respects_bounds() {
        assert!(VerseRef::new(2, 286).is_valid());
        assert!(!VerseRef::new(2, 287).is_valid());
        assert!(!VerseRef::new(2, 0).is_valid());
        assert!(!VerseRef::new(0, 1).is_valid());
        assert!(!VerseRef::new(115, 1).is_valid());
    }

    #[test]
    fn surah_info_prefers_localized_table() {
        let info = SurahInfo::from_remote(1, "Al-Faatiha");
        assert_eq!(info.localized_name, "Fatiha");
        assert_eq!(info.name, "Al-Faatiha");
        assert_eq!(info.verse_count, Some(7));

        let unknown = SurahInfo::from_remote(200, "Mystery");
        assert_eq!(unknown.localized_name, "Mystery");
        assert_eq!(unknown.verse_count, None);
    }
}
