use crate::api::{Verse, VerseRef};
use std::collections::HashMap;

/// Where the verses on screen came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewSource {
    #[default]
    Empty,
    Surah(u16),
    Category(String),
    Page(u16),
}

/// Reference to list position for the rendered verses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerseIndex {
    positions: HashMap<VerseRef, usize>,
}

impl VerseIndex {
    pub fn build(verses: &[Verse]) -> Self {
        let positions = verses
            .iter()
            .enumerate()
            .map(|(position, verse)| (verse.reference, position))
            .collect();
        Self { positions }
    }

    pub fn position(&self, reference: VerseRef) -> Option<usize> {
        self.positions.get(&reference).copied()
    }

    pub fn contains(&self, reference: VerseRef) -> bool {
        self.positions.contains_key(&reference)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    /// Marked active; the view should scroll to the item at this position.
    Scrolled(usize),
    /// Already active with nothing previewed; no scroll needed.
    Unchanged,
    /// Not rendered in the current list.
    Missing,
}

/// Displayed verses plus the active and preview markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub title: String,
    pub source: ViewSource,
    pub verses: Vec<Verse>,
    index: VerseIndex,
    active: Option<VerseRef>,
    preview: Option<VerseRef>,
}

impl ViewState {
    pub fn new(title: impl Into<String>, source: ViewSource, verses: Vec<Verse>) -> Self {
        let index = VerseIndex::build(&verses);
        Self {
            title: title.into(),
            source,
            verses,
            index,
            active: None,
            preview: None,
        }
    }

    pub fn index(&self) -> &VerseIndex {
        &self.index
    }

    pub fn active(&self) -> Option<VerseRef> {
        self.active
    }

    pub fn preview(&self) -> Option<VerseRef> {
        self.preview
    }

    pub fn is_active(&self, reference: VerseRef) -> bool {
        self.active == Some(reference)
    }

    pub fn is_preview(&self, reference: VerseRef) -> bool {
        self.preview == Some(reference)
    }

    pub fn shows(&self, source: &ViewSource) -> bool {
        &self.source == source && !self.verses.is_empty()
    }

    pub fn activate(&mut self, reference: VerseRef) -> HighlightOutcome {
        let Some(position) = self.index.position(reference) else {
            return HighlightOutcome::Missing;
        };
        if self.active == Some(reference) && self.preview.is_none() {
            return HighlightOutcome::Unchanged;
        }
        self.active = Some(reference);
        self.preview = None;
        HighlightOutcome::Scrolled(position)
    }

    /// Marks the lookahead verse without touching the active one.
    pub fn mark_preview(&mut self, reference: VerseRef) -> Option<usize> {
        let position = self.index.position(reference)?;
        if self.active == Some(reference) {
            return None;
        }
        self.preview = Some(reference);
        Some(position)
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Moves the active marker one verse along the list and returns the newly
    /// active verse. Without an active verse the first one is taken; at either
    /// end of the list nothing changes.
    pub fn step_active(&mut self, forward: bool) -> Option<VerseRef> {
        let position = match self.active.and_then(|active| self.index.position(active)) {
            None => 0,
            Some(position) if forward => position + 1,
            Some(position) => position.checked_sub(1)?,
        };
        let reference = self.verses.get(position)?.reference;
        self.active = Some(reference);
        self.preview = None;
        Some(reference)
    }
}

/// DOM id of the rendered verse.
pub fn verse_element_id(reference: VerseRef) -> String {
    format!("verse-{}-{}", reference.surah, reference.ayah)
}
