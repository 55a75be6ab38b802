use super::scroll::scroll_to_element;
use super::state::{verse_element_id, HighlightOutcome, ViewSource, ViewState};
use crate::api::{ApiError, QuranClient, Surah, VerseRef};
use crate::components::AppView;
use crate::playback::VerseSurface;
use dioxus::prelude::*;
use dioxus::router::Navigator;
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;

pub fn surah_view(surah: Surah) -> ViewState {
    let number = surah.info.number;
    ViewState::new(surah.info.localized_name, ViewSource::Surah(number), surah.verses)
}

/// The verse list signal as driven by the recitation player.
pub struct ViewSurface {
    view: Signal<ViewState>,
    client: Rc<QuranClient>,
    navigator: Navigator,
}

impl ViewSurface {
    pub fn new(view: Signal<ViewState>, client: Rc<QuranClient>, navigator: Navigator) -> Self {
        Self {
            view,
            client,
            navigator,
        }
    }
}

impl VerseSurface for ViewSurface {
    fn highlight(&self, reference: VerseRef) {
        let mut view = self.view;
        let outcome = view.write().activate(reference);
        match outcome {
            HighlightOutcome::Scrolled(_) => scroll_to_element(&verse_element_id(reference)),
            HighlightOutcome::Unchanged => {}
            HighlightOutcome::Missing => {
                tracing::debug!(%reference, "playing verse is not on screen")
            }
        }
    }

    fn preview(&self, reference: VerseRef) {
        let mut view = self.view;
        if view.write().mark_preview(reference).is_some() {
            scroll_to_element(&verse_element_id(reference));
        }
    }

    fn clear_preview(&self) {
        let mut view = self.view;
        if view.peek().preview().is_some() {
            view.write().clear_preview();
        }
    }

    fn clear_active(&self) {
        let mut view = self.view;
        if view.peek().active().is_some() {
            view.write().clear_active();
        }
    }

    fn show_section(&self, surah: u16) -> LocalBoxFuture<'_, Result<(), ApiError>> {
        Box::pin(async move {
            if !self.view.peek().shows(&ViewSource::Surah(surah)) {
                let loaded = self.client.get_surah(surah).await?;
                let mut view = self.view;
                view.set(surah_view(loaded));
            }
            self.navigator.push(AppView::surah(surah));
            Ok(())
        })
    }
}
