// Verse-by-verse recitation with auto-advance and section boundary prompts.
use super::background::BackgroundMusic;
use super::output::{AudioOutput, PlaybackError};
use super::ForegroundGate;
use crate::api::{ApiError, QuranClient, VerseRef, SURAH_COUNT};
use crate::db::nearest_speed;
use crate::utils::sleep_ms;
use futures_util::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("{0} is not a verse of the Quran")]
    OutOfRange(VerseRef),

    #[error(transparent)]
    Content(#[from] ApiError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Resolves the recitation audio for a verse.
pub trait VerseAudioSource {
    fn audio_url(&self, reference: VerseRef) -> LocalBoxFuture<'_, Result<String, ApiError>>;
}

impl VerseAudioSource for QuranClient {
    fn audio_url(&self, reference: VerseRef) -> LocalBoxFuture<'_, Result<String, ApiError>> {
        Box::pin(self.get_audio_url(reference))
    }
}

/// The rendered verse list as the player sees it.
pub trait VerseSurface {
    fn highlight(&self, reference: VerseRef);
    fn preview(&self, reference: VerseRef);
    fn clear_preview(&self);
    fn clear_active(&self);
    /// Loads and shows a whole section.
    fn show_section(&self, surah: u16) -> LocalBoxFuture<'_, Result<(), ApiError>>;
}

/// Modal questions asked at section boundaries.
pub trait Prompter {
    fn confirm_next_section(&self, finished: u16, next: u16) -> LocalBoxFuture<'_, bool>;
    fn announce_completion(&self) -> LocalBoxFuture<'_, ()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub highlight_delay_ms: u64,
    pub advance_delay_ms: u64,
    pub preview_lead_secs: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            highlight_delay_ms: 250,
            advance_delay_ms: 500,
            preview_lead_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Idle,
    Loading,
    Playing,
    Paused,
    AwaitingSectionChoice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub phase: PlayerPhase,
    pub current: Option<VerseRef>,
    pub speed: f64,
    pub position: f64,
    pub duration: Option<f64>,
}

/// What a progress tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    None,
    PreviewArmed(VerseRef),
    VerseEnded { generation: u64 },
}

#[derive(Debug)]
struct PlayerState {
    phase: PlayerPhase,
    current: Option<VerseRef>,
    speed: f64,
    generation: u64,
    armed_for: Option<u64>,
    ended_handled: Option<u64>,
}

pub struct RecitationPlayer {
    output: Rc<dyn AudioOutput>,
    source: Rc<dyn VerseAudioSource>,
    surface: Rc<dyn VerseSurface>,
    prompter: Rc<dyn Prompter>,
    background: Rc<BackgroundMusic>,
    gate: ForegroundGate,
    timings: Timings,
    state: RefCell<PlayerState>,
}

impl RecitationPlayer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        output: Rc<dyn AudioOutput>,
        source: Rc<dyn VerseAudioSource>,
        surface: Rc<dyn VerseSurface>,
        prompter: Rc<dyn Prompter>,
        background: Rc<BackgroundMusic>,
        gate: ForegroundGate,
        timings: Timings,
        speed: f64,
    ) -> Self {
        let speed = nearest_speed(speed);
        output.set_playback_rate(speed);
        Self {
            output,
            source,
            surface,
            prompter,
            background,
            gate,
            timings,
            state: RefCell::new(PlayerState {
                phase: PlayerPhase::Idle,
                current: None,
                speed,
                generation: 0,
                armed_for: None,
                ended_handled: None,
            }),
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.state.borrow().phase
    }

    pub fn current(&self) -> Option<VerseRef> {
        self.state.borrow().current
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == PlayerPhase::Playing
    }

    pub fn speed(&self) -> f64 {
        self.state.borrow().speed
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let state = self.state.borrow();
        PlayerSnapshot {
            phase: state.phase,
            current: state.current,
            speed: state.speed,
            position: self.output.current_time(),
            duration: self.output.duration(),
        }
    }

    /// Brings the output's view of the engine up to date before a tick.
    pub async fn refresh_output(&self) {
        self.output.refresh().await;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    fn set_phase(&self, phase: PlayerPhase) {
        self.state.borrow_mut().phase = phase;
    }

    /// Loads and starts one verse, superseding whatever was playing.
    pub async fn play_verse(&self, reference: VerseRef) -> Result<(), PlayerError> {
        if !reference.is_valid() {
            return Err(PlayerError::OutOfRange(reference));
        }
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.phase = PlayerPhase::Loading;
            state.current = Some(reference);
            state.armed_for = None;
            state.ended_handled = None;
            state.generation
        };
        self.surface.clear_preview();
        tracing::debug!(%reference, generation, "loading verse");

        let result = self.load_and_start(reference, generation).await;
        if !self.is_current(generation) {
            return Ok(());
        }
        if let Err(e) = result {
            tracing::warn!(%reference, "verse playback failed: {e}");
            self.output.pause();
            self.gate.set(false);
            self.set_phase(PlayerPhase::Idle);
            return Err(e);
        }

        self.set_phase(PlayerPhase::Playing);
        self.gate.set(true);
        self.background.pause_for_foreground();

        // Let the engine settle before the view measures layout.
        sleep_ms(self.timings.highlight_delay_ms).await;
        if self.is_current(generation) && self.is_playing() {
            self.surface.highlight(reference);
        }
        Ok(())
    }

    async fn load_and_start(&self, reference: VerseRef, generation: u64) -> Result<(), PlayerError> {
        let url = self.source.audio_url(reference).await?;
        if !self.is_current(generation) {
            return Ok(());
        }
        self.output.set_source(&url);
        self.output.set_playback_rate(self.speed());
        self.output.start().await?;
        Ok(())
    }

    /// Progress tick. Arms the preview of the following verse once per verse
    /// and reports the end of the current one once.
    pub fn poll(&self) -> PlayerEvent {
        let mut state = self.state.borrow_mut();
        if state.phase != PlayerPhase::Playing {
            return PlayerEvent::None;
        }
        let Some(current) = state.current else {
            return PlayerEvent::None;
        };
        let generation = state.generation;

        if self.output.ended() {
            if state.ended_handled == Some(generation) {
                return PlayerEvent::None;
            }
            state.ended_handled = Some(generation);
            return PlayerEvent::VerseEnded { generation };
        }

        if state.armed_for == Some(generation) {
            return PlayerEvent::None;
        }
        let Some(duration) = self.output.duration() else {
            return PlayerEvent::None;
        };
        let remaining = duration - self.output.current_time();
        if remaining > 0.0 && remaining <= self.timings.preview_lead_secs {
            state.armed_for = Some(generation);
            drop(state);
            let next = current.preview_successor();
            self.surface.preview(next);
            return PlayerEvent::PreviewArmed(next);
        }
        PlayerEvent::None
    }

    /// Clears the markers of a finished verse and advances after a short pause.
    pub async fn finish_verse(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        self.surface.clear_active();
        self.surface.clear_preview();
        self.state.borrow_mut().armed_for = None;

        sleep_ms(self.timings.advance_delay_ms).await;
        if !self.is_current(generation) {
            return;
        }
        if let Err(e) = self.next().await {
            tracing::warn!("auto-advance failed: {e}");
        }
    }

    /// Next verse; at a section end asks before moving on, and stops after
    /// the last section.
    pub async fn next(&self) -> Result<(), PlayerError> {
        let Some(current) = self.current() else {
            return self.play_verse(VerseRef::opening()).await;
        };
        if let Some(next) = current.next_in_surah() {
            return self.play_verse(next).await;
        }

        let generation = self.state.borrow().generation;
        self.pause().await;
        self.set_phase(PlayerPhase::AwaitingSectionChoice);

        if current.surah >= SURAH_COUNT {
            self.prompter.announce_completion().await;
            if self.is_current(generation) {
                self.set_phase(PlayerPhase::Paused);
            }
            return Ok(());
        }

        let next_surah = current.surah + 1;
        let accepted = self
            .prompter
            .confirm_next_section(current.surah, next_surah)
            .await;
        if !self.is_current(generation) || self.phase() != PlayerPhase::AwaitingSectionChoice {
            return Ok(());
        }
        if !accepted {
            tracing::debug!(surah = current.surah, "next section declined");
            self.set_phase(PlayerPhase::Paused);
            return Ok(());
        }

        if let Err(e) = self.surface.show_section(next_surah).await {
            tracing::warn!(surah = next_surah, "failed to show next section: {e}");
        }
        self.play_verse(VerseRef::new(next_surah, 1)).await
    }

    /// Previous verse, crossing into the previous section and wrapping from
    /// the first verse to the last one.
    pub async fn previous(&self) -> Result<(), PlayerError> {
        let target = self
            .current()
            .map(|current| current.previous_wrapping())
            .unwrap_or_else(VerseRef::opening);
        self.play_verse(target).await
    }

    pub async fn pause(&self) {
        self.output.pause();
        self.gate.set(false);
        {
            let mut state = self.state.borrow_mut();
            if matches!(state.phase, PlayerPhase::Playing | PlayerPhase::Loading) {
                state.phase = PlayerPhase::Paused;
            }
        }
        self.background.resume_after_foreground().await;
    }

    /// Continues the loaded verse. A verse that already ended starts over
    /// and reports its end again. Does nothing while a section prompt is open.
    pub async fn resume(&self) -> Result<(), PlayerError> {
        if self.phase() == PlayerPhase::AwaitingSectionChoice {
            return Ok(());
        }
        if self.output.source().is_none() {
            return Err(PlaybackError::NoSource.into());
        }
        let replaying = self.output.ended();
        self.output.start().await?;
        let current = {
            let mut state = self.state.borrow_mut();
            state.phase = PlayerPhase::Playing;
            if replaying {
                state.ended_handled = None;
                state.armed_for = None;
            }
            state.current
        };
        self.gate.set(true);
        self.background.pause_for_foreground();
        if let (true, Some(current)) = (replaying, current) {
            self.surface.highlight(current);
        }
        Ok(())
    }

    pub async fn toggle_play_pause(&self) -> Result<(), PlayerError> {
        match self.phase() {
            PlayerPhase::Playing | PlayerPhase::Loading => {
                self.pause().await;
                Ok(())
            }
            // The open prompt owns the next step.
            PlayerPhase::AwaitingSectionChoice => Ok(()),
            PlayerPhase::Paused if self.output.source().is_some() => self.resume().await,
            _ => {
                let target = self.current().unwrap_or_else(VerseRef::opening);
                self.play_verse(target).await
            }
        }
    }

    /// Applies the closest allowed speed and returns it.
    pub fn set_speed(&self, speed: f64) -> f64 {
        let speed = nearest_speed(speed);
        self.state.borrow_mut().speed = speed;
        self.output.set_playback_rate(speed);
        speed
    }

    pub fn teardown(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.phase = PlayerPhase::Idle;
        }
        self.gate.set(false);
        self.output.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::playback::background::BACKGROUND_TRACK_URL;
    use crate::playback::output::DetachedOutput;
    use futures_channel::oneshot;
    use std::cell::Cell;

    #[derive(Default)]
    struct ScriptedSource {
        failing: RefCell<Vec<VerseRef>>,
    }

    impl VerseAudioSource for ScriptedSource {
        fn audio_url(&self, reference: VerseRef) -> LocalBoxFuture<'_, Result<String, ApiError>> {
            let result = if self.failing.borrow().contains(&reference) {
                Err(ApiError::Status(500))
            } else {
                Ok(format!("https://cdn.example/{}/{}.mp3", reference.surah, reference.ayah))
            };
            Box::pin(futures_util::future::ready(result))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceCall {
        Highlight(VerseRef),
        Preview(VerseRef),
        ClearPreview,
        ClearActive,
        ShowSection(u16),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: RefCell<Vec<SurfaceCall>>,
    }

    impl RecordingSurface {
        fn calls(&self) -> Vec<SurfaceCall> {
            self.calls.borrow().clone()
        }
    }

    impl VerseSurface for RecordingSurface {
        fn highlight(&self, reference: VerseRef) {
            self.calls.borrow_mut().push(SurfaceCall::Highlight(reference));
        }

        fn preview(&self, reference: VerseRef) {
            self.calls.borrow_mut().push(SurfaceCall::Preview(reference));
        }

        fn clear_preview(&self) {
            self.calls.borrow_mut().push(SurfaceCall::ClearPreview);
        }

        fn clear_active(&self) {
            self.calls.borrow_mut().push(SurfaceCall::ClearActive);
        }

        fn show_section(&self, surah: u16) -> LocalBoxFuture<'_, Result<(), ApiError>> {
            self.calls.borrow_mut().push(SurfaceCall::ShowSection(surah));
            Box::pin(futures_util::future::ready(Ok(())))
        }
    }

    struct FixedPrompter {
        accept: bool,
        asked: RefCell<Vec<(u16, u16)>>,
        completions: Cell<usize>,
    }

    impl FixedPrompter {
        fn answering(accept: bool) -> Self {
            Self {
                accept,
                asked: RefCell::new(Vec::new()),
                completions: Cell::new(0),
            }
        }
    }

    impl Prompter for FixedPrompter {
        fn confirm_next_section(&self, finished: u16, next: u16) -> LocalBoxFuture<'_, bool> {
            self.asked.borrow_mut().push((finished, next));
            Box::pin(futures_util::future::ready(self.accept))
        }

        fn announce_completion(&self) -> LocalBoxFuture<'_, ()> {
            self.completions.set(self.completions.get() + 1);
            Box::pin(futures_util::future::ready(()))
        }
    }

    /// Answers the section question only when the test says so.
    struct GatedPrompter {
        answer: RefCell<Option<oneshot::Receiver<bool>>>,
    }

    impl GatedPrompter {
        fn new() -> (Self, oneshot::Sender<bool>) {
            let (tx, rx) = oneshot::channel();
            let prompter = Self {
                answer: RefCell::new(Some(rx)),
            };
            (prompter, tx)
        }
    }

    impl Prompter for GatedPrompter {
        fn confirm_next_section(&self, _finished: u16, _next: u16) -> LocalBoxFuture<'_, bool> {
            let answer = self.answer.borrow_mut().take();
            Box::pin(async move {
                match answer {
                    Some(rx) => rx.await.unwrap_or(false),
                    None => false,
                }
            })
        }

        fn announce_completion(&self) -> LocalBoxFuture<'_, ()> {
            Box::pin(futures_util::future::ready(()))
        }
    }

    struct Rig<P = FixedPrompter> {
        player: RecitationPlayer,
        output: DetachedOutput,
        background_output: DetachedOutput,
        background: Rc<BackgroundMusic>,
        gate: ForegroundGate,
        source: Rc<ScriptedSource>,
        surface: Rc<RecordingSurface>,
        prompter: Rc<P>,
    }

    const INSTANT: Timings = Timings {
        highlight_delay_ms: 0,
        advance_delay_ms: 0,
        preview_lead_secs: 1.0,
    };

    fn rig(accept_next_section: bool) -> Rig {
        rig_with(FixedPrompter::answering(accept_next_section))
    }

    fn rig_with<P: Prompter + 'static>(prompter: P) -> Rig<P> {
        let gate = ForegroundGate::new();
        let background_output = DetachedOutput::new();
        let background = Rc::new(BackgroundMusic::new(
            Rc::new(background_output.clone()),
            Rc::new(MemoryStore::new()),
            gate.clone(),
            BACKGROUND_TRACK_URL,
        ));
        let output = DetachedOutput::new();
        let source = Rc::new(ScriptedSource::default());
        let surface = Rc::new(RecordingSurface::default());
        let prompter = Rc::new(prompter);
        let player = RecitationPlayer::new(
            Rc::new(output.clone()),
            source.clone(),
            surface.clone(),
            prompter.clone(),
            background.clone(),
            gate.clone(),
            INSTANT,
            1.0,
        );
        Rig {
            player,
            output,
            background_output,
            background,
            gate,
            source,
            surface,
            prompter,
        }
    }

    #[tokio::test]
    async fn play_verse_starts_audio_and_highlights() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(2, 255)).await.unwrap();

        assert_eq!(rig.player.phase(), PlayerPhase::Playing);
        assert_eq!(rig.player.current(), Some(VerseRef::new(2, 255)));
        assert_eq!(
            rig.output.source().as_deref(),
            Some("https://cdn.example/2/255.mp3")
        );
        assert_eq!(
            rig.surface.calls(),
            vec![
                SurfaceCall::ClearPreview,
                SurfaceCall::Highlight(VerseRef::new(2, 255))
            ]
        );
    }

    #[tokio::test]
    async fn out_of_range_reference_is_rejected() {
        let rig = rig(true);
        assert!(matches!(
            rig.player.play_verse(VerseRef::new(1, 8)).await,
            Err(PlayerError::OutOfRange(_))
        ));
        assert_eq!(rig.player.phase(), PlayerPhase::Idle);
    }

    #[tokio::test]
    async fn failed_lookup_returns_to_idle() {
        let rig = rig(true);
        rig.source.failing.borrow_mut().push(VerseRef::new(3, 1));
        assert!(matches!(
            rig.player.play_verse(VerseRef::new(3, 1)).await,
            Err(PlayerError::Content(_))
        ));
        assert_eq!(rig.player.phase(), PlayerPhase::Idle);
        assert!(rig.output.is_paused());
    }

    #[tokio::test]
    async fn blocked_start_returns_to_idle() {
        let rig = rig(true);
        rig.output.block_autoplay(true);
        assert!(matches!(
            rig.player.play_verse(VerseRef::opening()).await,
            Err(PlayerError::Playback(PlaybackError::Blocked))
        ));
        assert_eq!(rig.player.phase(), PlayerPhase::Idle);
    }

    #[tokio::test]
    async fn foreground_actions_keep_background_silent() {
        // Every background state against every foreground action.
        #[derive(Clone, Copy, Debug)]
        enum Before {
            Idle,
            Playing,
            PausedByUser,
            Suspended,
        }
        #[derive(Clone, Copy, Debug)]
        enum Action {
            PlayVerse,
            Resume,
            Next,
            Previous,
            Toggle,
        }

        for before in [Before::Idle, Before::Playing, Before::PausedByUser, Before::Suspended] {
            for action in [
                Action::PlayVerse,
                Action::Resume,
                Action::Next,
                Action::Previous,
                Action::Toggle,
            ] {
                let rig = rig(true);
                if matches!(action, Action::Resume) {
                    rig.player.play_verse(VerseRef::new(2, 1)).await.unwrap();
                    rig.player.pause().await;
                }
                match before {
                    Before::Idle => {}
                    Before::Playing => rig.background.play().await.unwrap(),
                    Before::PausedByUser => {
                        rig.background.play().await.unwrap();
                        rig.background.pause();
                    }
                    Before::Suspended => {
                        rig.background.play().await.unwrap();
                        rig.background.pause_for_foreground();
                    }
                }

                let result = match action {
                    Action::PlayVerse => rig.player.play_verse(VerseRef::new(2, 2)).await,
                    Action::Resume => rig.player.resume().await,
                    Action::Next => rig.player.next().await,
                    Action::Previous => rig.player.previous().await,
                    Action::Toggle => rig.player.toggle_play_pause().await,
                };
                assert!(result.is_ok(), "{before:?} / {action:?}");
                assert_eq!(rig.player.phase(), PlayerPhase::Playing, "{before:?} / {action:?}");
                assert!(
                    !rig.background.is_playing(),
                    "background audible after {before:?} / {action:?}"
                );
                if matches!(before, Before::Playing) {
                    assert!(rig.background.is_suspended(), "{before:?} / {action:?}");
                }
            }
        }
    }

    #[tokio::test]
    async fn pause_hands_audio_back_to_background() {
        let rig = rig(true);
        rig.background.play().await.unwrap();
        rig.player.play_verse(VerseRef::opening()).await.unwrap();
        assert!(!rig.background.is_playing());

        rig.player.pause().await;
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
        assert!(rig.background.is_playing());
        assert!(!rig.background.is_suspended());

        rig.player.resume().await.unwrap();
        assert!(!rig.background.is_playing());
        assert!(rig.background.is_suspended());
    }

    #[tokio::test]
    async fn user_paused_background_stays_paused() {
        let rig = rig(true);
        rig.background.play().await.unwrap();
        rig.background.pause();
        rig.player.play_verse(VerseRef::opening()).await.unwrap();
        rig.player.pause().await;
        assert!(!rig.background.is_playing());
        assert_eq!(rig.background_output.start_count(), 1);
    }

    #[tokio::test]
    async fn preview_arms_once_per_verse() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(1, 3)).await.unwrap();
        rig.output.set_duration(10.0);

        rig.output.advance_to(5.0);
        assert_eq!(rig.player.poll(), PlayerEvent::None);

        rig.output.advance_to(9.2);
        assert_eq!(
            rig.player.poll(),
            PlayerEvent::PreviewArmed(VerseRef::new(1, 4))
        );
        rig.output.advance_to(9.6);
        assert_eq!(rig.player.poll(), PlayerEvent::None);
        assert!(rig
            .surface
            .calls()
            .contains(&SurfaceCall::Preview(VerseRef::new(1, 4))));
    }

    #[tokio::test]
    async fn verse_end_auto_advances() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(1, 3)).await.unwrap();
        rig.output.set_duration(4.0);
        rig.output.finish();

        let PlayerEvent::VerseEnded { generation } = rig.player.poll() else {
            panic!("expected end of verse");
        };
        assert_eq!(rig.player.poll(), PlayerEvent::None);

        rig.player.finish_verse(generation).await;
        assert_eq!(rig.player.current(), Some(VerseRef::new(1, 4)));
        assert_eq!(rig.player.phase(), PlayerPhase::Playing);
        let calls = rig.surface.calls();
        assert!(calls.contains(&SurfaceCall::ClearActive));
        assert_eq!(calls.last(), Some(&SurfaceCall::Highlight(VerseRef::new(1, 4))));
    }

    #[tokio::test]
    async fn stale_end_tick_is_ignored() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(1, 3)).await.unwrap();
        rig.output.finish();
        let PlayerEvent::VerseEnded { generation } = rig.player.poll() else {
            panic!("expected end of verse");
        };

        // The user jumps elsewhere before the tick is handled.
        rig.player.play_verse(VerseRef::new(36, 1)).await.unwrap();
        rig.player.finish_verse(generation).await;
        assert_eq!(rig.player.current(), Some(VerseRef::new(36, 1)));
        assert!(!rig.surface.calls().contains(&SurfaceCall::ClearActive));
    }

    #[tokio::test]
    async fn declining_next_section_leaves_playback_paused() {
        let rig = rig(false);
        rig.player.play_verse(VerseRef::new(1, 7)).await.unwrap();
        rig.player.next().await.unwrap();

        assert_eq!(rig.prompter.asked.borrow().as_slice(), &[(1, 2)]);
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
        assert_eq!(rig.player.current(), Some(VerseRef::new(1, 7)));
        assert!(rig.output.is_paused());
        assert!(!rig.surface.calls().contains(&SurfaceCall::ShowSection(2)));
    }

    #[tokio::test]
    async fn accepting_next_section_starts_its_first_verse() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(1, 7)).await.unwrap();
        rig.player.next().await.unwrap();

        assert_eq!(rig.player.current(), Some(VerseRef::new(2, 1)));
        assert_eq!(rig.player.phase(), PlayerPhase::Playing);
        assert!(rig.surface.calls().contains(&SurfaceCall::ShowSection(2)));
    }

    #[tokio::test]
    async fn last_section_announces_completion_without_wrapping() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(114, 6)).await.unwrap();
        rig.player.next().await.unwrap();

        assert_eq!(rig.prompter.completions.get(), 1);
        assert!(rig.prompter.asked.borrow().is_empty());
        assert_eq!(rig.player.current(), Some(VerseRef::new(114, 6)));
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
    }

    #[tokio::test]
    async fn replaying_after_a_declined_section_reports_the_end_again() {
        let rig = rig(false);
        rig.background.play().await.unwrap();
        rig.player.play_verse(VerseRef::new(1, 7)).await.unwrap();
        rig.output.finish();
        let PlayerEvent::VerseEnded { generation } = rig.player.poll() else {
            panic!("expected end of verse");
        };
        rig.player.finish_verse(generation).await;
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
        assert!(rig.background.is_playing());

        rig.player.toggle_play_pause().await.unwrap();
        assert_eq!(rig.player.phase(), PlayerPhase::Playing);
        assert!(!rig.output.is_paused());
        assert!(!rig.background.is_playing());
        assert_eq!(
            rig.surface.calls().last(),
            Some(&SurfaceCall::Highlight(VerseRef::new(1, 7)))
        );

        rig.output.finish();
        let PlayerEvent::VerseEnded { generation } = rig.player.poll() else {
            panic!("second end of the replayed verse was swallowed");
        };
        rig.player.finish_verse(generation).await;
        assert_eq!(rig.prompter.asked.borrow().as_slice(), &[(1, 2), (1, 2)]);
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
        assert!(!rig.gate.is_active());
        assert!(rig.background.is_playing());
    }

    #[tokio::test]
    async fn replaying_the_final_verse_announces_completion_again() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::new(114, 6)).await.unwrap();
        rig.output.finish();
        let PlayerEvent::VerseEnded { generation } = rig.player.poll() else {
            panic!("expected end of verse");
        };
        rig.player.finish_verse(generation).await;
        assert_eq!(rig.prompter.completions.get(), 1);

        rig.player.resume().await.unwrap();
        rig.output.finish();
        let PlayerEvent::VerseEnded { generation } = rig.player.poll() else {
            panic!("second end of the final verse was swallowed");
        };
        rig.player.finish_verse(generation).await;
        assert_eq!(rig.prompter.completions.get(), 2);
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
    }

    #[tokio::test]
    async fn play_pause_is_ignored_while_the_section_prompt_is_open() {
        let (prompter, answer) = GatedPrompter::new();
        let rig = rig_with(prompter);
        rig.background.play().await.unwrap();
        rig.player.play_verse(VerseRef::new(1, 7)).await.unwrap();

        let advance = rig.player.next();
        let interrupt = async {
            tokio::task::yield_now().await;
            assert_eq!(rig.player.phase(), PlayerPhase::AwaitingSectionChoice);

            rig.player.toggle_play_pause().await.unwrap();
            rig.player.resume().await.unwrap();
            assert_eq!(rig.player.phase(), PlayerPhase::AwaitingSectionChoice);
            assert!(rig.output.is_paused());
            assert!(!rig.gate.is_active());

            answer.send(false).unwrap();
        };
        let (result, ()) = futures_util::join!(advance, interrupt);
        result.unwrap();

        assert_eq!(rig.player.phase(), PlayerPhase::Paused);
        assert_eq!(rig.player.current(), Some(VerseRef::new(1, 7)));
        assert!(rig.output.is_paused());
        assert!(!rig.gate.is_active());
        assert!(rig.background.is_playing());
    }

    #[tokio::test]
    async fn previous_wraps_backwards() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::opening()).await.unwrap();
        rig.player.previous().await.unwrap();
        assert_eq!(rig.player.current(), Some(VerseRef::new(114, 6)));

        rig.player.play_verse(VerseRef::new(3, 1)).await.unwrap();
        rig.player.previous().await.unwrap();
        assert_eq!(rig.player.current(), Some(VerseRef::new(2, 286)));
    }

    #[tokio::test]
    async fn toggle_starts_from_the_opening_when_nothing_is_loaded() {
        let rig = rig(true);
        rig.player.toggle_play_pause().await.unwrap();
        assert_eq!(rig.player.current(), Some(VerseRef::opening()));
        assert_eq!(rig.player.phase(), PlayerPhase::Playing);

        rig.player.toggle_play_pause().await.unwrap();
        assert_eq!(rig.player.phase(), PlayerPhase::Paused);

        rig.player.toggle_play_pause().await.unwrap();
        assert_eq!(rig.player.phase(), PlayerPhase::Playing);
        assert_eq!(rig.player.current(), Some(VerseRef::opening()));
    }

    #[tokio::test]
    async fn speed_snaps_and_carries_to_next_verse() {
        let rig = rig(true);
        assert_eq!(rig.player.set_speed(1.4), 1.5);
        rig.player.play_verse(VerseRef::opening()).await.unwrap();
        assert_eq!(rig.output.playback_rate(), 1.5);
        assert_eq!(rig.player.snapshot().speed, 1.5);
    }

    #[tokio::test]
    async fn teardown_releases_output() {
        let rig = rig(true);
        rig.player.play_verse(VerseRef::opening()).await.unwrap();
        rig.player.teardown();
        assert!(rig.output.is_released());
        assert_eq!(rig.player.phase(), PlayerPhase::Idle);
        assert_eq!(rig.player.poll(), PlayerEvent::None);
    }
}
