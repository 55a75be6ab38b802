use super::output::{AudioOutput, PlaybackError};
use super::ForegroundGate;
use crate::db::{load_background_state, save_background_state, BackgroundState, KeyValueStore};
use std::cell::Cell;
use std::rc::Rc;

pub const BACKGROUND_TRACK_URL: &str =
    "https://cdn.pixabay.com/audio/2024/02/14/audio_b9bc3934cc.mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundPhase {
    Idle,
    Playing,
    PausedByUser,
    PausedForForeground,
}

/// The looping ambient track.
///
/// Position, playing flag and the suspended-for-foreground flag are written to
/// the store on every transition and sampled while playing, so a reload picks
/// the track up where it was.
pub struct BackgroundMusic {
    output: Rc<dyn AudioOutput>,
    store: Rc<dyn KeyValueStore>,
    gate: ForegroundGate,
    suspended: Cell<bool>,
    has_played: Cell<bool>,
    resume_pending: Cell<bool>,
    last_saved_playing: Cell<bool>,
}

impl BackgroundMusic {
    pub fn new(
        output: Rc<dyn AudioOutput>,
        store: Rc<dyn KeyValueStore>,
        gate: ForegroundGate,
        track_url: &str,
    ) -> Self {
        let saved = load_background_state(store.as_ref());
        output.set_source(track_url);
        output.set_looping(true);
        if saved.position > 0.0 {
            output.set_current_time(saved.position);
        }
        tracing::debug!(
            position = saved.position,
            playing = saved.playing,
            suspended = saved.suspended,
            "background state restored"
        );

        Self {
            output,
            store,
            gate,
            suspended: Cell::new(saved.suspended),
            has_played: Cell::new(saved.position > 0.0),
            resume_pending: Cell::new(saved.playing && !saved.suspended),
            last_saved_playing: Cell::new(saved.playing),
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.output.is_paused()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }

    pub fn position(&self) -> f64 {
        self.output.current_time()
    }

    pub fn phase(&self) -> BackgroundPhase {
        if self.is_playing() {
            BackgroundPhase::Playing
        } else if self.suspended.get() {
            BackgroundPhase::PausedForForeground
        } else if self.has_played.get() {
            BackgroundPhase::PausedByUser
        } else {
            BackgroundPhase::Idle
        }
    }

    /// True when the previous session was playing and was not suspended.
    pub fn should_resume_on_load(&self) -> bool {
        self.resume_pending.get() && !self.suspended.get() && !self.is_playing()
    }

    fn persist(&self) {
        let state = BackgroundState {
            position: self.output.current_time(),
            playing: self.is_playing(),
            suspended: self.suspended.get(),
        };
        self.last_saved_playing.set(state.playing);
        if let Err(e) = save_background_state(self.store.as_ref(), &state) {
            tracing::warn!("failed to persist background state: {e}");
        }
    }

    /// Starts the track unless a verse is playing.
    pub async fn play(&self) -> Result<(), PlaybackError> {
        if self.gate.is_active() {
            tracing::debug!("background play ignored while a verse is playing");
            return Ok(());
        }
        self.suspended.set(false);
        self.persist();

        let result = self.output.start().await;
        if result.is_ok() {
            self.on_started();
        }
        self.persist();
        result
    }

    fn on_started(&self) {
        self.has_played.set(true);
        self.resume_pending.set(false);
        // A verse may have started while the engine was spinning up.
        if self.gate.is_active() {
            self.output.pause();
            self.suspended.set(true);
        }
    }

    pub fn pause(&self) {
        self.output.pause();
        self.persist();
    }

    /// Rewinds to the start and stays paused.
    pub fn stop(&self) {
        self.output.pause();
        self.output.set_current_time(0.0);
        self.persist();
    }

    pub fn pause_for_foreground(&self) {
        if !self.is_playing() {
            return;
        }
        self.output.pause();
        self.suspended.set(true);
        self.persist();
        tracing::debug!("background paused for recitation");
    }

    /// Restarts a track that recitation suspended. A refused start is
    /// swallowed and the suspended flag stays set.
    pub async fn resume_after_foreground(&self) {
        if !self.suspended.get() || self.is_playing() || self.gate.is_active() {
            return;
        }
        match self.output.start().await {
            Ok(()) => {
                self.suspended.set(false);
                self.on_started();
                self.persist();
                tracing::debug!("background resumed after recitation");
            }
            Err(e) => {
                tracing::debug!("background resume refused: {e}");
                self.output.pause();
            }
        }
    }

    /// Resumes the previous session's playback; called on the first user
    /// interaction or the page load event.
    pub async fn resume_on_load(&self) {
        if !self.should_resume_on_load() {
            return;
        }
        if let Err(e) = self.play().await {
            tracing::debug!("background autoplay refused: {e}");
        }
    }

    /// Periodic tick: saves the position while playing and records pauses that
    /// happened outside the service.
    pub fn sample(&self) {
        let playing = self.is_playing();
        if playing || playing != self.last_saved_playing.get() {
            self.persist();
        }
    }

    pub async fn refresh_output(&self) {
        self.output.refresh().await;
    }

    pub fn teardown(&self) {
        self.persist();
        self.output.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, BACKGROUND_SUSPENDED_KEY};
    use crate::playback::output::DetachedOutput;

    fn service(store: Rc<MemoryStore>) -> (BackgroundMusic, DetachedOutput, ForegroundGate) {
        let output = DetachedOutput::new();
        let gate = ForegroundGate::new();
        let music = BackgroundMusic::new(
            Rc::new(output.clone()),
            store,
            gate.clone(),
            BACKGROUND_TRACK_URL,
        );
        (music, output, gate)
    }

    #[test]
    fn track_loops_from_the_configured_url() {
        let (_, output, _) = service(Rc::new(MemoryStore::new()));
        assert!(output.is_looping());
        assert_eq!(output.source().as_deref(), Some(BACKGROUND_TRACK_URL));
    }

    #[tokio::test]
    async fn play_is_a_no_op_while_a_verse_plays() {
        let (music, output, gate) = service(Rc::new(MemoryStore::new()));
        gate.set(true);
        assert_eq!(music.play().await, Ok(()));
        assert!(!music.is_playing());
        assert_eq!(output.start_count(), 0);
    }

    #[tokio::test]
    async fn user_pause_is_not_suspension() {
        let (music, _, _) = service(Rc::new(MemoryStore::new()));
        assert_eq!(music.phase(), BackgroundPhase::Idle);
        music.play().await.unwrap();
        music.pause();
        assert_eq!(music.phase(), BackgroundPhase::PausedByUser);

        music.resume_after_foreground().await;
        assert!(!music.is_playing());
    }

    #[tokio::test]
    async fn pause_for_foreground_only_acts_when_playing() {
        let store = Rc::new(MemoryStore::new());
        let (music, _, _) = service(store.clone());
        music.pause_for_foreground();
        assert!(!music.is_suspended());

        music.play().await.unwrap();
        music.pause_for_foreground();
        assert_eq!(music.phase(), BackgroundPhase::PausedForForeground);
        assert_eq!(store.get(BACKGROUND_SUSPENDED_KEY).as_deref(), Some("true"));

        music.resume_after_foreground().await;
        assert_eq!(music.phase(), BackgroundPhase::Playing);
        assert_eq!(store.get(BACKGROUND_SUSPENDED_KEY).as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn blocked_resume_keeps_suspended_flag() {
        let store = Rc::new(MemoryStore::new());
        let (music, output, _) = service(store.clone());
        music.play().await.unwrap();
        music.pause_for_foreground();

        output.block_autoplay(true);
        music.resume_after_foreground().await;
        assert!(music.is_suspended());
        assert!(!music.is_playing());
        assert_eq!(store.get(BACKGROUND_SUSPENDED_KEY).as_deref(), Some("true"));

        // An explicit play clears it.
        output.block_autoplay(false);
        music.play().await.unwrap();
        assert!(!music.is_suspended());
    }

    #[tokio::test]
    async fn position_round_trips_through_the_store() {
        let store = Rc::new(MemoryStore::new());
        {
            let (music, output, _) = service(store.clone());
            music.play().await.unwrap();
            output.advance_to(83.4);
            music.sample();
            music.teardown();
            assert!(output.is_released());
        }

        let (music, output, _) = service(store.clone());
        assert_eq!(output.current_time(), 83.4);
        assert!(music.should_resume_on_load());
        music.resume_on_load().await;
        assert!(music.is_playing());
        assert!(!music.should_resume_on_load());
    }

    #[tokio::test]
    async fn suspended_session_does_not_resume_on_load() {
        let store = Rc::new(MemoryStore::new());
        {
            let (music, _, _) = service(store.clone());
            music.play().await.unwrap();
            music.pause_for_foreground();
        }
        let (music, _, _) = service(store);
        assert!(music.is_suspended());
        assert!(!music.should_resume_on_load());
        music.resume_on_load().await;
        assert!(!music.is_playing());
    }

    #[tokio::test]
    async fn sample_records_outside_pauses() {
        let store = Rc::new(MemoryStore::new());
        let (music, output, _) = service(store.clone());
        music.play().await.unwrap();
        output.pause();
        music.sample();
        assert_eq!(
            store.get(crate::db::BACKGROUND_PLAYING_KEY).as_deref(),
            Some("false")
        );
    }

    #[tokio::test]
    async fn stop_rewinds() {
        let (music, output, _) = service(Rc::new(MemoryStore::new()));
        music.play().await.unwrap();
        output.advance_to(30.0);
        music.stop();
        assert_eq!(music.position(), 0.0);
        assert!(!music.is_playing());
    }
}
