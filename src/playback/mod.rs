//! Audio services: the looping background track and verse recitation.
//!
//! Both services are built once by the app shell and shared through context.
//! They coordinate through [`ForegroundGate`] and the pause/resume handshake
//! on [`BackgroundMusic`], so at most one of them is audible.

pub mod background;
#[cfg(not(target_arch = "wasm32"))]
pub mod bridge;
pub mod output;
pub mod recitation;

pub use background::{BackgroundMusic, BackgroundPhase, BACKGROUND_TRACK_URL};
pub use output::AudioOutput;
pub use recitation::{
    PlayerError, PlayerEvent, PlayerPhase, PlayerSnapshot, Prompter, RecitationPlayer, Timings,
    VerseSurface,
};

#[cfg(not(target_arch = "wasm32"))]
pub use bridge::BridgeAudioOutput;
#[cfg(target_arch = "wasm32")]
pub use output::{DetachedOutput, WebAudioOutput};

use std::cell::Cell;
use std::rc::Rc;

pub const BACKGROUND_AUDIO_ID: &str = "quran-reader-background-audio";
pub const RECITATION_AUDIO_ID: &str = "quran-reader-recitation-audio";

/// Set while a verse is audibly playing.
#[derive(Debug, Clone, Default)]
pub struct ForegroundGate(Rc<Cell<bool>>);

impl ForegroundGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, active: bool) {
        self.0.set(active);
    }
}

/// Output for the given element id, detached when no media element exists.
#[cfg(target_arch = "wasm32")]
pub fn platform_output(id: &str) -> Rc<dyn AudioOutput> {
    match WebAudioOutput::attach(id) {
        Some(output) => Rc::new(output),
        None => {
            tracing::warn!(id, "no audio element available; playback is silent");
            Rc::new(DetachedOutput::new())
        }
    }
}

/// Output backed by an `<audio>` element in the webview.
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_output(id: &str) -> Rc<dyn AudioOutput> {
    Rc::new(BridgeAudioOutput::new(id))
}
