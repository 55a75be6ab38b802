// Audio sinks used by the background and recitation services.
use futures_util::future::LocalBoxFuture;
use thiserror::Error;

#[cfg(any(test, target_arch = "wasm32"))]
use std::{cell::RefCell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use futures_util::FutureExt;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Playback was blocked until the page receives a user gesture")]
    Blocked,

    #[error("No audio source is loaded")]
    NoSource,

    #[error("Audio playback failed: {0}")]
    Failed(String),
}

/// One audio track the services drive.
pub trait AudioOutput {
    fn set_source(&self, url: &str);
    fn source(&self) -> Option<String>;
    /// Starts playback; resolves once the engine accepted or refused it.
    fn start(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>>;
    fn pause(&self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// Known, finite duration in seconds.
    fn duration(&self) -> Option<f64>;
    fn ended(&self) -> bool;
    fn set_playback_rate(&self, rate: f64);
    fn set_looping(&self, looping: bool);
    /// Stops playback and gives the underlying resource back.
    fn release(&self);
    /// Pulls the engine state for outputs that only see it asynchronously.
    fn refresh(&self) -> LocalBoxFuture<'static, ()> {
        Box::pin(futures_util::future::ready(()))
    }
}

/// Finds the `<audio>` element with `id`, creating it under `<body>` if needed.
#[cfg(target_arch = "wasm32")]
pub fn get_or_create_audio_element(id: &str) -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(id) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(id);
    audio.set_attribute("preload", "auto").ok()?;
    document.body()?.append_child(&audio).ok()?;

    Some(audio)
}

#[cfg(target_arch = "wasm32")]
fn classify_play_error(error: JsValue) -> PlaybackError {
    let name = js_sys::Reflect::get(&error, &"name".into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default();
    match name.as_str() {
        "NotAllowedError" => PlaybackError::Blocked,
        "NotSupportedError" => PlaybackError::Failed("unsupported audio source".to_string()),
        _ => PlaybackError::Failed(
            js_sys::Reflect::get(&error, &"message".into())
                .ok()
                .and_then(|value| value.as_string())
                .unwrap_or_else(|| format!("{error:?}")),
        ),
    }
}

/// A browser `<audio>` element.
#[cfg(target_arch = "wasm32")]
pub struct WebAudioOutput {
    audio: HtmlAudioElement,
}

#[cfg(target_arch = "wasm32")]
impl WebAudioOutput {
    pub fn attach(id: &str) -> Option<Self> {
        get_or_create_audio_element(id).map(|audio| Self { audio })
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioOutput for WebAudioOutput {
    fn set_source(&self, url: &str) {
        self.audio.set_src(url);
    }

    fn source(&self) -> Option<String> {
        let src = self.audio.src();
        if src.is_empty() {
            None
        } else {
            Some(src)
        }
    }

    fn start(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>> {
        if self.source().is_none() {
            return futures_util::future::ready(Err(PlaybackError::NoSource)).boxed_local();
        }
        match self.audio.play() {
            Ok(promise) => async move {
                wasm_bindgen_futures::JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(classify_play_error)
            }
            .boxed_local(),
            Err(error) => futures_util::future::ready(Err(classify_play_error(error))).boxed_local(),
        }
    }

    fn pause(&self) {
        let _ = self.audio.pause();
    }

    fn is_paused(&self) -> bool {
        self.audio.paused()
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.audio.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    fn ended(&self) -> bool {
        self.audio.ended()
    }

    fn set_playback_rate(&self, rate: f64) {
        self.audio.set_playback_rate(rate);
    }

    fn set_looping(&self, looping: bool) {
        self.audio.set_loop(looping);
    }

    fn release(&self) {
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
        self.audio.remove();
    }
}

#[cfg(any(test, target_arch = "wasm32"))]
#[derive(Debug, Clone, PartialEq)]
struct DetachedState {
    source: Option<String>,
    paused: bool,
    time: f64,
    duration: Option<f64>,
    ended: bool,
    rate: f64,
    looping: bool,
    blocked: bool,
    released: bool,
    starts: usize,
}

#[cfg(any(test, target_arch = "wasm32"))]
impl Default for DetachedState {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            time: 0.0,
            duration: None,
            ended: false,
            rate: 1.0,
            looping: false,
            blocked: false,
            released: false,
            starts: 0,
        }
    }
}

/// State-only output for pages without a media element.
///
/// Clones share state, so a caller can keep a handle and move the clock
/// while a service owns the output.
#[cfg(any(test, target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct DetachedOutput {
    state: Rc<RefCell<DetachedState>>,
}

#[cfg(any(test, target_arch = "wasm32"))]
impl DetachedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `start` fail the way a browser refuses autoplay.
    #[cfg(test)]
    pub fn block_autoplay(&self, blocked: bool) {
        self.state.borrow_mut().blocked = blocked;
    }

    #[cfg(test)]
    pub fn set_duration(&self, seconds: f64) {
        self.state.borrow_mut().duration = Some(seconds);
    }

    #[cfg(test)]
    pub fn advance_to(&self, seconds: f64) {
        self.state.borrow_mut().time = seconds;
    }

    /// Runs the clock to the end of a non-looping track.
    #[cfg(test)]
    pub fn finish(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(duration) = state.duration {
            state.time = duration;
        }
        state.ended = true;
        state.paused = true;
    }

    #[cfg(test)]
    pub fn playback_rate(&self) -> f64 {
        self.state.borrow().rate
    }

    #[cfg(test)]
    pub fn is_looping(&self) -> bool {
        self.state.borrow().looping
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        self.state.borrow().released
    }

    #[cfg(test)]
    pub fn start_count(&self) -> usize {
        self.state.borrow().starts
    }
}

#[cfg(any(test, target_arch = "wasm32"))]
impl AudioOutput for DetachedOutput {
    fn set_source(&self, url: &str) {
        let mut state = self.state.borrow_mut();
        state.source = Some(url.to_string());
        state.paused = true;
        state.time = 0.0;
        state.ended = false;
    }

    fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    fn start(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>> {
        let result = {
            let mut state = self.state.borrow_mut();
            state.starts += 1;
            if state.source.is_none() {
                Err(PlaybackError::NoSource)
            } else if state.blocked {
                Err(PlaybackError::Blocked)
            } else {
                state.paused = false;
                state.ended = false;
                Ok(())
            }
        };
        Box::pin(futures_util::future::ready(result))
    }

    fn pause(&self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.borrow_mut().time = seconds;
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.borrow_mut().rate = rate;
    }

    fn set_looping(&self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn release(&self) {
        let mut state = self.state.borrow_mut();
        state.paused = true;
        state.source = None;
        state.released = true;
    }
}
