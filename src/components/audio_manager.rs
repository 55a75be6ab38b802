//! Audio controller: drives both audio services outside the render cycle.
//!
//! A polling loop samples the background track, feeds progress ticks to the
//! recitation player and mirrors both into the status signals. It also owns
//! the keyboard shortcuts: on the web through document listeners, in the
//! desktop webview through the key presses the audio bridge records.

use crate::components::verse_view::{scroll_to_element, verse_element_id};
use crate::components::{
    run_player, BackgroundStatusSignal, Navigation, PlayerStatusSignal, PromptController,
    ReaderServices, VerseViewSignal,
};
use crate::playback::PlayerEvent;
use crate::utils::sleep_ms;
use dioxus::prelude::*;
use futures_channel::mpsc::unbounded;
use futures_util::StreamExt;

#[cfg(not(target_arch = "wasm32"))]
use crate::playback::bridge::drain_key_presses;
#[cfg(target_arch = "wasm32")]
use futures_channel::mpsc::UnboundedSender;
#[cfg(target_arch = "wasm32")]
use std::cell::Cell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, Event, EventTarget, KeyboardEvent};

pub const POLL_INTERVAL_MS: u64 = 100;

/// A DOM listener that is removed when dropped.
#[cfg(target_arch = "wasm32")]
pub struct EventSubscription {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

#[cfg(target_arch = "wasm32")]
impl EventSubscription {
    pub fn listen(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Self> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for EventSubscription {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

#[cfg(target_arch = "wasm32")]
fn is_editable_target(event: &KeyboardEvent) -> bool {
    let Some(target) = event.target() else {
        return false;
    };

    let mut current = target.dyn_into::<web_sys::Element>().ok();
    while let Some(element) = current {
        let tag = element.tag_name().to_ascii_lowercase();
        if tag == "input" || tag == "textarea" || tag == "select" {
            return true;
        }
        if element
            .get_attribute("contenteditable")
            .map(|v| v.to_ascii_lowercase() != "false")
            .unwrap_or(false)
        {
            return true;
        }
        current = element.parent_element();
    }

    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    TogglePlayback,
    Dismiss,
    PreviousVerse,
    NextVerse,
}

/// Maps a key press to a shortcut. Escape always dismisses; every other key
/// only counts without modifiers, outside text entry and while no prompt is
/// open, so the prompt's own buttons keep their keys.
pub fn shortcut_for(
    key: &str,
    code: &str,
    modified: bool,
    in_text_entry: bool,
    prompt_open: bool,
) -> Option<Shortcut> {
    if key == "Escape" {
        return Some(Shortcut::Dismiss);
    }
    if modified || in_text_entry || prompt_open {
        return None;
    }
    match key {
        " " | "Spacebar" => Some(Shortcut::TogglePlayback),
        "ArrowUp" | "ArrowLeft" => Some(Shortcut::PreviousVerse),
        "ArrowDown" | "ArrowRight" => Some(Shortcut::NextVerse),
        _ if code == "Space" => Some(Shortcut::TogglePlayback),
        _ => None,
    }
}

#[component]
pub fn AudioController() -> Element {
    let services = use_context::<ReaderServices>();
    let navigation = use_context::<Navigation>();
    let prompt = use_context::<PromptController>();
    let mut view = use_context::<VerseViewSignal>().0;
    let mut player_status = use_context::<PlayerStatusSignal>().0;
    let mut background_status = use_context::<BackgroundStatusSignal>().0;

    let shortcuts = {
        let player = services.player.clone();
        let prompt = prompt.clone();
        use_hook(move || {
            let (shortcuts, mut pressed) = unbounded::<Shortcut>();
            spawn(async move {
                while let Some(shortcut) = pressed.next().await {
                    // The prompt may have opened after the key was queued.
                    if prompt.is_open() && shortcut != Shortcut::Dismiss {
                        continue;
                    }
                    match shortcut {
                        Shortcut::TogglePlayback => {
                            run_player(player.clone(), player_status, |p| async move {
                                p.toggle_play_pause().await
                            });
                        }
                        Shortcut::Dismiss => {
                            if prompt.is_open() {
                                prompt.respond(false);
                            } else {
                                navigation.dismiss_top();
                            }
                        }
                        Shortcut::PreviousVerse | Shortcut::NextVerse => {
                            let forward = shortcut == Shortcut::NextVerse;
                            if let Some(reference) = view.with_mut(|view| view.step_active(forward)) {
                                scroll_to_element(&verse_element_id(reference));
                            }
                        }
                    }
                }
            });
            shortcuts
        })
    };

    {
        let services = services.clone();
        #[cfg(not(target_arch = "wasm32"))]
        let shortcuts = shortcuts.clone();
        #[cfg(not(target_arch = "wasm32"))]
        let prompt = prompt.clone();
        use_hook(move || {
            spawn(async move {
                loop {
                    sleep_ms(POLL_INTERVAL_MS).await;

                    services.background.refresh_output().await;
                    services.player.refresh_output().await;
                    #[cfg(not(target_arch = "wasm32"))]
                    for press in drain_key_presses().await {
                        let shortcut = shortcut_for(
                            &press.key,
                            &press.code,
                            press.modified,
                            press.editable,
                            prompt.is_open(),
                        );
                        if let Some(shortcut) = shortcut {
                            let _ = shortcuts.unbounded_send(shortcut);
                        }
                    }

                    services.background.sample();
                    match services.player.poll() {
                        PlayerEvent::VerseEnded { generation } => {
                            let player = services.player.clone();
                            spawn(async move {
                                player.finish_verse(generation).await;
                            });
                        }
                        PlayerEvent::PreviewArmed(next) => {
                            tracing::debug!(%next, "previewing next verse");
                        }
                        PlayerEvent::None => {}
                    }

                    let snapshot = services.player.snapshot();
                    if *player_status.peek() != snapshot {
                        player_status.set(snapshot);
                    }
                    let phase = services.background.phase();
                    if *background_status.peek() != phase {
                        background_status.set(phase);
                    }
                }
            })
        });
    }

    #[cfg(target_arch = "wasm32")]
    {
        let services = services.clone();
        // Held for the lifetime of the component; dropping removes the listeners.
        let _subscriptions =
            use_hook(move || Rc::new(install_listeners(&services, shortcuts, prompt)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let background = services.background.clone();
        use_hook(move || {
            spawn(async move {
                background.resume_on_load().await;
            })
        });
    }

    rsx! {}
}

#[cfg(target_arch = "wasm32")]
fn install_listeners(
    services: &ReaderServices,
    shortcuts: UnboundedSender<Shortcut>,
    prompt: PromptController,
) -> Vec<EventSubscription> {
    let mut subscriptions = Vec::new();
    let Some(win) = window() else {
        return subscriptions;
    };
    let Some(doc) = win.document() else {
        return subscriptions;
    };

    // Autoplay needs a gesture; retry on the first one and on page load.
    let interacted = Rc::new(Cell::new(false));
    let resume_background = {
        let background = services.background.clone();
        move || {
            let background = background.clone();
            wasm_bindgen_futures::spawn_local(async move {
                background.resume_on_load().await;
            });
        }
    };

    for event in ["click", "touchstart", "keydown"] {
        let interacted = interacted.clone();
        let resume = resume_background.clone();
        if let Some(sub) = EventSubscription::listen(doc.as_ref(), event, move |_| {
            if !interacted.replace(true) {
                resume();
            }
        }) {
            subscriptions.push(sub);
        }
    }

    if doc.ready_state() == "complete" {
        resume_background();
    } else {
        let resume = resume_background.clone();
        if let Some(sub) = EventSubscription::listen(win.as_ref(), "load", move |_| resume()) {
            subscriptions.push(sub);
        }
    }

    if let Some(sub) = EventSubscription::listen(doc.as_ref(), "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if event.default_prevented() || event.is_composing() {
            return;
        }
        let modified = event.meta_key() || event.ctrl_key() || event.alt_key();
        let Some(shortcut) = shortcut_for(
            &event.key(),
            &event.code(),
            modified,
            is_editable_target(event),
            prompt.is_open(),
        ) else {
            return;
        };
        if shortcut != Shortcut::Dismiss {
            event.prevent_default();
        }
        let _ = shortcuts.unbounded_send(shortcut);
    }) {
        subscriptions.push(sub);
    }

    subscriptions
}
