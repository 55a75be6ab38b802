use crate::api::display_name;
use crate::components::{BackgroundStatusSignal, Icon, PlayerStatusSignal, ReaderServices};
use crate::db::{save_settings, ReaderSettings, SPEED_OPTIONS};
use crate::playback::{BackgroundPhase, PlayerError, PlayerPhase, PlayerSnapshot, RecitationPlayer};
use crate::utils::format_clock;
use dioxus::prelude::*;
use std::future::Future;
use std::rc::Rc;

/// Runs a player action in the background and refreshes the status signal
/// once it settles.
pub fn run_player<F, Fut>(player: Rc<RecitationPlayer>, mut status: Signal<PlayerSnapshot>, action: F)
where
    F: FnOnce(Rc<RecitationPlayer>) -> Fut + 'static,
    Fut: Future<Output = Result<(), PlayerError>> + 'static,
{
    spawn(async move {
        if let Err(e) = action(player.clone()).await {
            tracing::warn!("player action failed: {e}");
        }
        status.set(player.snapshot());
    });
}

fn now_playing_label(snapshot: &PlayerSnapshot) -> (String, String) {
    match snapshot.current {
        Some(reference) => (
            display_name(reference.surah),
            format!("Verse {}", reference.ayah),
        ),
        None => ("-".to_string(), "-".to_string()),
    }
}

fn speed_label(speed: f64) -> String {
    format!("{speed}x")
}

#[component]
fn TransportButtons(compact: bool) -> Element {
    let services = use_context::<ReaderServices>();
    let status = use_context::<PlayerStatusSignal>().0;
    let snapshot = status();
    let playing = matches!(snapshot.phase, PlayerPhase::Playing | PlayerPhase::Loading);
    let button_class = if compact { "icon-btn" } else { "icon-btn icon-btn--lg" };
    let toggle_label = if playing { "Pause" } else { "Play" };

    let on_prev = {
        let player = services.player.clone();
        move |_| run_player(player.clone(), status, |p| async move { p.previous().await })
    };
    let on_toggle = {
        let player = services.player.clone();
        move |_| run_player(player.clone(), status, |p| async move { p.toggle_play_pause().await })
    };
    let on_next = {
        let player = services.player.clone();
        move |_| run_player(player.clone(), status, |p| async move { p.next().await })
    };

    rsx! {
        div { class: "transport",
            button { class: "{button_class}", aria_label: "Previous verse", onclick: on_prev,
                Icon { name: "prev".to_string(), class: "icon".to_string() }
            }
            button {
                class: "{button_class} icon-btn--primary",
                aria_label: "{toggle_label}",
                onclick: on_toggle,
                if snapshot.phase == PlayerPhase::Loading {
                    Icon { name: "loader".to_string(), class: "icon".to_string() }
                } else if playing {
                    Icon { name: "pause".to_string(), class: "icon".to_string() }
                } else {
                    Icon { name: "play".to_string(), class: "icon".to_string() }
                }
            }
            button { class: "{button_class}", aria_label: "Next verse", onclick: on_next,
                Icon { name: "next".to_string(), class: "icon".to_string() }
            }
        }
    }
}

#[component]
pub fn Player() -> Element {
    let services = use_context::<ReaderServices>();
    let status = use_context::<PlayerStatusSignal>().0;
    let mut settings = use_context::<Signal<ReaderSettings>>();

    let snapshot = status();
    let (surah_label, verse_label) = now_playing_label(&snapshot);
    let position = format_clock(snapshot.position);
    let duration = format_clock(snapshot.duration.unwrap_or(0.0));
    let progress = match snapshot.duration {
        Some(total) if total > 0.0 => (snapshot.position / total * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    };
    let current_speed = snapshot.speed;

    let on_speed_change = {
        let services = services.clone();
        let mut status = status;
        move |e: Event<FormData>| {
            let Ok(requested) = e.value().parse::<f64>() else {
                return;
            };
            let applied = services.player.set_speed(requested);
            status.set(services.player.snapshot());

            let mut next = settings.peek().clone();
            next.speed = applied;
            if let Err(e) = save_settings(services.store.as_ref(), &next) {
                tracing::warn!("failed to save speed: {e}");
            }
            settings.set(next);
        }
    };

    rsx! {
        footer { class: "player",
            div { class: "player__now",
                Icon { name: "book".to_string(), class: "icon player__glyph".to_string() }
                div { class: "player__labels",
                    span { class: "player__surah", "{surah_label}" }
                    span { class: "player__verse", "{verse_label}" }
                }
            }
            div { class: "player__center",
                TransportButtons { compact: false }
                div { class: "player__progress",
                    span { class: "player__time", "{position}" }
                    div { class: "progress",
                        div { class: "progress__fill", style: "width: {progress}%" }
                    }
                    span { class: "player__time", "{duration}" }
                }
            }
            div { class: "player__side",
                label { class: "player__speed",
                    span { "Speed" }
                    select {
                        value: "{current_speed}",
                        onchange: on_speed_change,
                        for choice in SPEED_OPTIONS {
                            option {
                                value: "{choice}",
                                selected: choice == current_speed,
                                "{speed_label(choice)}"
                            }
                        }
                    }
                }
                AmbientResumeButton {}
            }
        }
    }
}

#[component]
pub fn MiniPlayer() -> Element {
    let status = use_context::<PlayerStatusSignal>().0;
    let snapshot = status();
    if snapshot.current.is_none() {
        return rsx! {};
    }
    let (surah_label, verse_label) = now_playing_label(&snapshot);

    rsx! {
        div { class: "mini-player",
            div { class: "mini-player__labels",
                span { class: "mini-player__surah", "{surah_label}" }
                span { class: "mini-player__verse", "{verse_label}" }
            }
            TransportButtons { compact: true }
        }
    }
}

/// Offered while the ambient track waits for recitation to end.
#[component]
pub fn AmbientResumeButton() -> Element {
    let services = use_context::<ReaderServices>();
    let status = use_context::<PlayerStatusSignal>().0;
    let mut background = use_context::<BackgroundStatusSignal>().0;

    let visible = background() == BackgroundPhase::PausedForForeground
        && status().phase != PlayerPhase::Playing;
    if !visible {
        return rsx! {};
    }

    let on_resume = {
        let music = services.background.clone();
        move |_| {
            let music = music.clone();
            spawn(async move {
                if let Err(e) = music.play().await {
                    tracing::debug!("ambient resume refused: {e}");
                }
                background.set(music.phase());
            });
        }
    };

    rsx! {
        button {
            class: "ambient-resume",
            title: "Resume background music",
            onclick: on_resume,
            Icon { name: "music".to_string(), class: "icon".to_string() }
            span { "Resume music" }
        }
    }
}
