use crate::api::VerseRef;
use crate::components::{
    run_player, AppView, BackgroundStatusSignal, Icon, Navigation, PlayerStatusSignal,
    ReaderServices,
};
use crate::playback::BackgroundPhase;
use dioxus::prelude::*;

fn background_label(phase: BackgroundPhase) -> &'static str {
    match phase {
        BackgroundPhase::Idle => "Stopped",
        BackgroundPhase::Playing => "Playing",
        BackgroundPhase::PausedByUser => "Paused",
        BackgroundPhase::PausedForForeground => "Waiting for recitation to finish",
    }
}

#[component]
pub fn ListenPanel() -> Element {
    let services = use_context::<ReaderServices>();
    let navigation = use_context::<Navigation>();
    let navigator = use_navigator();
    let status = use_context::<PlayerStatusSignal>().0;
    let mut background_status = use_context::<BackgroundStatusSignal>().0;

    let phase = background_status();

    let on_start = {
        let player = services.player.clone();
        move |_| {
            navigation.close();
            navigator.push(AppView::surah(1));
            run_player(player.clone(), status, |p| async move {
                p.play_verse(VerseRef::opening()).await
            });
        }
    };

    let on_toggle_music = {
        let music = services.background.clone();
        move |_| {
            let music = music.clone();
            if music.is_playing() {
                music.pause();
                background_status.set(music.phase());
                return;
            }
            spawn(async move {
                if let Err(e) = music.play().await {
                    tracing::debug!("background music refused: {e}");
                }
                background_status.set(music.phase());
            });
        }
    };

    let on_stop_music = {
        let music = services.background.clone();
        move |_| {
            music.stop();
            background_status.set(music.phase());
        }
    };

    let music_playing = phase == BackgroundPhase::Playing;
    let toggle_icon = if music_playing { "pause" } else { "play" };
    let toggle_label = if music_playing { "Pause music" } else { "Play music" };

    rsx! {
        div { class: "listen-panel",
            section { class: "listen-panel__section",
                h3 { "Recitation" }
                p { class: "hint", "Listen from the opening verse; the reader follows along." }
                button { class: "btn btn--primary", onclick: on_start,
                    Icon { name: "headphones".to_string(), class: "icon".to_string() }
                    span { "Start listening" }
                }
            }

            section { class: "listen-panel__section",
                h3 { "Background music" }
                p { class: "hint", "{background_label(phase)}" }
                div { class: "listen-panel__actions",
                    button { class: "btn btn--ghost", onclick: on_toggle_music,
                        Icon { name: toggle_icon.to_string(), class: "icon".to_string() }
                        span { "{toggle_label}" }
                    }
                    button {
                        class: "btn btn--ghost",
                        disabled: phase == BackgroundPhase::Idle,
                        onclick: on_stop_music,
                        Icon { name: "stop".to_string(), class: "icon".to_string() }
                        span { "Stop" }
                    }
                }
            }
        }
    }
}
