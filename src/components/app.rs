use crate::api::{ExplanationClient, QuranClient};
use crate::components::verse_view::{ViewState, ViewSurface};
use crate::components::{
    view_label, AppView, AudioController, Icon, MiniPlayer, Navigation, Overlay, OverlayHost,
    Player, PromptController, PromptOverlay, PromptRequest, Sidebar,
};
use crate::db::{load_api_key, load_settings, open_default_store, KeyValueStore};
use crate::playback::{
    platform_output, BackgroundMusic, BackgroundPhase, ForegroundGate, PlayerSnapshot,
    RecitationPlayer, Timings, BACKGROUND_AUDIO_ID, BACKGROUND_TRACK_URL, RECITATION_AUDIO_ID,
};
use dioxus::prelude::*;
use std::rc::Rc;

/// Long-lived services, built once per shell.
#[derive(Clone)]
pub struct ReaderServices {
    pub client: Rc<QuranClient>,
    pub store: Rc<dyn KeyValueStore>,
    pub background: Rc<BackgroundMusic>,
    pub player: Rc<RecitationPlayer>,
}

#[derive(Clone, Copy)]
pub struct VerseViewSignal(pub Signal<ViewState>);

#[derive(Clone, Copy)]
pub struct PlayerStatusSignal(pub Signal<PlayerSnapshot>);

#[derive(Clone, Copy)]
pub struct BackgroundStatusSignal(pub Signal<BackgroundPhase>);

#[component]
pub fn AppShell() -> Element {
    let view_state = use_signal(ViewState::default);
    let prompt_request = use_signal(|| None::<PromptRequest>);
    let overlay = use_signal(|| None::<Overlay>);
    let menu_open = use_signal(|| false);
    let navigation = Navigation::new(overlay, menu_open);
    let navigator = use_navigator();

    let prompt = use_hook(|| PromptController::new(prompt_request));
    let services = use_hook(|| {
        let store = open_default_store();
        let settings = load_settings(store.as_ref());
        let gate = ForegroundGate::new();
        let client = Rc::new(QuranClient::new(settings.editions.clone()));
        let background = Rc::new(BackgroundMusic::new(
            platform_output(BACKGROUND_AUDIO_ID),
            store.clone(),
            gate.clone(),
            BACKGROUND_TRACK_URL,
        ));
        let surface = Rc::new(ViewSurface::new(view_state, client.clone(), navigator));
        let player = Rc::new(RecitationPlayer::new(
            platform_output(RECITATION_AUDIO_ID),
            client.clone(),
            surface,
            Rc::new(prompt.clone()),
            background.clone(),
            gate,
            Timings::default(),
            settings.speed,
        ));
        tracing::info!("reader services ready");
        ReaderServices {
            client,
            store,
            background,
            player,
        }
    });

    let settings = use_signal(|| load_settings(services.store.as_ref()));
    let explainer = use_signal(|| ExplanationClient::new(load_api_key(services.store.as_ref())));
    let player_status = use_signal(|| services.player.snapshot());
    let background_status = use_signal(|| services.background.phase());

    use_context_provider(|| services.clone());
    use_context_provider(|| navigation);
    use_context_provider(|| prompt.clone());
    use_context_provider(|| VerseViewSignal(view_state));
    use_context_provider(|| PlayerStatusSignal(player_status));
    use_context_provider(|| BackgroundStatusSignal(background_status));
    use_context_provider(|| settings);
    use_context_provider(|| explainer);

    use_drop({
        let services = services.clone();
        move || {
            services.player.teardown();
            services.background.teardown();
            tracing::info!("reader services released");
        }
    });

    let route = use_route::<AppView>();

    rsx! {
        div { class: "app",
            header { class: "topbar",
                button {
                    class: "icon-btn",
                    aria_label: "Open menu",
                    onclick: move |_| navigation.toggle_menu(),
                    Icon { name: "menu".to_string(), class: "icon".to_string() }
                }
                div { class: "topbar__title",
                    span { class: "topbar__brand", "Quran Reader" }
                    span { class: "topbar__view", "{view_label(&route)}" }
                }
                button {
                    class: "icon-btn",
                    aria_label: "Search",
                    onclick: move |_| navigation.open(Overlay::Search),
                    Icon { name: "search".to_string(), class: "icon".to_string() }
                }
            }

            if navigation.menu_open() {
                div {
                    class: "menu-backdrop",
                    onclick: move |_| navigation.close_menu(),
                }
                Sidebar {}
            }

            main { class: "content",
                Outlet::<AppView> {}
            }

            Player {}
            MiniPlayer {}
        }

        OverlayHost {}

        PromptOverlay { controller: prompt.clone() }

        // Drives both audio services; renders nothing.
        AudioController {}
    }
}
