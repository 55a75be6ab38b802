//! The components module contains all shared components for our app.

mod app;
mod app_view;
mod audio_manager;
mod icons;
mod navigation;
mod overlays;
mod player;
mod prompt;
mod sidebar;
pub mod verse_view;
pub mod views;

pub use app::*;
pub use app_view::*;
pub use audio_manager::AudioController;
pub use icons::*;
pub use navigation::*;
pub use overlays::OverlayHost;
pub use player::*;
pub use prompt::*;
pub use sidebar::*;
// Views are accessed via views::ViewName
