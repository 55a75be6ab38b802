use dioxus::prelude::*;

/// Panels the menu opens on top of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Listen,
    Search,
    Categories,
    Ask,
}

impl Overlay {
    pub fn title(&self) -> &'static str {
        match self {
            Overlay::Listen => "Listen",
            Overlay::Search => "Search",
            Overlay::Categories => "Topics",
            Overlay::Ask => "Ask AI",
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct Navigation {
    overlay: Signal<Option<Overlay>>,
    menu_open: Signal<bool>,
}

impl Navigation {
    pub fn new(overlay: Signal<Option<Overlay>>, menu_open: Signal<bool>) -> Self {
        Self { overlay, menu_open }
    }

    pub fn overlay(&self) -> Option<Overlay> {
        (self.overlay)()
    }

    pub fn menu_open(&self) -> bool {
        (self.menu_open)()
    }

    pub fn open(&self, overlay: Overlay) {
        let mut current = self.overlay;
        let mut menu_open = self.menu_open;
        menu_open.set(false);
        current.set(Some(overlay));
    }

    pub fn close(&self) {
        let mut current = self.overlay;
        current.set(None);
    }

    pub fn toggle_menu(&self) {
        let mut menu_open = self.menu_open;
        let open = *menu_open.peek();
        menu_open.set(!open);
    }

    pub fn close_menu(&self) {
        let mut menu_open = self.menu_open;
        menu_open.set(false);
    }

    /// Closes the topmost piece of chrome. Returns false when nothing was open.
    pub fn dismiss_top(&self) -> bool {
        if self.overlay.peek().is_some() {
            self.close();
            return true;
        }
        if *self.menu_open.peek() {
            self.close_menu();
            return true;
        }
        false
    }
}
