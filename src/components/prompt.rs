// Modal questions that suspend the caller until the user answers.
use crate::api::display_name;
use crate::playback::Prompter;
use dioxus::prelude::*;
use futures_channel::oneshot;
use futures_util::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRequest {
    NextSection { finished: u16, next: u16 },
    Completion,
}

/// The one pending answer. Opening a new question declines the previous one.
#[derive(Debug, Default)]
pub struct ResponseSlot {
    sender: RefCell<Option<oneshot::Sender<bool>>>,
}

impl ResponseSlot {
    pub fn open(&self) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        if let Some(previous) = self.sender.borrow_mut().replace(tx) {
            let _ = previous.send(false);
        }
        rx
    }

    pub fn resolve(&self, answer: bool) -> bool {
        match self.sender.borrow_mut().take() {
            Some(tx) => tx.send(answer).is_ok(),
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct PromptController {
    pub request: Signal<Option<PromptRequest>>,
    slot: Rc<ResponseSlot>,
}

impl PartialEq for PromptController {
    fn eq(&self, other: &Self) -> bool {
        self.request == other.request && Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl PromptController {
    pub fn new(request: Signal<Option<PromptRequest>>) -> Self {
        Self {
            request,
            slot: Rc::new(ResponseSlot::default()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.request.peek().is_some()
    }

    fn ask(&self, request: PromptRequest) -> oneshot::Receiver<bool> {
        let rx = self.slot.open();
        let mut current = self.request;
        current.set(Some(request));
        rx
    }

    pub fn respond(&self, answer: bool) {
        let mut current = self.request;
        current.set(None);
        self.slot.resolve(answer);
    }
}

impl Prompter for PromptController {
    fn confirm_next_section(&self, finished: u16, next: u16) -> LocalBoxFuture<'_, bool> {
        let rx = self.ask(PromptRequest::NextSection { finished, next });
        Box::pin(async move { rx.await.unwrap_or(false) })
    }

    fn announce_completion(&self) -> LocalBoxFuture<'_, ()> {
        let rx = self.ask(PromptRequest::Completion);
        Box::pin(async move {
            let _ = rx.await;
        })
    }
}

#[component]
pub fn PromptOverlay(controller: PromptController) -> Element {
    let Some(request) = (controller.request)() else {
        return rsx! {};
    };

    let (title, body, confirm, decline) = match request {
        PromptRequest::NextSection { finished, next } => (
            format!("{} complete", display_name(finished)),
            format!(
                "You finished {}. Continue with {} ({next})?",
                display_name(finished),
                display_name(next)
            ),
            "Continue",
            Some("Stay here"),
        ),
        PromptRequest::Completion => (
            "Quran complete".to_string(),
            "You have listened to the last surah. May it be accepted.".to_string(),
            "Close",
            None,
        ),
    };

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: {
                let controller = controller.clone();
                move |_| controller.respond(false)
            },
            div {
                class: "modal",
                role: "dialog",
                aria_modal: "true",
                onclick: move |evt: MouseEvent| evt.stop_propagation(),
                h2 { class: "modal__title", "{title}" }
                p { class: "modal__body", "{body}" }
                div { class: "modal__actions",
                    if let Some(decline) = decline {
                        button {
                            class: "btn btn--ghost",
                            onclick: {
                                let controller = controller.clone();
                                move |_| controller.respond(false)
                            },
                            "{decline}"
                        }
                    }
                    button {
                        class: "btn btn--primary",
                        autofocus: true,
                        onclick: {
                            let controller = controller.clone();
                            move |_| controller.respond(true)
                        },
                        "{confirm}"
                    }
                }
            }
        }
    }
}
