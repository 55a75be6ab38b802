// Distance-scaled smooth scrolling that centers a verse in the viewport.

#[cfg(any(test, target_arch = "wasm32"))]
pub const BASE_DURATION_MS: f64 = 1400.0;
#[cfg(any(test, target_arch = "wasm32"))]
pub const DISTANCE_STEP_PX: f64 = 500.0;
#[cfg(any(test, target_arch = "wasm32"))]
pub const MAX_DISTANCE_FACTOR: f64 = 1.5;
#[cfg(any(test, target_arch = "wasm32"))]
pub const DISTANCE_DURATION_MS: f64 = 400.0;
#[cfg(any(test, target_arch = "wasm32"))]
pub const FRAME_MS: u64 = 16;

/// One scroll animation from `start` to `target`.
#[cfg(any(test, target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPlan {
    pub start: f64,
    pub target: f64,
    pub duration_ms: f64,
}

#[cfg(any(test, target_arch = "wasm32"))]
pub fn ease_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

#[cfg(any(test, target_arch = "wasm32"))]
impl ScrollPlan {
    /// Plan that puts the middle of an element at the middle of the viewport.
    ///
    /// `element_top` is relative to the document, not the viewport.
    pub fn centering(start: f64, element_top: f64, element_height: f64, viewport_height: f64) -> Self {
        let target = (element_top - viewport_height / 2.0 + element_height / 2.0).max(0.0);
        let distance = (target - start).abs();
        let factor = (distance / DISTANCE_STEP_PX).min(MAX_DISTANCE_FACTOR);
        Self {
            start,
            target,
            duration_ms: BASE_DURATION_MS + factor * DISTANCE_DURATION_MS,
        }
    }

    pub fn distance(&self) -> f64 {
        self.target - self.start
    }

    /// Target is within a pixel, so nothing to animate.
    pub fn is_settled(&self) -> bool {
        self.distance().abs() < 1.0
    }

    pub fn position_at(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.target;
        }
        let progress = ease_out_quart(elapsed_ms / self.duration_ms);
        self.start + self.distance() * progress
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static SCROLL_GENERATION: std::cell::Cell<u64> = const { std::cell::Cell::new(0) };
}

/// Animates the window so the element with `element_id` is centered. A newer
/// call supersedes a running animation.
#[cfg(target_arch = "wasm32")]
pub fn scroll_to_element(element_id: &str) {
    use web_sys::window;

    let Some(win) = window() else {
        return;
    };
    let Some(element) = win
        .document()
        .and_then(|doc| doc.get_element_by_id(element_id))
    else {
        tracing::debug!(element_id, "scroll target not rendered");
        return;
    };

    let start = win.scroll_y().unwrap_or(0.0);
    let rect = element.get_bounding_client_rect();
    let viewport = win
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0);
    let plan = ScrollPlan::centering(start, rect.top() + start, rect.height(), viewport);
    if plan.is_settled() {
        return;
    }

    let generation = SCROLL_GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    wasm_bindgen_futures::spawn_local(async move {
        let mut elapsed = 0.0;
        loop {
            if SCROLL_GENERATION.with(|g| g.get()) != generation {
                return;
            }
            let Some(win) = window() else {
                return;
            };
            win.scroll_to_with_x_and_y(win.scroll_x().unwrap_or(0.0), plan.position_at(elapsed));
            if plan.is_finished(elapsed) {
                return;
            }
            gloo_timers::future::TimeoutFuture::new(FRAME_MS as u32).await;
            elapsed += FRAME_MS as f64;
        }
    });
}

/// The webview animates the scroll itself on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub fn scroll_to_element(element_id: &str) {
    let Ok(id) = serde_json::to_string(element_id) else {
        return;
    };
    let _ = dioxus::prelude::document::eval(&format!(
        r#"(function () {{
            const element = document.getElementById({id});
            if (element) element.scrollIntoView({{ behavior: "smooth", block: "center" }});
        }})();"#
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centering_target_and_duration() {
        let plan = ScrollPlan::centering(0.0, 800.0, 100.0, 800.0);
        assert_eq!(plan.target, 450.0);
        assert_eq!(plan.duration_ms, 1400.0 + (450.0 / 500.0) * 400.0);

        let plan = ScrollPlan::centering(1000.0, 1200.0, 100.0, 800.0);
        assert_eq!(plan.target, 850.0);
        assert_eq!(plan.duration_ms, 1400.0 + (150.0 / 500.0) * 400.0);
    }

    #[test]
    fn duration_term_is_capped() {
        let plan = ScrollPlan::centering(0.0, 50_000.0, 100.0, 800.0);
        assert_eq!(plan.duration_ms, 1400.0 + 1.5 * 400.0);
    }

    #[test]
    fn target_never_goes_above_the_page() {
        let plan = ScrollPlan::centering(300.0, 40.0, 60.0, 900.0);
        assert_eq!(plan.target, 0.0);
    }

    #[test]
    fn easing_starts_fast_and_lands_exactly() {
        let plan = ScrollPlan::centering(0.0, 1400.0, 0.0, 800.0);
        assert_eq!(plan.position_at(0.0), 0.0);
        let halfway = plan.position_at(plan.duration_ms / 2.0);
        assert!(halfway > plan.target * 0.9, "{halfway}");
        assert_eq!(plan.position_at(plan.duration_ms), plan.target);
        assert_eq!(plan.position_at(plan.duration_ms * 2.0), plan.target);
    }

    #[test]
    fn already_centered_is_settled() {
        let plan = ScrollPlan::centering(500.0, 850.3, 100.0, 800.0);
        assert!(plan.is_settled());
    }
}
