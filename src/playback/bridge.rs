// Desktop-webview audio driven through `document::eval`.
//
// The webview owns the real `<audio>` elements. Rust keeps a mirror of each
// element that commands update at once and `refresh` reconciles with a
// snapshot from the page.
use super::output::{AudioOutput, PlaybackError};
use dioxus::prelude::*;
use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

const BRIDGE_BOOTSTRAP_JS: &str = r#"
(() => {
  if (window.__quranReaderAudio) {
    return true;
  }

  const elements = {};
  const element = (id) => {
    let audio = elements[id] || document.getElementById(id);
    if (!audio) {
      audio = document.createElement("audio");
      audio.id = id;
      audio.preload = "auto";
      audio.style.display = "none";
      audio.setAttribute("playsinline", "true");
      document.body.appendChild(audio);
    }
    elements[id] = audio;
    return audio;
  };

  const isEditableTarget = (target) => {
    let node = target;
    while (node && node.tagName) {
      const tag = (node.tagName || "").toLowerCase();
      if (tag === "input" || tag === "textarea" || tag === "select") {
        return true;
      }
      const editable = node.getAttribute && node.getAttribute("contenteditable");
      if (editable !== null && String(editable).toLowerCase() !== "false") {
        return true;
      }
      node = node.parentElement || null;
    }
    return false;
  };

  const keys = [];
  const watched = [" ", "Spacebar", "Escape", "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"];

  const bridge = {
    apply(cmd) {
      if (!cmd || !cmd.id || !cmd.type) return;
      const audio = element(cmd.id);
      switch (cmd.type) {
        case "source":
          if (cmd.src && audio.src !== cmd.src) {
            audio.src = cmd.src;
          }
          break;
        case "pause":
          audio.pause();
          break;
        case "seek":
          if (typeof cmd.position === "number" && Number.isFinite(cmd.position)) {
            try {
              audio.currentTime = Math.max(0, cmd.position);
            } catch (_err) {}
          }
          break;
        case "rate":
          if (typeof cmd.value === "number" && cmd.value > 0) {
            audio.playbackRate = cmd.value;
          }
          break;
        case "loop":
          audio.loop = !!cmd.enabled;
          break;
        case "release":
          audio.pause();
          audio.removeAttribute("src");
          audio.load();
          audio.remove();
          delete elements[cmd.id];
          break;
      }
    },
    async play(cmd) {
      const audio = element(cmd.id);
      if (cmd.src && audio.src !== cmd.src) {
        audio.src = cmd.src;
      }
      if (typeof cmd.rate === "number" && cmd.rate > 0) {
        audio.playbackRate = cmd.rate;
      }
      audio.loop = !!cmd.loop;
      try {
        await audio.play();
        return { ok: true };
      } catch (err) {
        return {
          ok: false,
          name: (err && err.name) || "Error",
          message: String((err && err.message) || err),
        };
      }
    },
    snapshot(id) {
      const audio = elements[id];
      if (!audio) {
        return { current_time: 0, duration: 0, paused: true, ended: false };
      }
      return {
        current_time: Number.isFinite(audio.currentTime) ? audio.currentTime : 0,
        duration: Number.isFinite(audio.duration) ? audio.duration : 0,
        paused: !!audio.paused,
        ended: !!audio.ended,
      };
    },
    drainKeys() {
      return keys.splice(0, keys.length);
    },
  };

  document.addEventListener("keydown", (event) => {
    if (!event || event.defaultPrevented || event.isComposing) return;
    const key = event.key || "";
    const code = event.code || "";
    if (!watched.includes(key) && code !== "Space") return;

    const editable = isEditableTarget(event.target);
    const modified = !!(event.metaKey || event.ctrlKey || event.altKey);
    const prompting = !!document.querySelector(".modal");
    if (key !== "Escape" && !editable && !modified && !prompting) {
      event.preventDefault();
    }
    keys.push({ key, code, modified, editable });
  }, true);

  window.__quranReaderAudio = bridge;
  return true;
})();
"#;

fn ensure_bridge() {
    let _ = document::eval(BRIDGE_BOOTSTRAP_JS);
}

fn bridge_command(command: serde_json::Value) {
    ensure_bridge();
    let payload = serde_json::to_string(&command).unwrap_or_else(|_| "{}".to_string());
    let script = format!(
        r#"(function () {{
            const bridge = window.__quranReaderAudio;
            if (!bridge) return false;
            bridge.apply({payload});
            return true;
        }})();"#
    );
    let _ = document::eval(&script);
}

/// A key press the webview saw; mapped to a shortcut on the Rust side.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyPress {
    pub key: String,
    pub code: String,
    pub modified: bool,
    pub editable: bool,
}

/// Key presses recorded since the last call.
pub async fn drain_key_presses() -> Vec<KeyPress> {
    ensure_bridge();
    let eval = document::eval(
        r#"return (function () {
            const bridge = window.__quranReaderAudio;
            return (bridge && typeof bridge.drainKeys === "function") ? bridge.drainKeys() : [];
        })();"#,
    );
    eval.join::<Vec<KeyPress>>().await.unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct BridgeSnapshot {
    current_time: f64,
    duration: f64,
    paused: bool,
    ended: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PlayOutcome {
    ok: bool,
    name: Option<String>,
    message: Option<String>,
}

impl PlayOutcome {
    fn into_result(self) -> Result<(), PlaybackError> {
        if self.ok {
            return Ok(());
        }
        Err(match self.name.as_deref().unwrap_or_default() {
            "NotAllowedError" => PlaybackError::Blocked,
            "NotSupportedError" => PlaybackError::Failed("unsupported audio source".to_string()),
            name => PlaybackError::Failed(
                self.message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| name.to_string()),
            ),
        })
    }
}

/// Rust-side copy of one webview element.
#[derive(Debug, Clone, PartialEq)]
struct Mirror {
    source: Option<String>,
    paused: bool,
    time: f64,
    duration: Option<f64>,
    ended: bool,
    rate: f64,
    looping: bool,
    /// Bumped by every local command.
    revision: u64,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            time: 0.0,
            duration: None,
            ended: false,
            rate: 1.0,
            looping: false,
            revision: 0,
        }
    }
}

impl Mirror {
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Takes over a snapshot requested at `revision`. A command sent after the
    /// request wins, so a late snapshot cannot resurrect the previous track.
    fn apply(&mut self, snapshot: &BridgeSnapshot, revision: u64) -> bool {
        if self.revision != revision || self.source.is_none() {
            return false;
        }
        self.paused = snapshot.paused;
        self.time = snapshot.current_time.max(0.0);
        self.duration =
            (snapshot.duration.is_finite() && snapshot.duration > 0.0).then_some(snapshot.duration);
        self.ended = snapshot.ended;
        true
    }
}

/// An `<audio>` element in the desktop or mobile webview.
pub struct BridgeAudioOutput {
    id: String,
    mirror: Rc<RefCell<Mirror>>,
}

impl BridgeAudioOutput {
    pub fn new(id: &str) -> Self {
        ensure_bridge();
        Self {
            id: id.to_string(),
            mirror: Rc::new(RefCell::new(Mirror::default())),
        }
    }

    fn send(&self, kind: &str, extra: serde_json::Value) {
        let mut command = json!({ "id": self.id, "type": kind });
        if let (Some(command), Some(extra)) = (command.as_object_mut(), extra.as_object()) {
            command.extend(extra.clone());
        }
        bridge_command(command);
    }
}

impl AudioOutput for BridgeAudioOutput {
    fn set_source(&self, url: &str) {
        {
            let mut mirror = self.mirror.borrow_mut();
            mirror.source = Some(url.to_string());
            mirror.paused = true;
            mirror.time = 0.0;
            mirror.duration = None;
            mirror.ended = false;
            mirror.touch();
        }
        self.send("pause", json!({}));
        self.send("source", json!({ "src": url }));
    }

    fn source(&self) -> Option<String> {
        self.mirror.borrow().source.clone()
    }

    fn start(&self) -> LocalBoxFuture<'static, Result<(), PlaybackError>> {
        let (src, rate, looping) = {
            let mut mirror = self.mirror.borrow_mut();
            let Some(src) = mirror.source.clone() else {
                return Box::pin(futures_util::future::ready(Err(PlaybackError::NoSource)));
            };
            if mirror.ended {
                mirror.time = 0.0;
            }
            mirror.paused = false;
            mirror.ended = false;
            mirror.touch();
            (src, mirror.rate, mirror.looping)
        };

        ensure_bridge();
        let payload = json!({ "id": self.id, "src": src, "rate": rate, "loop": looping });
        let eval = document::eval(&format!(
            r#"return (async function () {{
                const bridge = window.__quranReaderAudio;
                if (!bridge) return {{ ok: false, name: "BridgeMissing", message: "audio bridge is not installed" }};
                return await bridge.play({payload});
            }})();"#
        ));
        let mirror = self.mirror.clone();
        Box::pin(async move {
            let result = match eval.join::<PlayOutcome>().await {
                Ok(outcome) => outcome.into_result(),
                Err(e) => Err(PlaybackError::Failed(format!("{e:?}"))),
            };
            if result.is_err() {
                let mut mirror = mirror.borrow_mut();
                mirror.paused = true;
                mirror.touch();
            }
            result
        })
    }

    fn pause(&self) {
        {
            let mut mirror = self.mirror.borrow_mut();
            mirror.paused = true;
            mirror.touch();
        }
        self.send("pause", json!({}));
    }

    fn is_paused(&self) -> bool {
        self.mirror.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.mirror.borrow().time
    }

    fn set_current_time(&self, seconds: f64) {
        {
            let mut mirror = self.mirror.borrow_mut();
            mirror.time = seconds.max(0.0);
            mirror.touch();
        }
        self.send("seek", json!({ "position": seconds }));
    }

    fn duration(&self) -> Option<f64> {
        self.mirror.borrow().duration
    }

    fn ended(&self) -> bool {
        self.mirror.borrow().ended
    }

    fn set_playback_rate(&self, rate: f64) {
        self.mirror.borrow_mut().rate = rate;
        self.send("rate", json!({ "value": rate }));
    }

    fn set_looping(&self, looping: bool) {
        self.mirror.borrow_mut().looping = looping;
        self.send("loop", json!({ "enabled": looping }));
    }

    fn release(&self) {
        {
            let mut mirror = self.mirror.borrow_mut();
            mirror.source = None;
            mirror.paused = true;
            mirror.touch();
        }
        self.send("release", json!({}));
    }

    fn refresh(&self) -> LocalBoxFuture<'static, ()> {
        let revision = {
            let mirror = self.mirror.borrow();
            if mirror.source.is_none() {
                return Box::pin(futures_util::future::ready(()));
            }
            mirror.revision
        };
        ensure_bridge();
        let id = json!(self.id);
        let eval = document::eval(&format!(
            r#"return (function () {{
                const bridge = window.__quranReaderAudio;
                return (bridge && typeof bridge.snapshot === "function") ? bridge.snapshot({id}) : {{}};
            }})();"#
        ));
        let mirror = self.mirror.clone();
        Box::pin(async move {
            if let Ok(snapshot) = eval.join::<BridgeSnapshot>().await {
                mirror.borrow_mut().apply(&snapshot, revision);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> Mirror {
        Mirror {
            source: Some("https://cdn.example/1/7.mp3".to_string()),
            ..Mirror::default()
        }
    }

    #[test]
    fn snapshot_updates_the_mirror() {
        let mut mirror = loaded();
        let snapshot = BridgeSnapshot {
            current_time: 4.5,
            duration: 6.0,
            paused: false,
            ended: false,
        };
        assert!(mirror.apply(&snapshot, mirror.revision));
        assert_eq!(mirror.time, 4.5);
        assert_eq!(mirror.duration, Some(6.0));
        assert!(!mirror.paused);
    }

    #[test]
    fn snapshot_taken_before_a_new_source_is_dropped() {
        let mut mirror = loaded();
        let requested_at = mirror.revision;

        // The next verse is loaded while the snapshot of the old one is in flight.
        mirror.source = Some("https://cdn.example/1/8.mp3".to_string());
        mirror.ended = false;
        mirror.touch();

        let stale = BridgeSnapshot {
            current_time: 6.0,
            duration: 6.0,
            paused: true,
            ended: true,
        };
        assert!(!mirror.apply(&stale, requested_at));
        assert!(!mirror.ended);
    }

    #[test]
    fn unknown_duration_stays_unknown() {
        let mut mirror = loaded();
        let snapshot = BridgeSnapshot {
            duration: 0.0,
            ..BridgeSnapshot::default()
        };
        mirror.apply(&snapshot, mirror.revision);
        assert_eq!(mirror.duration, None);
    }

    #[test]
    fn refused_play_maps_to_playback_errors() {
        let refused = |name: &str, message: &str| PlayOutcome {
            ok: false,
            name: Some(name.to_string()),
            message: Some(message.to_string()),
        };
        assert_eq!(
            refused("NotAllowedError", "needs a gesture").into_result(),
            Err(PlaybackError::Blocked)
        );
        assert_eq!(
            refused("AbortError", "").into_result(),
            Err(PlaybackError::Failed("AbortError".to_string()))
        );
        assert_eq!(
            PlayOutcome {
                ok: true,
                ..PlayOutcome::default()
            }
            .into_result(),
            Ok(())
        );
    }

    #[test]
    fn key_presses_deserialize_with_defaults() {
        let presses: Vec<KeyPress> =
            serde_json::from_str(r#"[{"key":" ","code":"Space"},{"key":"Escape","editable":true}]"#)
                .unwrap();
        assert_eq!(presses[0].code, "Space");
        assert!(!presses[0].modified);
        assert!(presses[1].editable);
    }
}
