//! Replay a timed script of scroll / click / tick events through the
//! scroll-spy and camera controllers.
//!
//! Script format:
//!
//! ```json
//! {
//!   "viewport_height": 800,
//!   "events": [
//!     { "at_ms": 0,   "type": "scroll", "scroll_y": 0,
//!       "visible": [{ "index": 0, "top": 120, "height": 300 }] },
//!     { "at_ms": 400, "type": "click", "index": 3 },
//!     { "at_ms": 1500, "type": "tick" }
//!   ]
//! }
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use waymark_shared::{CameraConfig, Result, ScrollSpyConfig, Trip, WaymarkError};

use crate::camera::{CameraController, CameraMove, FocusOutcome, InitialView, RecordingMap};
use crate::markers::project_markers;
use crate::scroll_spy::{ActiveIndex, ElementRect, ScrollSpy, Viewport};

#[derive(Debug, Clone, Deserialize)]
pub struct EventScript {
    pub viewport_height: f64,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    /// Milliseconds since the start of the session. Must not decrease.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A visibility batch after scrolling.
    Scroll {
        scroll_y: f64,
        #[serde(default)]
        visible: Vec<ElementRect>,
    },
    Click {
        index: usize,
    },
    /// Time passes with no input.
    Tick,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::Scroll { .. } => "scroll",
            Self::Click { .. } => "click",
            Self::Tick => "tick",
        }
    }
}

/// What happened after one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayEntry {
    pub at_ms: u64,
    pub event: &'static str,
    pub active: ActiveIndex,
    pub pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_to: Option<usize>,
    /// Camera reaction; omitted when the active index did not change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<FocusOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_view: Option<InitialView>,
    pub entries: Vec<ReplayEntry>,
    pub camera_moves: Vec<CameraMove>,
}

impl ReplayReport {
    /// Number of animated moves toward a focused step.
    pub fn fly_count(&self) -> usize {
        self.camera_moves
            .iter()
            .filter(|m| matches!(m, CameraMove::FlyTo { .. }))
            .count()
    }
}

/// Parse an event script from JSON text.
pub fn parse_script(json: &str) -> Result<EventScript> {
    let script: EventScript = serde_json::from_str(json)
        .map_err(|e| WaymarkError::parse(format!("invalid event script: {e}")))?;

    if !(script.viewport_height.is_finite() && script.viewport_height > 0.0) {
        return Err(WaymarkError::validation("viewport_height must be positive"));
    }
    if let Some(pair) = script.events.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
        return Err(WaymarkError::validation(format!(
            "events out of order: {}ms after {}ms",
            pair[1].at_ms, pair[0].at_ms
        )));
    }
    Ok(script)
}

/// Run `script` against `trip` and report every state change.
#[instrument(skip_all, fields(trip = %trip.title, events = script.events.len()))]
pub fn replay(
    trip: &Trip,
    script: &EventScript,
    spy_config: ScrollSpyConfig,
    camera_config: CameraConfig,
) -> ReplayReport {
    let markers = project_markers(&trip.steps);
    let mut spy = ScrollSpy::new(trip.steps.len(), spy_config);
    let mut camera = CameraController::new(RecordingMap::default(), camera_config);
    let initial_view = camera.place_initial(&markers);

    let start = Instant::now();
    let mut entries = Vec::with_capacity(script.events.len());

    for event in &script.events {
        let now = start + Duration::from_millis(event.at_ms);
        let before = spy.active();
        let mut scroll_to = None;

        match &event.action {
            Action::Scroll { scroll_y, visible } => {
                let viewport = Viewport {
                    scroll_y: *scroll_y,
                    height: script.viewport_height,
                };
                spy.observe(visible, viewport, now);
            }
            Action::Click { index } => {
                scroll_to = spy.click(*index, now).map(|r| r.index);
            }
            Action::Tick => {
                spy.tick(now);
            }
        }

        let active = spy.active();
        let camera_outcome = (active != before).then(|| camera.focus(active, &markers, now));

        debug!(at_ms = event.at_ms, event = event.action.name(), ?active, ?camera_outcome, "replayed");
        entries.push(ReplayEntry {
            at_ms: event.at_ms,
            event: event.action.name(),
            active,
            pinned: spy.is_pinned(now),
            scroll_to,
            camera: camera_outcome,
        });
    }

    ReplayReport {
        initial_view,
        entries,
        camera_moves: camera.into_map().moves,
    }
}
