//! Scroll-spy: decides which itinerary step is "in focus".
//!
//! Two modes:
//! - `Free`: every visibility batch picks the visible step whose vertical
//!   center is closest to the viewport's vertical center. Near the top of
//!   the page the first step wins regardless.
//! - `Pinned`: entered on click. The clicked step stays active and
//!   visibility batches are ignored until the cooldown elapses, then the
//!   spy falls back to `Free` on its own.
//!
//! Time is passed in by the caller, so the machine works the same under a
//! browser event loop, a terminal poll loop, or a test.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use waymark_shared::ScrollSpyConfig;

/// The step considered in focus, if any has been observed yet.
pub type ActiveIndex = Option<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Free,
    Pinned { until: Instant },
}

/// Position of one step element relative to the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub index: usize,
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn intersects(&self, viewport: &Viewport) -> bool {
        self.top < viewport.height && self.top + self.height > 0.0
    }
}

/// Scroll offset of the page and height of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

/// Ask the host to smooth-scroll a step into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub index: usize,
}

/// Keep only the rects that overlap the viewport.
pub fn visible_rects(rects: &[ElementRect], viewport: &Viewport) -> Vec<ElementRect> {
    rects
        .iter()
        .copied()
        .filter(|r| r.intersects(viewport))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ScrollSpy {
    config: ScrollSpyConfig,
    step_count: usize,
    mode: Mode,
    active: ActiveIndex,
}

impl ScrollSpy {
    pub fn new(step_count: usize, config: ScrollSpyConfig) -> Self {
        Self {
            config,
            step_count,
            mode: Mode::Free,
            active: None,
        }
    }

    pub fn active(&self) -> ActiveIndex {
        self.active
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether clicks still hold authority at `now`.
    pub fn is_pinned(&self, now: Instant) -> bool {
        matches!(self.mode, Mode::Pinned { until } if now < until)
    }

    /// The itinerary changed length. An active index that no longer exists
    /// is cleared.
    pub fn set_step_count(&mut self, step_count: usize) {
        self.step_count = step_count;
        if self.active.is_some_and(|i| i >= step_count) {
            self.active = None;
        }
    }

    /// User clicked a step: activate it now and pin it for the cooldown.
    ///
    /// Returns the scroll the host should perform, or `None` for an index
    /// outside the itinerary.
    pub fn click(&mut self, index: usize, now: Instant) -> Option<ScrollRequest> {
        if index >= self.step_count {
            trace!(index, step_count = self.step_count, "click outside itinerary ignored");
            return None;
        }
        self.active = Some(index);
        self.mode = Mode::Pinned {
            until: now + self.config.cooldown,
        };
        trace!(index, "step pinned by click");
        Some(ScrollRequest { index })
    }

    /// Release an expired pin. Returns `true` when the mode changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.mode {
            Mode::Pinned { until } if now >= until => {
                self.mode = Mode::Free;
                trace!("pin cooldown elapsed, scroll-spy resumes");
                true
            }
            _ => false,
        }
    }

    /// Feed one batch of visible step elements.
    ///
    /// Returns the new active index when it changed.
    pub fn observe(
        &mut self,
        visible: &[ElementRect],
        viewport: Viewport,
        now: Instant,
    ) -> Option<usize> {
        self.tick(now);
        if let Mode::Pinned { .. } = self.mode {
            return None;
        }

        let candidates = visible.iter().filter(|r| r.index < self.step_count);
        let target = viewport.height / 2.0;

        let mut best: Option<(usize, f64)> = None;
        for rect in candidates {
            let distance = (rect.center() - target).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((rect.index, distance));
            }
        }
        // Nothing on screen: keep whatever was active.
        let (mut next, _) = best?;

        if viewport.scroll_y < self.config.top_snap {
            next = 0;
        }

        if self.active == Some(next) {
            return None;
        }
        trace!(from = ?self.active, to = next, "active step changed by scroll");
        self.active = Some(next);
        Some(next)
    }
}
