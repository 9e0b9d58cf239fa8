//! Map camera control.
//!
//! [`CameraController`] is the only writer of the map viewport: it takes
//! the [`MapHandle`] by value and never hands out mutable access to it.
//! Scroll-spy and marker code only produce inputs for it.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, trace};

use waymark_shared::{CameraConfig, Coordinate};

use crate::geo::Bounds;
use crate::markers::{Marker, marker_for_index};
use crate::scroll_spy::ActiveIndex;

/// The operations a map widget must support.
pub trait MapHandle {
    /// Animated move to `center` at `zoom`.
    fn fly_to(&mut self, center: Coordinate, zoom: f64);
    /// Fit the viewport around `bounds`, keeping `padding_px` free at the edges.
    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32);
    /// Immediate, unanimated placement.
    fn set_view(&mut self, center: Coordinate, zoom: f64);
}

/// A camera operation, as recorded by [`RecordingMap`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraMove {
    FlyTo { center: Coordinate, zoom: f64 },
    FitBounds { bounds: Bounds, padding_px: u32 },
    SetView { center: Coordinate, zoom: f64 },
}

/// Map handle that only remembers what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingMap {
    pub moves: Vec<CameraMove>,
}

impl MapHandle for RecordingMap {
    fn fly_to(&mut self, center: Coordinate, zoom: f64) {
        self.moves.push(CameraMove::FlyTo { center, zoom });
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32) {
        self.moves.push(CameraMove::FitBounds { bounds, padding_px });
    }

    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        self.moves.push(CameraMove::SetView { center, zoom });
    }
}

/// First-load placement, computed from all markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialView {
    Fit { bounds: Bounds, padding_px: u32 },
    Single { center: Coordinate, zoom: f64 },
}

/// Fit all markers, or center a lone marker at the capped zoom.
/// Markers that all share one position count as a lone marker.
pub fn initial_view(markers: &[Marker<'_>], config: &CameraConfig) -> Option<InitialView> {
    let bounds = Bounds::enclosing(markers.iter().map(|m| m.coord))?;
    let (width, height) = bounds.span();
    if width == 0.0 && height == 0.0 {
        return Some(InitialView::Single {
            center: bounds.south_west,
            zoom: config.single_marker_zoom,
        });
    }
    Some(InitialView::Fit {
        bounds,
        padding_px: config.fit_padding_px,
    })
}

/// Why a focus request did or did not move the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusOutcome {
    Moved,
    /// Too soon after the previous move; the request is dropped.
    Throttled,
    /// Same index as the previous request.
    Unchanged,
    NoActive,
    /// The active step has no coordinate.
    NoMarker,
}

pub struct CameraController<M: MapHandle> {
    map: M,
    config: CameraConfig,
    last_move: Option<Instant>,
    last_requested: ActiveIndex,
}

impl<M: MapHandle> CameraController<M> {
    pub fn new(map: M, config: CameraConfig) -> Self {
        Self {
            map,
            config,
            last_move: None,
            last_requested: None,
        }
    }

    /// Read-only access to the owned map.
    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn into_map(self) -> M {
        self.map
    }

    /// Forget the last requested index, e.g. after the itinerary changed.
    pub fn reset(&mut self) {
        self.last_requested = None;
    }

    /// Place the camera for first load. Does nothing without markers.
    pub fn place_initial(&mut self, markers: &[Marker<'_>]) -> Option<InitialView> {
        let view = initial_view(markers, &self.config)?;
        match view {
            InitialView::Fit { bounds, padding_px } => self.map.fit_bounds(bounds, padding_px),
            InitialView::Single { center, zoom } => self.map.set_view(center, zoom),
        }
        debug!(?view, markers = markers.len(), "initial camera placed");
        Some(view)
    }

    /// React to an active-index change.
    ///
    /// A request arriving within the throttle window of the previous move is
    /// dropped for good, even if nothing else arrives afterwards.
    pub fn focus(
        &mut self,
        active: ActiveIndex,
        markers: &[Marker<'_>],
        now: Instant,
    ) -> FocusOutcome {
        if active == self.last_requested {
            return FocusOutcome::Unchanged;
        }
        self.last_requested = active;

        let Some(index) = active else {
            return FocusOutcome::NoActive;
        };
        let Some(marker) = marker_for_index(markers, index) else {
            trace!(index, "active step has no marker, camera stays");
            return FocusOutcome::NoMarker;
        };

        let throttle = self.config.throttle;
        if self
            .last_move
            .is_some_and(|last| now.saturating_duration_since(last) < throttle)
        {
            trace!(index, "camera move dropped by throttle");
            return FocusOutcome::Throttled;
        }

        self.map.fly_to(marker.coord, self.config.focus_zoom);
        self.last_move = Some(now);
        trace!(index, coord = %marker.coord, "camera flying to active step");
        FocusOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::project_markers;
    use crate::markers::test_support::*;
    use std::time::Duration;

    fn controller() -> CameraController<RecordingMap> {
        CameraController::new(RecordingMap::default(), CameraConfig::default())
    }

    #[test]
    fn focus_flies_to_matching_marker() {
        let steps = vec![
            full_day("a", Some((42.87, 74.57))),
            full_day("b", None),
            full_day("c", Some((41.83, 75.12))),
        ];
        let markers = project_markers(&steps);
        let mut camera = controller();

        assert_eq!(camera.focus(Some(2), &markers, Instant::now()), FocusOutcome::Moved);
        assert_eq!(
            camera.map().moves,
            vec![CameraMove::FlyTo {
                center: Coordinate::new(41.83, 75.12),
                zoom: 10.0
            }]
        );
    }

    #[test]
    fn two_changes_within_window_move_once() {
        let steps = vec![
            waypoint("a", Some((1.0, 1.0))),
            waypoint("b", Some((2.0, 2.0))),
        ];
        let markers = project_markers(&steps);
        let mut camera = controller();
        let t0 = Instant::now();

        assert_eq!(camera.focus(Some(0), &markers, t0), FocusOutcome::Moved);
        assert_eq!(
            camera.focus(Some(1), &markers, t0 + Duration::from_millis(60)),
            FocusOutcome::Throttled
        );
        assert_eq!(camera.map().moves.len(), 1);

        // The dropped request is not replayed later.
        assert_eq!(
            camera.focus(Some(1), &markers, t0 + Duration::from_millis(500)),
            FocusOutcome::Unchanged
        );
        assert_eq!(camera.map().moves.len(), 1);
    }

    #[test]
    fn changes_outside_window_both_move() {
        let steps = vec![
            waypoint("a", Some((1.0, 1.0))),
            waypoint("b", Some((2.0, 2.0))),
        ];
        let markers = project_markers(&steps);
        let mut camera = controller();
        let t0 = Instant::now();

        camera.focus(Some(0), &markers, t0);
        assert_eq!(
            camera.focus(Some(1), &markers, t0 + Duration::from_millis(100)),
            FocusOutcome::Moved
        );
        assert_eq!(camera.map().moves.len(), 2);
    }

    #[test]
    fn no_op_conditions() {
        let steps = vec![waypoint("a", Some((1.0, 1.0))), waypoint("b", None)];
        let markers = project_markers(&steps);
        let mut camera = controller();
        let now = Instant::now();

        assert_eq!(camera.focus(None, &markers, now), FocusOutcome::Unchanged);
        assert_eq!(camera.focus(Some(1), &markers, now), FocusOutcome::NoMarker);
        assert_eq!(camera.focus(None, &markers, now), FocusOutcome::NoActive);
        assert!(camera.map().moves.is_empty());
    }

    #[test]
    fn unlocated_step_does_not_consume_throttle() {
        let steps = vec![
            waypoint("a", Some((1.0, 1.0))),
            waypoint("b", None),
            waypoint("c", Some((3.0, 3.0))),
        ];
        let markers = project_markers(&steps);
        let mut camera = controller();
        let t0 = Instant::now();

        camera.focus(Some(1), &markers, t0);
        assert_eq!(
            camera.focus(Some(2), &markers, t0 + Duration::from_millis(10)),
            FocusOutcome::Moved
        );
    }

    #[test]
    fn initial_view_fits_all_markers() {
        let steps = vec![
            full_day("a", Some((42.87, 74.57))),
            side_trip("b", Some((42.75, 75.25))),
            full_day("c", Some((41.83, 75.12))),
        ];
        let markers = project_markers(&steps);
        let mut camera = controller();

        let view = camera.place_initial(&markers).expect("view");
        match view {
            InitialView::Fit { bounds, padding_px } => {
                assert_eq!(padding_px, 50);
                assert_eq!(bounds.south_west, Coordinate::new(41.83, 74.57));
                assert_eq!(bounds.north_east, Coordinate::new(42.87, 75.25));
            }
            other => panic!("expected fit, got {other:?}"),
        }
        assert!(matches!(camera.map().moves[0], CameraMove::FitBounds { .. }));
    }

    #[test]
    fn single_marker_uses_capped_zoom() {
        let steps = vec![full_day("a", Some((42.87, 74.57))), full_day("b", None)];
        let markers = project_markers(&steps);
        let config = CameraConfig {
            single_marker_zoom: 8.0,
            ..CameraConfig::default()
        };
        assert_eq!(
            initial_view(&markers, &config),
            Some(InitialView::Single {
                center: Coordinate::new(42.87, 74.57),
                zoom: 8.0
            })
        );
    }

    #[test]
    fn no_markers_no_initial_view() {
        let mut camera = controller();
        assert!(camera.place_initial(&[]).is_none());
        assert!(camera.map().moves.is_empty());
    }

    #[test]
    fn reset_allows_same_index_again() {
        let steps = vec![waypoint("a", Some((1.0, 1.0)))];
        let markers = project_markers(&steps);
        let mut camera = controller();
        let t0 = Instant::now();
        camera.focus(Some(0), &markers, t0);
        camera.reset();
        assert_eq!(
            camera.focus(Some(0), &markers, t0 + Duration::from_secs(1)),
            FocusOutcome::Moved
        );
    }
}
