//! Itinerary-to-map logic for Waymark.
//!
//! Takes a normalized [`waymark_shared::Trip`] and produces what a map
//! needs: markers, route lines, popups, the initial camera placement, and
//! the two controllers that keep the map in step with the itinerary list
//! (scroll-spy and camera).

pub mod camera;
pub mod geo;
pub mod map_model;
pub mod markers;
pub mod popup;
pub mod replay;
pub mod route;
pub mod scroll_spy;

pub use camera::{CameraController, CameraMove, FocusOutcome, InitialView, MapHandle, RecordingMap};
pub use markers::{Marker, project_markers};
pub use route::{RouteLayout, build_route};
pub use scroll_spy::{ActiveIndex, ElementRect, Mode, ScrollRequest, ScrollSpy, Viewport};
