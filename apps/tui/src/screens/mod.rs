//! The two panes of the viewer: step cards on the left, map on the right.

pub(crate) mod itinerary;
pub(crate) mod map;
