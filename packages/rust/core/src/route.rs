//! Route layout: main polyline, side-trip connectors and per-segment
//! transport icons, all derived from the marker list.

use serde::Serialize;
use tracing::debug;

use waymark_shared::{Coordinate, TransportMethod};

use crate::geo::{haversine_km, midpoint};
use crate::markers::Marker;

/// A leg of the main route between two consecutive main-route markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub from_index: usize,
    pub to_index: usize,
    pub midpoint: Coordinate,
    pub distance_km: f64,
    /// Arrival method of the destination, else departure method of the origin.
    pub transport: Option<TransportMethod>,
}

/// Dashed line from a side trip back to the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    /// Itinerary index of the full day the side trip hangs off.
    pub anchor_index: usize,
    pub side_trip_index: usize,
    pub from: Coordinate,
    pub to: Coordinate,
}

/// Everything needed to draw lines on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteLayout {
    /// Main-route polyline, in itinerary order.
    pub line: Vec<Coordinate>,
    pub segments: Vec<Segment>,
    pub connectors: Vec<Connector>,
}

impl RouteLayout {
    pub fn total_distance_km(&self) -> f64 {
        self.segments.iter().map(|s| s.distance_km).sum()
    }
}

/// Lay out the route for an ordered marker list.
///
/// Side trips stay off the main line. Each connects to the closest earlier
/// full-day marker; route waypoints are passed over. The search only looks
/// at markers, so a full day without a coordinate is never an anchor. A side
/// trip with no full-day marker before it gets no connector.
pub fn build_route(markers: &[Marker<'_>]) -> RouteLayout {
    let mut layout = RouteLayout::default();
    let mut previous: Option<&Marker<'_>> = None;
    let mut last_full_day: Option<&Marker<'_>> = None;

    for marker in markers {
        if marker.step.is_side_trip() {
            match last_full_day {
                Some(anchor) => layout.connectors.push(Connector {
                    anchor_index: anchor.index,
                    side_trip_index: marker.index,
                    from: anchor.coord,
                    to: marker.coord,
                }),
                None => debug!(
                    index = marker.index,
                    "side trip has no preceding full-day marker, left unconnected"
                ),
            }
            continue;
        }

        if let Some(from) = previous {
            layout.segments.push(segment(from, marker));
        }
        layout.line.push(marker.coord);
        previous = Some(marker);
        if marker.step.is_full_day() {
            last_full_day = Some(marker);
        }
    }

    layout
}

fn segment(from: &Marker<'_>, to: &Marker<'_>) -> Segment {
    let transport = to
        .step
        .transportation()
        .and_then(|t| t.arrival_method)
        .or_else(|| from.step.transportation().and_then(|t| t.departure_method));

    Segment {
        from_index: from.index,
        to_index: to.index,
        midpoint: midpoint(from.coord, to.coord),
        distance_km: haversine_km(from.coord, to.coord),
        transport,
    }
}
