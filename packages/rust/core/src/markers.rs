//! Marker projection: ordered itinerary → ordered, located markers.

use tracing::{debug, instrument};

use waymark_shared::{Coordinate, ItineraryStep};

/// A located step. `index` is the step's position in the itinerary, not in
/// the marker list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker<'a> {
    pub index: usize,
    pub coord: Coordinate,
    pub step: &'a ItineraryStep,
}

/// Keep every step that has a coordinate, in itinerary order.
///
/// Unlocated steps leave a gap in the indices; no slot is reserved for them.
#[instrument(skip_all, fields(steps = steps.len()))]
pub fn project_markers(steps: &[ItineraryStep]) -> Vec<Marker<'_>> {
    let markers: Vec<Marker<'_>> = steps
        .iter()
        .enumerate()
        .filter_map(|(index, step)| {
            step.location.map(|coord| Marker { index, coord, step })
        })
        .collect();

    if markers.len() < steps.len() {
        debug!(
            skipped = steps.len() - markers.len(),
            "steps without coordinates left off the map"
        );
    }
    markers
}

/// Find the marker for an itinerary index.
pub fn marker_for_index<'m, 'a>(markers: &'m [Marker<'a>], index: usize) -> Option<&'m Marker<'a>> {
    markers
        .binary_search_by_key(&index, |m| m.index)
        .ok()
        .map(|pos| &markers[pos])
}

#[cfg(test)]
pub(crate) mod test_support {
    use waymark_shared::{
        ConnectionType, Coordinate, ItineraryStep, StepId, StepKind, TransportMethod,
        Transportation,
    };

    pub(crate) fn full_day(name: &str, at: Option<(f64, f64)>) -> ItineraryStep {
        ItineraryStep {
            id: StepId(format!("id-{name}")),
            name: name.into(),
            description: None,
            location: at.map(|(lat, lng)| Coordinate::new(lat, lng)),
            gallery: vec![],
            activities: None,
            region: None,
            kind: StepKind::FullDay {
                duration: None,
                accommodation: None,
                transportation: None,
            },
        }
    }

    pub(crate) fn arriving_by(mut step: ItineraryStep, method: TransportMethod) -> ItineraryStep {
        if let StepKind::FullDay { transportation, .. } = &mut step.kind {
            *transportation = Some(Transportation {
                arrival_method: Some(method),
                ..Default::default()
            });
        }
        step
    }

    pub(crate) fn waypoint(name: &str, at: Option<(f64, f64)>) -> ItineraryStep {
        ItineraryStep {
            kind: StepKind::Waypoint {
                connection: ConnectionType::Route,
            },
            ..full_day(name, at)
        }
    }

    pub(crate) fn side_trip(name: &str, at: Option<(f64, f64)>) -> ItineraryStep {
        ItineraryStep {
            kind: StepKind::Waypoint {
                connection: ConnectionType::SideTrip,
            },
            ..full_day(name, at)
        }
    }
}
