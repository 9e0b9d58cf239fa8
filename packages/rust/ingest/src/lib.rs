//! Ingestion boundary: raw CMS documents → canonical [`Trip`]s.
//!
//! Coordinates are normalized exactly once here, so rendering code only
//! ever sees `Option<Coordinate>`. Fields with an unexpected shape are
//! ignored with a diagnostic; they never fail the block or the document.

pub mod raw;
pub mod resolver;

use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use waymark_shared::{
    ConnectionType, GalleryItem, ItineraryStep, Result, StepId, StepKind, Trip, WaymarkError,
};

use crate::raw::{RawStep, RawTrip, id_string};

/// Read and normalize a trip from a JSON file.
pub fn load_trip(path: &Path) -> Result<Trip> {
    let content = std::fs::read_to_string(path).map_err(|e| WaymarkError::io(path, e))?;
    parse_trip(&content)
}

/// Parse a trip from JSON text.
///
/// Accepts a Trips document, a REST envelope `{"docs": [...]}` (first
/// document wins), or a bare array of itinerary blocks.
#[instrument(skip_all, fields(bytes = json.len()))]
pub fn parse_trip(json: &str) -> Result<Trip> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| WaymarkError::parse(format!("invalid JSON: {e}")))?;
    trip_from_value(value)
}

/// Normalize an already-parsed JSON document.
pub fn trip_from_value(value: Value) -> Result<Trip> {
    let raw = match value {
        Value::Array(itinerary) => RawTrip {
            itinerary: Some(itinerary),
            ..Default::default()
        },
        Value::Object(mut obj) => match obj.remove("docs") {
            Some(Value::Array(docs)) => {
                let first = docs
                    .into_iter()
                    .next()
                    .ok_or_else(|| WaymarkError::validation("envelope has no documents"))?;
                serde_json::from_value(first)
                    .map_err(|e| WaymarkError::parse(format!("invalid trip document: {e}")))?
            }
            Some(_) => return Err(WaymarkError::parse("`docs` must be an array")),
            None => serde_json::from_value(Value::Object(obj))
                .map_err(|e| WaymarkError::parse(format!("invalid trip document: {e}")))?,
        },
        _ => {
            return Err(WaymarkError::parse(
                "expected a trip object, an envelope or an itinerary array",
            ));
        }
    };

    Ok(normalize_trip(raw))
}

/// Convert a raw trip. Only blocks that are not JSON objects are dropped,
/// so step indices follow the stored itinerary order.
pub fn normalize_trip(raw: RawTrip) -> Trip {
    let blocks = raw.itinerary.unwrap_or_default();
    let total = blocks.len();
    let mut steps = Vec::with_capacity(total);

    for (position, value) in blocks.into_iter().enumerate() {
        if !value.is_object() {
            warn!(position, "itinerary block is not an object, skipping");
            continue;
        }
        match serde_json::from_value::<RawStep>(value) {
            Ok(step) => steps.push(normalize_step(step, position)),
            Err(e) => warn!(position, error = %e, "malformed itinerary block, skipping"),
        }
    }

    let located = steps.iter().filter(|s| s.location.is_some()).count();
    info!(
        blocks = total,
        steps = steps.len(),
        located,
        "itinerary normalized"
    );

    Trip {
        id: raw.id.as_ref().and_then(id_string),
        title: raw.title.unwrap_or_else(|| "Untitled trip".into()),
        slug: raw.slug,
        country: raw.country,
        start_date: raw.start_date.as_deref().and_then(parse_date),
        end_date: raw.end_date.as_deref().and_then(parse_date),
        steps,
    }
}

/// Convert one raw block. `position` is only used for diagnostics and
/// fallback names.
pub fn normalize_step(raw: RawStep, position: usize) -> ItineraryStep {
    let kind = match raw.block_type.as_deref() {
        Some("fullDay") => StepKind::FullDay {
            duration: raw.duration.clone(),
            accommodation: raw.accommodation.clone(),
            transportation: raw.transportation.clone(),
        },
        // `point` is the pre-waypoint name of the same block.
        Some("waypoint") | Some("point") | None => StepKind::Waypoint {
            connection: connection_type(raw.connection_type.as_deref(), position),
        },
        Some(other) => {
            warn!(position, block_type = other, "unknown block type, keeping as a route waypoint");
            StepKind::Waypoint {
                connection: ConnectionType::Route,
            }
        }
    };

    let name = raw
        .location_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Step {}", position + 1));

    let location = resolver::resolve(&raw);
    match location {
        None => debug!(
            position,
            name = %name,
            "no resolvable coordinate, step will render as a list-only item"
        ),
        Some(coord) if !coord.in_range() => warn!(
            position,
            name = %name,
            %coord,
            "coordinate outside valid lat/lng range, keeping as-is"
        ),
        Some(_) => {}
    }

    let id = match raw.id.as_ref().and_then(id_string) {
        Some(id) => StepId(id),
        None => {
            let id = StepId::generate();
            debug!(position, %id, "block has no id, assigned one");
            id
        }
    };

    let gallery = raw
        .gallery_items()
        .into_iter()
        .filter_map(|item| {
            item.media.map(|media| GalleryItem {
                media,
                caption: item.caption.filter(|c| !c.is_empty()),
            })
        })
        .collect();

    ItineraryStep {
        id,
        name,
        description: raw.description.filter(|d| !d.trim().is_empty()),
        location,
        gallery,
        activities: raw.activities.filter(|a| !a.is_null()),
        region: raw.region,
        kind,
    }
}

fn connection_type(raw: Option<&str>, position: usize) -> ConnectionType {
    match raw {
        Some("side_trip") => ConnectionType::SideTrip,
        Some("route") | None => ConnectionType::Route,
        Some(other) => {
            warn!(position, connection_type = other, "unknown connection type, treating as route");
            ConnectionType::Route
        }
    }
}

/// CMS date fields are either plain dates or full ISO timestamps.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
        .or_else(|| {
            warn!(value = s, "unparsable trip date, ignoring");
            None
        })
}
