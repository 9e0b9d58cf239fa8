//! Coordinate resolution across the legacy shapes a step may use.
//!
//! Shapes are tried most-current first:
//! 1. `location: {"type": "Point", "coordinates": [lng, lat]}`
//! 2. `location: [lng, lat]`
//! 3. `location: {"lng": .., "lat": ..}`
//! 4. top-level `lng` / `lat` fields
//!
//! Each component may be a JSON number or a numeric string. The first
//! candidate whose two components both parse to finite numbers wins.

use serde_json::Value;
use tracing::trace;

use waymark_shared::Coordinate;

use crate::raw::RawStep;

/// Which syntactic shape a candidate was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateShape {
    /// GeoJSON-style point object.
    Point,
    /// Bare two-element `[lng, lat]` array.
    Pair,
    /// Object with named `lng` / `lat` keys.
    Named,
    /// Separate top-level `lng` / `lat` fields.
    Scalars,
}

/// An unparsed `(lng, lat)` pair found in a record.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub shape: CoordinateShape,
    pub lng: &'a Value,
    pub lat: &'a Value,
}

impl Candidate<'_> {
    /// Coerce both components; `None` unless both are finite numbers.
    pub fn parse(&self) -> Option<Coordinate> {
        let lng = coerce(self.lng)?;
        let lat = coerce(self.lat)?;
        Some(Coordinate { lat, lng })
    }
}

/// List every syntactically present candidate, most specific first.
pub fn candidates(step: &RawStep) -> Vec<Candidate<'_>> {
    let mut out = Vec::with_capacity(2);

    match &step.location {
        Some(Value::Object(obj)) => {
            if let Some(Value::Array(coords)) = obj.get("coordinates") {
                // GeoJSON positions may carry a third (altitude) element.
                if coords.len() >= 2 {
                    out.push(Candidate {
                        shape: CoordinateShape::Point,
                        lng: &coords[0],
                        lat: &coords[1],
                    });
                }
            }
            if let (Some(lng), Some(lat)) = (obj.get("lng"), obj.get("lat")) {
                out.push(Candidate {
                    shape: CoordinateShape::Named,
                    lng,
                    lat,
                });
            }
        }
        Some(Value::Array(pair)) if pair.len() == 2 => out.push(Candidate {
            shape: CoordinateShape::Pair,
            lng: &pair[0],
            lat: &pair[1],
        }),
        _ => {}
    }

    if let (Some(lng), Some(lat)) = (&step.lng, &step.lat) {
        out.push(Candidate {
            shape: CoordinateShape::Scalars,
            lng,
            lat,
        });
    }

    out
}

/// Resolve a step's coordinate, or `None` when no candidate parses.
pub fn resolve(step: &RawStep) -> Option<Coordinate> {
    candidates(step).into_iter().find_map(|candidate| {
        let parsed = candidate.parse();
        if parsed.is_none() {
            trace!(shape = ?candidate.shape, "coordinate candidate did not parse");
        }
        parsed
    })
}

/// Numeric coercion: numbers pass through, strings use decimal parsing.
/// Non-finite results count as unparsed, never as zero.
pub fn coerce(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}
