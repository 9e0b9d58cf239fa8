//! Core domain types for Waymark trips and itineraries.
//!
//! These are the canonical, already-normalized shapes. Raw CMS records are
//! converted into them once, at the ingestion boundary (`waymark-ingest`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether the position lies within lat ∈ [-90, 90], lng ∈ [-180, 180].
    ///
    /// Resolution never rejects out-of-range values; callers use this for
    /// diagnostics only.
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// GeoJSON ordering: `[lng, lat]`.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// StepId
// ---------------------------------------------------------------------------

/// Stable per-step identifier, used as a rendering key.
///
/// CMS records carry their own id; steps without one get a UUID v7 at
/// ingestion time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub String);

impl StepId {
    /// Generate a new time-sortable step identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// References to other CMS collections
// ---------------------------------------------------------------------------

/// A relationship field: either a bare id or the populated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    NumericId(i64),
    Populated(T),
}

impl<T> Reference<T> {
    /// The populated document, if the relationship was resolved.
    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Populated(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Entry of the Media collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Entry of the Accommodations collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub name: String,
    /// Hotel, hostel, yurt camp, ...
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Entry of the Countries collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// One photo in a step's gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub media: Reference<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

// ---------------------------------------------------------------------------
// Transportation
// ---------------------------------------------------------------------------

/// How a traveller arrived at or left a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMethod {
    #[serde(alias = "flight", alias = "airplane")]
    Plane,
    Train,
    Bus,
    #[serde(alias = "taxi", alias = "shared_taxi")]
    Car,
    #[serde(alias = "ferry")]
    Boat,
    #[serde(alias = "hike", alias = "foot")]
    Walk,
    #[serde(alias = "bicycle")]
    Bike,
    #[serde(other)]
    Other,
}

impl TransportMethod {
    /// Single-character glyph drawn at route segment midpoints.
    pub fn glyph(self) -> char {
        match self {
            Self::Plane => '✈',
            Self::Train => '🚆',
            Self::Bus => '🚌',
            Self::Car => '🚗',
            Self::Boat => '⛴',
            Self::Walk => '🚶',
            Self::Bike => '🚲',
            Self::Other => '•',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Train => "train",
            Self::Bus => "bus",
            Self::Car => "car",
            Self::Boat => "boat",
            Self::Walk => "walk",
            Self::Bike => "bike",
            Self::Other => "other",
        }
    }
}

/// Transportation metadata attached to a full-day step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_method: Option<TransportMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_method: Option<TransportMethod>,
    /// Free-text travel time, e.g. `"6h"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<String>,
}

// ---------------------------------------------------------------------------
// ItineraryStep
// ---------------------------------------------------------------------------

/// Whether a waypoint lies on the main route or is a detour from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Route,
    SideTrip,
}

/// Kind-specific payload of an itinerary step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType", rename_all = "camelCase")]
pub enum StepKind {
    /// An overnight stop.
    FullDay {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accommodation: Option<Reference<Accommodation>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transportation: Option<Transportation>,
    },
    /// A shorter stop along the way, or a side trip.
    Waypoint {
        #[serde(default, rename = "connectionType")]
        connection: ConnectionType,
    },
}

/// One stop of a trip, with its coordinate already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryStep {
    pub id: StepId,
    #[serde(rename = "locationName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryItem>,
    /// Rich-text blob, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl ItineraryStep {
    pub fn is_side_trip(&self) -> bool {
        matches!(
            self.kind,
            StepKind::Waypoint {
                connection: ConnectionType::SideTrip
            }
        )
    }

    pub fn is_full_day(&self) -> bool {
        matches!(self.kind, StepKind::FullDay { .. })
    }

    pub fn transportation(&self) -> Option<&Transportation> {
        match &self.kind {
            StepKind::FullDay { transportation, .. } => transportation.as_ref(),
            StepKind::Waypoint { .. } => None,
        }
    }

    /// Duration label of a full-day step.
    pub fn duration(&self) -> Option<&str> {
        match &self.kind {
            StepKind::FullDay { duration, .. } => duration.as_deref(),
            StepKind::Waypoint { .. } => None,
        }
    }

    /// Short type label shown in popups and lists.
    pub fn badge(&self) -> &'static str {
        match self.kind {
            StepKind::FullDay { .. } => "Full day",
            StepKind::Waypoint {
                connection: ConnectionType::Route,
            } => "Waypoint",
            StepKind::Waypoint {
                connection: ConnectionType::SideTrip,
            } => "Side trip",
        }
    }
}

// ---------------------------------------------------------------------------
// Trip
// ---------------------------------------------------------------------------

/// A published trip with its ordered itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Reference<Country>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "itinerary")]
    pub steps: Vec<ItineraryStep>,
}

impl Trip {
    /// Country name, when the relationship was populated.
    pub fn country_name(&self) -> Option<&str> {
        self.country
            .as_ref()
            .and_then(Reference::populated)
            .map(|c| c.name.as_str())
    }

    /// Inclusive number of days between start and end date.
    pub fn day_count(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoint(connection: ConnectionType) -> ItineraryStep {
        ItineraryStep {
            id: StepId::generate(),
            name: "Song-Kul".into(),
            description: None,
            location: Some(Coordinate::new(41.83, 75.12)),
            gallery: vec![],
            activities: None,
            region: None,
            kind: StepKind::Waypoint { connection },
        }
    }

    #[test]
    fn coordinate_range_check() {
        assert!(Coordinate::new(42.9, 69.5).in_range());
        assert!(!Coordinate::new(95.0, 10.0).in_range());
        assert!(!Coordinate::new(10.0, -181.0).in_range());
    }

    #[test]
    fn step_ids_are_unique() {
        assert_ne!(StepId::generate(), StepId::generate());
    }

    #[test]
    fn badge_reflects_kind() {
        assert_eq!(waypoint(ConnectionType::Route).badge(), "Waypoint");
        assert_eq!(waypoint(ConnectionType::SideTrip).badge(), "Side trip");
        assert!(waypoint(ConnectionType::SideTrip).is_side_trip());
        assert!(!waypoint(ConnectionType::Route).is_full_day());
    }

    #[test]
    fn transport_method_aliases() {
        let m: TransportMethod = serde_json::from_str("\"flight\"").expect("parse");
        assert_eq!(m, TransportMethod::Plane);
        let m: TransportMethod = serde_json::from_str("\"marshrutka\"").expect("parse");
        assert_eq!(m, TransportMethod::Other);
    }

    #[test]
    fn reference_accepts_id_or_document() {
        let r: Reference<Country> = serde_json::from_str("\"64f1\"").expect("id");
        assert!(r.populated().is_none());
        let r: Reference<Country> = serde_json::from_str("7").expect("numeric id");
        assert_eq!(r, Reference::NumericId(7));
        let r: Reference<Country> =
            serde_json::from_str(r#"{"name":"Kyrgyzstan","code":"KG"}"#).expect("doc");
        assert_eq!(r.populated().map(|c| c.name.as_str()), Some("Kyrgyzstan"));
    }

    #[test]
    fn canonical_step_serialization() {
        let step = ItineraryStep {
            kind: StepKind::FullDay {
                duration: Some("2 nights".into()),
                accommodation: None,
                transportation: Some(Transportation {
                    arrival_method: Some(TransportMethod::Bus),
                    ..Default::default()
                }),
            },
            ..waypoint(ConnectionType::Route)
        };

        let json = serde_json::to_value(&step).expect("serialize");
        assert_eq!(json["blockType"], "fullDay");
        assert_eq!(json["locationName"], "Song-Kul");
        assert_eq!(json["transportation"]["arrivalMethod"], "bus");

        let parsed: ItineraryStep = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, step);
    }

    #[test]
    fn trip_day_count() {
        let trip = Trip {
            id: None,
            title: "Kyrgyzstan 2024".into(),
            slug: None,
            country: None,
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 14),
            steps: vec![],
        };
        assert_eq!(trip.day_count(), Some(14));
    }
}
