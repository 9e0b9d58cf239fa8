//! Raw CMS record shapes, as they arrive from the content store.
//!
//! Everything is optional and loosely typed here; [`crate::normalize_step`]
//! turns these into canonical [`waymark_shared::ItineraryStep`]s. A field
//! whose value has the wrong shape (a rich-text object where a string was
//! expected, an accommodation without a name) decodes as `None` instead of
//! failing the whole block.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use waymark_shared::{Accommodation, Country, Media, Reference, Transportation};

/// An itinerary block as stored by the CMS.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    /// String or numeric id, depending on the database adapter.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub block_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location_name: Option<String>,
    /// Plain text only; rich-text trees are dropped.
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    /// Point object, bare `[lng, lat]` array or `{lng, lat}` object.
    #[serde(default)]
    pub location: Option<Value>,
    /// Legacy top-level longitude.
    #[serde(default)]
    pub lng: Option<Value>,
    /// Legacy top-level latitude.
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub activities: Option<Value>,
    /// Rows are decoded one by one in [`RawStep::gallery_items`].
    #[serde(default, deserialize_with = "lenient")]
    pub gallery: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub accommodation: Option<Reference<Accommodation>>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub transportation: Option<Transportation>,
    #[serde(default, deserialize_with = "lenient")]
    pub connection_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub region: Option<String>,
}

impl RawStep {
    /// Gallery rows that decode; malformed rows are dropped individually.
    pub fn gallery_items(&self) -> Vec<RawGalleryItem> {
        self.gallery
            .iter()
            .flatten()
            .filter_map(|row| match serde_json::from_value(row.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(error = %e, "malformed gallery row, dropping");
                    None
                }
            })
            .collect()
    }
}

/// Gallery row; `media` is null when the upload was deleted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGalleryItem {
    #[serde(default, deserialize_with = "lenient")]
    pub media: Option<Reference<Media>>,
    #[serde(default, deserialize_with = "lenient")]
    pub caption: Option<String>,
}

/// A Trips collection document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrip {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<Reference<Country>>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_date: Option<String>,
    /// Kept as raw values so one malformed block does not sink the trip.
    #[serde(default, deserialize_with = "lenient")]
    pub itinerary: Option<Vec<Value>>,
}

/// Decode a field as `T`, or `None` when the stored value has another shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            debug!(
                expected = std::any::type_name::<T>(),
                error = %e,
                "field has an unexpected shape, ignoring"
            );
            Ok(None)
        }
    }
}

/// Render a string-or-number id as a string.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
