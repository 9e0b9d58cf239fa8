//! Serializable map model, emitted as a GeoJSON `FeatureCollection`.
//!
//! Layers: one `Point` per marker (with popup), the main route as a
//! `LineString`, one dashed `LineString` per side-trip connector, and a
//! `Point` per route segment that has a known transport method.

use serde::Serialize;
use tracing::{info, instrument};

use waymark_shared::{AppConfig, CameraConfig, TileSource, Trip};

use crate::camera::{InitialView, initial_view};
use crate::markers::project_markers;
use crate::popup::{Popup, popup_for};
use crate::route::build_route;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum Properties {
    Marker {
        index: usize,
        step_id: String,
        popup: Popup,
    },
    Route {
        dashed: bool,
    },
    SideTrip {
        dashed: bool,
        anchor_index: usize,
        side_trip_index: usize,
    },
    Transport {
        from_index: usize,
        to_index: usize,
        mode: &'static str,
        icon: String,
        distance_km: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            kind: "Feature",
            geometry,
            properties,
        }
    }
}

/// A step that could not be placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedStep {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMetadata {
    pub title: String,
    pub step_count: usize,
    pub marker_count: usize,
    pub unmapped: Vec<UnmappedStep>,
    pub total_distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_view: Option<InitialView>,
    pub tiles: TileSource,
}

/// The whole map for one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapModel {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
    pub metadata: MapMetadata,
}

impl MapModel {
    #[instrument(skip_all, fields(trip = %trip.title))]
    pub fn build(trip: &Trip, config: &AppConfig, tiles: TileSource) -> Self {
        let markers = project_markers(&trip.steps);
        let route = build_route(&markers);
        let country = trip.country_name();

        let mut features = Vec::with_capacity(markers.len() + route.connectors.len() + 1);

        for marker in &markers {
            features.push(Feature::new(
                Geometry::Point {
                    coordinates: marker.coord.lng_lat(),
                },
                Properties::Marker {
                    index: marker.index,
                    step_id: marker.step.id.to_string(),
                    popup: popup_for(marker.step, country, config.popup.excerpt_chars),
                },
            ));
        }

        if route.line.len() >= 2 {
            features.push(Feature::new(
                Geometry::LineString {
                    coordinates: route.line.iter().map(|c| c.lng_lat()).collect(),
                },
                Properties::Route { dashed: false },
            ));
        }

        for connector in &route.connectors {
            features.push(Feature::new(
                Geometry::LineString {
                    coordinates: vec![connector.from.lng_lat(), connector.to.lng_lat()],
                },
                Properties::SideTrip {
                    dashed: true,
                    anchor_index: connector.anchor_index,
                    side_trip_index: connector.side_trip_index,
                },
            ));
        }

        for segment in &route.segments {
            if let Some(mode) = segment.transport {
                features.push(Feature::new(
                    Geometry::Point {
                        coordinates: segment.midpoint.lng_lat(),
                    },
                    Properties::Transport {
                        from_index: segment.from_index,
                        to_index: segment.to_index,
                        mode: mode.label(),
                        icon: mode.glyph().to_string(),
                        distance_km: segment.distance_km,
                    },
                ));
            }
        }

        let unmapped: Vec<UnmappedStep> = trip
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.location.is_none())
            .map(|(index, s)| UnmappedStep {
                index,
                name: s.name.clone(),
            })
            .collect();

        let metadata = MapMetadata {
            title: trip.title.clone(),
            step_count: trip.steps.len(),
            marker_count: markers.len(),
            unmapped,
            total_distance_km: route.total_distance_km(),
            initial_view: initial_view(&markers, &CameraConfig::from(config)),
            tiles,
        };

        info!(
            markers = metadata.marker_count,
            unmapped = metadata.unmapped.len(),
            features = features.len(),
            "map model built"
        );

        Self {
            kind: "FeatureCollection",
            features,
            metadata,
        }
    }

    /// Features of one layer, e.g. `"marker"` or `"side_trip"`.
    pub fn layer(&self, name: &str) -> impl Iterator<Item = &Feature> {
        let name = name.to_owned();
        self.features
            .iter()
            .filter(move |f| layer_name(&f.properties) == name)
    }
}

fn layer_name(properties: &Properties) -> &'static str {
    match properties {
        Properties::Marker { .. } => "marker",
        Properties::Route { .. } => "route",
        Properties::SideTrip { .. } => "side_trip",
        Properties::Transport { .. } => "transport",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::test_support::*;
    use waymark_shared::TransportMethod;

    fn trip(steps: Vec<waymark_shared::ItineraryStep>) -> Trip {
        Trip {
            id: None,
            title: "Test trip".into(),
            slug: None,
            country: None,
            start_date: None,
            end_date: None,
            steps,
        }
    }

    fn osm() -> TileSource {
        TileSource::OpenStreetMap {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
        }
    }

    #[test]
    fn five_steps_one_missing() {
        let trip = trip(vec![
            full_day("a", Some((42.87, 74.57))),
            waypoint("b", Some((42.65, 77.08))),
            full_day("c", None),
            waypoint("d", Some((42.35, 78.23))),
            arriving_by(full_day("e", Some((41.83, 75.12))), TransportMethod::Car),
        ]);
        let model = MapModel::build(&trip, &AppConfig::default(), osm());

        assert_eq!(model.layer("marker").count(), 4);
        let route: Vec<_> = model.layer("route").collect();
        assert_eq!(route.len(), 1);
        match &route[0].geometry {
            Geometry::LineString { coordinates } => assert_eq!(coordinates.len() - 1, 3),
            other => panic!("expected line, got {other:?}"),
        }
        assert_eq!(model.layer("transport").count(), 1);
        assert_eq!(model.metadata.unmapped, vec![UnmappedStep { index: 2, name: "c".into() }]);
    }

    #[test]
    fn geojson_shape() {
        let trip = trip(vec![
            full_day("a", Some((1.0, 2.0))),
            side_trip("b", Some((3.0, 4.0))),
        ]);
        let model = MapModel::build(&trip, &AppConfig::default(), osm());
        let json = serde_json::to_value(&model).expect("serialize");

        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 2.0);
        assert_eq!(json["features"][0]["properties"]["layer"], "marker");
        assert_eq!(json["features"][0]["properties"]["popup"]["badge"], "Full day");
        // Single route point: no main line, one dashed connector.
        assert_eq!(json["features"][2]["properties"]["layer"], "side_trip");
        assert_eq!(json["features"][2]["properties"]["dashed"], true);
        assert_eq!(json["metadata"]["tiles"]["provider"], "openstreetmap");
    }

    #[test]
    fn empty_trip_has_no_features() {
        let model = MapModel::build(&trip(vec![]), &AppConfig::default(), osm());
        assert!(model.features.is_empty());
        assert!(model.metadata.initial_view.is_none());
    }
}
