//! Fixture trip → ingestion → markers, route, map model and controllers.

use std::path::Path;
use std::time::{Duration, Instant};

use waymark_core::camera::{CameraController, CameraMove, FocusOutcome, RecordingMap};
use waymark_core::map_model::MapModel;
use waymark_core::scroll_spy::{ElementRect, ScrollSpy, Viewport};
use waymark_core::{build_route, project_markers};
use waymark_shared::{AppConfig, CameraConfig, Coordinate, ScrollSpyConfig, TileSource, Trip};

fn fixture() -> Trip {
    waymark_ingest::load_trip(Path::new("../../../fixtures/json/trip.fixture.json"))
        .expect("load fixture trip")
}

#[test]
fn fixture_markers_skip_unlocated_step() {
    let trip = fixture();
    let markers = project_markers(&trip.steps);

    let indices: Vec<usize> = markers.iter().map(|m| m.index).collect();
    // Karakol (index 4) has no GPS fix.
    assert_eq!(indices, [0, 1, 2, 3, 5, 6]);
    // Jeti-Oguz was stored as a string pair.
    assert_eq!(markers[3].coord, Coordinate::new(42.354, 78.232));
}

#[test]
fn fixture_route_layout() {
    let trip = fixture();
    let markers = project_markers(&trip.steps);
    let route = build_route(&markers);

    // Bishkek → Cholpon-Ata → Jeti-Oguz → Song-Kul.
    assert_eq!(route.line.len(), 4);
    assert_eq!(route.segments.len(), 3);

    let anchors: Vec<(usize, usize)> = route
        .connectors
        .iter()
        .map(|c| (c.side_trip_index, c.anchor_index))
        .collect();
    // Burana hangs off Bishkek. Altyn-Arashan hangs off Cholpon-Ata: Karakol
    // is not on the map and Jeti-Oguz is a waypoint.
    assert_eq!(anchors, [(1, 0), (5, 2)]);
}

#[test]
fn fixture_map_model() {
    let trip = fixture();
    let tiles = TileSource::OpenStreetMap {
        url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
    };
    let model = MapModel::build(&trip, &AppConfig::default(), tiles);

    assert_eq!(model.layer("marker").count(), 6);
    assert_eq!(model.layer("route").count(), 1);
    assert_eq!(model.layer("side_trip").count(), 2);
    // Cholpon-Ata arrives by car, Song-Kul by car; Jeti-Oguz leg inherits
    // Cholpon-Ata's departure by car.
    assert_eq!(model.layer("transport").count(), 3);
    assert_eq!(model.metadata.unmapped.len(), 1);
    assert_eq!(model.metadata.unmapped[0].name, "Karakol");

    let json = serde_json::to_value(&model).expect("serialize");
    let popup = &json["features"][0]["properties"]["popup"];
    assert_eq!(popup["title"], "Bishkek");
    assert_eq!(popup["region"], "Kyrgyzstan");
    assert_eq!(popup["duration"], "2 nights");
    assert_eq!(popup["photo_count"], 1);
}

#[test]
fn scroll_and_click_drive_the_camera() {
    let trip = fixture();
    let markers = project_markers(&trip.steps);
    let mut spy = ScrollSpy::new(trip.steps.len(), ScrollSpyConfig::default());
    let mut camera = CameraController::new(RecordingMap::default(), CameraConfig::default());
    let t0 = Instant::now();

    camera.place_initial(&markers);

    // User scrolls to the Karakol card: active changes, camera has nowhere to go.
    let viewport = Viewport {
        scroll_y: 1400.0,
        height: 900.0,
    };
    let visible = [
        ElementRect {
            index: 3,
            top: -100.0,
            height: 300.0,
        },
        ElementRect {
            index: 4,
            top: 300.0,
            height: 320.0,
        },
    ];
    assert_eq!(spy.observe(&visible, viewport, t0), Some(4));
    assert_eq!(camera.focus(spy.active(), &markers, t0), FocusOutcome::NoMarker);

    // Clicking Song-Kul pins it and moves the camera.
    let t1 = t0 + Duration::from_millis(300);
    let request = spy.click(6, t1).expect("scroll request");
    assert_eq!(request.index, 6);
    assert_eq!(camera.focus(spy.active(), &markers, t1), FocusOutcome::Moved);

    // Smooth scroll passes over Altyn-Arashan while pinned: ignored.
    let passing = [ElementRect {
        index: 5,
        top: 300.0,
        height: 300.0,
    }];
    let t2 = t1 + Duration::from_millis(400);
    assert_eq!(spy.observe(&passing, viewport, t2), None);
    assert_eq!(spy.active(), Some(6));

    let moves = camera.into_map().moves;
    assert_eq!(moves.len(), 2);
    assert!(matches!(moves[0], CameraMove::FitBounds { .. }));
    assert_eq!(
        moves[1],
        CameraMove::FlyTo {
            center: Coordinate::new(41.831, 75.1234),
            zoom: 10.0
        }
    );
}

#[test]
fn fixture_event_script_replay() {
    let trip = fixture();
    let script = std::fs::read_to_string("../../../fixtures/json/events.fixture.json")
        .expect("read event fixture");
    let script = waymark_core::replay::parse_script(&script).expect("parse event fixture");

    let report = waymark_core::replay::replay(
        &trip,
        &script,
        ScrollSpyConfig::default(),
        CameraConfig::default(),
    );

    let active: Vec<_> = report.entries.iter().map(|e| e.active).collect();
    assert_eq!(
        active,
        [Some(0), Some(2), Some(3), Some(6), Some(6), Some(5), Some(5)]
    );
    // Jeti-Oguz became active 50ms after the previous flight.
    assert_eq!(report.entries[2].camera, Some(FocusOutcome::Throttled));
    assert_eq!(report.entries[3].scroll_to, Some(6));
    assert!(report.entries[4].pinned);
    assert!(!report.entries[5].pinned);
    assert_eq!(report.fly_count(), 4);
    assert!(matches!(report.camera_moves[0], CameraMove::FitBounds { .. }));
}
