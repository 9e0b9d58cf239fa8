//! Small geographic helpers: bounds, midpoints, great-circle distance.

use serde::Serialize;

use waymark_shared::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    /// Smallest box containing every coordinate. `None` for an empty input.
    pub fn enclosing<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for c in iter {
            bounds.south_west.lat = bounds.south_west.lat.min(c.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(c.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(c.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(c.lng);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Coordinate {
        midpoint(self.south_west, self.north_east)
    }

    /// Width and height in degrees.
    pub fn span(&self) -> (f64, f64) {
        (
            self.north_east.lng - self.south_west.lng,
            self.north_east.lat - self.south_west.lat,
        )
    }
}

/// Arithmetic mean of two positions; adequate for the short segments of an
/// itinerary, where icon placement only needs to look centered.
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    Coordinate {
        lat: (a.lat + b.lat) / 2.0,
        lng: (a.lng + b.lng) / 2.0,
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_enclose_all_points() {
        let bounds = Bounds::enclosing([
            Coordinate::new(42.87, 74.57),
            Coordinate::new(41.83, 75.12),
            Coordinate::new(42.65, 77.08),
        ])
        .expect("bounds");
        assert_eq!(bounds.south_west, Coordinate::new(41.83, 74.57));
        assert_eq!(bounds.north_east, Coordinate::new(42.87, 77.08));
    }

    #[test]
    fn empty_bounds_is_none() {
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn midpoint_is_mean() {
        let m = midpoint(Coordinate::new(40.0, 70.0), Coordinate::new(42.0, 74.0));
        assert_eq!(m, Coordinate::new(41.0, 72.0));
    }

    #[test]
    fn haversine_known_distance() {
        // Bishkek → Karakol is roughly 300 km as the crow flies.
        let d = haversine_km(Coordinate::new(42.8746, 74.5698), Coordinate::new(42.4907, 78.3936));
        assert!((300.0..330.0).contains(&d), "got {d}");
        assert_eq!(haversine_km(Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)), 0.0);
    }
}
