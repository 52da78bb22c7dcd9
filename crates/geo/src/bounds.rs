use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Rectangular geographic bounds in degrees.
///
/// Invariants (enforced by `new`):
/// - `north >= south`
/// - `east >= west` after unwrapping an antimeridian crossing (east += 360).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        let (north, south) = if north >= south {
            (north, south)
        } else {
            (south, north)
        };
        // Antimeridian crossing: unwrap east so spans stay positive.
        let east = if east < west { east + 360.0 } else { east };
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    /// Rectangle area in square degrees.
    pub fn area_deg2(&self) -> f64 {
        self.lat_span() * self.lng_span()
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat <= self.north && p.lat >= self.south && p.lng <= self.east && p.lng >= self.west
    }

    /// Movement fractions relative to `self`'s spans.
    ///
    /// The latitude fraction is `(|Δnorth| + |Δsouth|) / lat_span`, and
    /// symmetrically for longitude. Degenerate (zero-span) bounds report the
    /// raw edge movement so any drift still registers as change.
    pub fn drift_fraction(&self, old: &GeoBounds) -> (f64, f64) {
        let lat_drift = (self.north - old.north).abs() + (self.south - old.south).abs();
        let lng_drift = (self.east - old.east).abs() + (self.west - old.west).abs();

        let lat_span = self.lat_span();
        let lng_span = self.lng_span();

        let lat = if lat_span > 0.0 {
            lat_drift / lat_span
        } else {
            lat_drift
        };
        let lng = if lng_span > 0.0 {
            lng_drift / lng_span
        } else {
            lng_drift
        };
        (lat, lng)
    }
}

/// The visible map rectangle plus its zoom level.
///
/// Immutable value: every map move/zoom event produces a fresh `Viewport`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: GeoBounds,
    pub zoom: u8,
}

impl Viewport {
    pub fn new(bounds: GeoBounds, zoom: u8) -> Self {
        Self { bounds, zoom }
    }

    pub fn area_deg2(&self) -> f64 {
        self.bounds.area_deg2()
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, LatLng, Viewport};

    #[test]
    fn new_orders_north_south() {
        let b = GeoBounds::new(10.0, 20.0, 30.0, 25.0);
        assert_eq!(b.north, 20.0);
        assert_eq!(b.south, 10.0);
    }

    #[test]
    fn antimeridian_is_unwrapped() {
        // A viewport straddling 180°: west=170, east=-170.
        let b = GeoBounds::new(10.0, 0.0, -170.0, 170.0);
        assert_eq!(b.east, 190.0);
        assert_eq!(b.lng_span(), 20.0);
        assert!(b.area_deg2() > 0.0);
    }

    #[test]
    fn area_is_span_product() {
        let b = GeoBounds::new(30.0, 10.0, 80.0, 70.0);
        assert_eq!(b.area_deg2(), 20.0 * 10.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let b = GeoBounds::new(30.0, 10.0, 80.0, 70.0);
        assert!(b.contains(LatLng::new(10.0, 70.0)));
        assert!(b.contains(b.center()));
        assert!(!b.contains(LatLng::new(31.0, 75.0)));
    }

    #[test]
    fn drift_fraction_sums_edge_movement() {
        let old = GeoBounds::new(20.0, 10.0, 80.0, 70.0);
        // Panned north by 3 degrees: both lat edges moved by 3, span is 10.
        let new = GeoBounds::new(23.0, 13.0, 80.0, 70.0);
        let (lat, lng) = new.drift_fraction(&old);
        assert!((lat - 0.6).abs() < 1e-12);
        assert_eq!(lng, 0.0);
    }

    #[test]
    fn identical_bounds_have_zero_drift() {
        let b = GeoBounds::new(20.0, 10.0, 80.0, 70.0);
        let v = Viewport::new(b, 9);
        let (lat, lng) = v.bounds.drift_fraction(&b);
        assert_eq!((lat, lng), (0.0, 0.0));
    }
}
