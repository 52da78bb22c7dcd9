use serde::{Deserialize, Serialize};

use crate::bounds::{GeoBounds, LatLng};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoiKind {
    Rectangle,
    Polygon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Fewer points than the closed-ring minimum for the shape kind.
    TooFewPoints { got: usize, min: usize },
}

impl std::fmt::Display for RingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RingError::TooFewPoints { got, min } => {
                write!(f, "ring needs at least {min} points, got {got}")
            }
        }
    }
}

impl std::error::Error for RingError {}

/// A closed area-of-interest ring (first point equals last).
///
/// Rectangles carry 5 points (4 corners + closure); polygons need at least 4
/// (triangle + closure). Construction closes an open ring rather than
/// rejecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoiRing {
    kind: AoiKind,
    points: Vec<LatLng>,
}

impl AoiRing {
    /// Builds the closed 5-point ring of a drawn rectangle.
    pub fn rectangle(bounds: GeoBounds) -> Self {
        let points = vec![
            LatLng::new(bounds.south, bounds.west),
            LatLng::new(bounds.south, bounds.east),
            LatLng::new(bounds.north, bounds.east),
            LatLng::new(bounds.north, bounds.west),
            LatLng::new(bounds.south, bounds.west),
        ];
        Self {
            kind: AoiKind::Rectangle,
            points,
        }
    }

    /// Builds a closed polygon ring from drawn vertices.
    pub fn polygon(mut points: Vec<LatLng>) -> Result<Self, RingError> {
        if points.first() != points.last() && !points.is_empty() {
            points.push(points[0]);
        }
        if points.len() < 4 {
            return Err(RingError::TooFewPoints {
                got: points.len(),
                min: 4,
            });
        }
        Ok(Self {
            kind: AoiKind::Polygon,
            points,
        })
    }

    pub fn kind(&self) -> AoiKind {
        self.kind
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Vertex count excluding the closing point.
    pub fn vertex_count(&self) -> usize {
        self.points.len() - 1
    }

    pub fn bounding_box(&self) -> GeoBounds {
        let mut north = f64::NEG_INFINITY;
        let mut south = f64::INFINITY;
        let mut east = f64::NEG_INFINITY;
        let mut west = f64::INFINITY;
        for p in &self.points {
            north = north.max(p.lat);
            south = south.min(p.lat);
            east = east.max(p.lng);
            west = west.min(p.lng);
        }
        GeoBounds::new(north, south, east, west)
    }
}

#[cfg(test)]
mod tests {
    use super::{AoiKind, AoiRing, RingError};
    use crate::bounds::{GeoBounds, LatLng};

    #[test]
    fn rectangle_ring_is_closed_with_five_points() {
        let r = AoiRing::rectangle(GeoBounds::new(2.0, 0.0, 3.0, 1.0));
        assert_eq!(r.kind(), AoiKind::Rectangle);
        assert_eq!(r.points().len(), 5);
        assert_eq!(r.points().first(), r.points().last());
        assert_eq!(r.vertex_count(), 4);
    }

    #[test]
    fn open_polygon_is_closed_on_construction() {
        let r = AoiRing::polygon(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 0.5),
        ])
        .unwrap();
        assert_eq!(r.points().len(), 4);
        assert_eq!(r.points().first(), r.points().last());
    }

    #[test]
    fn two_points_are_rejected() {
        let err = AoiRing::polygon(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]).unwrap_err();
        assert_eq!(err, RingError::TooFewPoints { got: 3, min: 4 });
    }

    #[test]
    fn bounding_box_covers_all_vertices() {
        let r = AoiRing::polygon(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(2.0, 5.0),
            LatLng::new(-1.0, 3.0),
            LatLng::new(1.0, -2.0),
        ])
        .unwrap();
        let b = r.bounding_box();
        assert_eq!(b.north, 2.0);
        assert_eq!(b.south, -1.0);
        assert_eq!(b.east, 5.0);
        assert_eq!(b.west, -2.0);
    }
}
