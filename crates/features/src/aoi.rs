use geo::{AoiKind, AoiRing, GeoBounds, LatLng, RingError};
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AoiPhase {
    Idle,
    Drawing,
    Committed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AoiError {
    /// A drawing operation arrived outside the Drawing state.
    NotDrawing,
    /// The drawn shape cannot form a valid closed ring.
    InvalidShape(RingError),
    /// A rectangle needs two corner points before completion.
    RectangleNeedsTwoCorners { got: usize },
}

impl std::fmt::Display for AoiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AoiError::NotDrawing => write!(f, "no drawing in progress"),
            AoiError::InvalidShape(e) => write!(f, "invalid shape: {e}"),
            AoiError::RectangleNeedsTwoCorners { got } => {
                write!(f, "rectangle needs 2 corners, got {got}")
            }
        }
    }
}

impl std::error::Error for AoiError {}

/// Area-of-interest capture state machine: Idle → Drawing → Committed → Idle.
///
/// While Drawing, the AOI tool is the sole consumer of map clicks (the
/// orchestrator checks `is_drawing` before routing clicks to features). A
/// committed ring survives until a later completion replaces it or `clear`
/// releases it; clearing also obliges the caller to drop AOI-keyed analysis
/// results.
#[derive(Debug, Default)]
pub struct AoiCapture {
    drawing: Option<(AoiKind, Vec<LatLng>)>,
    committed: Option<AoiRing>,
}

impl AoiCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AoiPhase {
        if self.drawing.is_some() {
            AoiPhase::Drawing
        } else if self.committed.is_some() {
            AoiPhase::Committed
        } else {
            AoiPhase::Idle
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_some()
    }

    pub fn current(&self) -> Option<&AoiRing> {
        self.committed.as_ref()
    }

    /// Enters Drawing. Any in-progress shape is discarded; a committed ring
    /// is kept until the new shape completes.
    pub fn begin(&mut self, kind: AoiKind) {
        self.drawing = Some((kind, Vec::new()));
    }

    /// Adds one vertex (a map click) to the shape being drawn.
    pub fn add_point(&mut self, p: LatLng) -> Result<(), AoiError> {
        match self.drawing.as_mut() {
            Some((_, points)) => {
                points.push(p);
                Ok(())
            }
            None => Err(AoiError::NotDrawing),
        }
    }

    /// Completes the drawn shape, replacing any prior committed ring.
    pub fn complete(&mut self) -> Result<&AoiRing, AoiError> {
        let (kind, points) = self.drawing.take().ok_or(AoiError::NotDrawing)?;
        let ring = match kind {
            AoiKind::Rectangle => {
                if points.len() < 2 {
                    // Restore so the user can keep drawing.
                    let got = points.len();
                    self.drawing = Some((kind, points));
                    return Err(AoiError::RectangleNeedsTwoCorners { got });
                }
                let mut north = f64::NEG_INFINITY;
                let mut south = f64::INFINITY;
                let mut east = f64::NEG_INFINITY;
                let mut west = f64::INFINITY;
                for p in &points {
                    north = north.max(p.lat);
                    south = south.min(p.lat);
                    east = east.max(p.lng);
                    west = west.min(p.lng);
                }
                AoiRing::rectangle(GeoBounds::new(north, south, east, west))
            }
            AoiKind::Polygon => match AoiRing::polygon(points.clone()) {
                Ok(ring) => ring,
                Err(e) => {
                    self.drawing = Some((kind, points));
                    return Err(AoiError::InvalidShape(e));
                }
            },
        };
        Ok(self.committed.insert(ring))
    }

    /// Back to Idle; releases both the committed ring and any drawing.
    ///
    /// Returns true if a committed ring was released, which is the caller's
    /// signal to remove AOI-keyed analysis features.
    pub fn clear(&mut self) -> bool {
        self.drawing = None;
        self.committed.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{AoiCapture, AoiError, AoiPhase};
    use geo::{AoiKind, LatLng};

    #[test]
    fn idle_rejects_points() {
        let mut aoi = AoiCapture::new();
        assert_eq!(aoi.phase(), AoiPhase::Idle);
        assert_eq!(
            aoi.add_point(LatLng::new(0.0, 0.0)),
            Err(AoiError::NotDrawing)
        );
    }

    #[test]
    fn rectangle_completion_builds_closed_ring() {
        let mut aoi = AoiCapture::new();
        aoi.begin(AoiKind::Rectangle);
        aoi.add_point(LatLng::new(0.0, 0.0)).unwrap();
        aoi.add_point(LatLng::new(2.0, 3.0)).unwrap();
        let ring = aoi.complete().unwrap();
        assert_eq!(ring.points().len(), 5);
        assert_eq!(aoi.phase(), AoiPhase::Committed);
    }

    #[test]
    fn polygon_with_five_vertices_commits() {
        let mut aoi = AoiCapture::new();
        aoi.begin(AoiKind::Polygon);
        for p in [
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 2.0),
            LatLng::new(1.0, 3.0),
            LatLng::new(2.0, 2.0),
            LatLng::new(2.0, 0.0),
        ] {
            aoi.add_point(p).unwrap();
        }
        let ring = aoi.complete().unwrap();
        assert_eq!(ring.vertex_count(), 5);
    }

    #[test]
    fn incomplete_polygon_stays_in_drawing() {
        let mut aoi = AoiCapture::new();
        aoi.begin(AoiKind::Polygon);
        aoi.add_point(LatLng::new(0.0, 0.0)).unwrap();
        assert!(aoi.complete().is_err());
        assert_eq!(aoi.phase(), AoiPhase::Drawing);
        // The vertex is retained.
        aoi.add_point(LatLng::new(0.0, 1.0)).unwrap();
        aoi.add_point(LatLng::new(1.0, 0.5)).unwrap();
        assert!(aoi.complete().is_ok());
    }

    #[test]
    fn completion_replaces_prior_ring() {
        let mut aoi = AoiCapture::new();
        aoi.begin(AoiKind::Rectangle);
        aoi.add_point(LatLng::new(0.0, 0.0)).unwrap();
        aoi.add_point(LatLng::new(1.0, 1.0)).unwrap();
        aoi.complete().unwrap();
        let first = aoi.current().unwrap().clone();

        aoi.begin(AoiKind::Rectangle);
        // The prior ring is still visible while redrawing.
        assert!(aoi.current().is_some());
        aoi.add_point(LatLng::new(5.0, 5.0)).unwrap();
        aoi.add_point(LatLng::new(6.0, 7.0)).unwrap();
        aoi.complete().unwrap();
        assert_ne!(aoi.current().unwrap(), &first);
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut aoi = AoiCapture::new();
        aoi.begin(AoiKind::Rectangle);
        aoi.add_point(LatLng::new(0.0, 0.0)).unwrap();
        aoi.add_point(LatLng::new(1.0, 1.0)).unwrap();
        aoi.complete().unwrap();

        assert!(aoi.clear());
        assert_eq!(aoi.phase(), AoiPhase::Idle);
        assert!(!aoi.clear());
    }
}
