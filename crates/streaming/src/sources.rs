//! Fetch requests and completions at the I/O boundary.
//!
//! The core never performs network calls. It emits [`FetchRequest`] values
//! describing exactly what to fetch, and the host feeds back a
//! [`FetchOutcome`] per request. Every request carries its [`Seq`] so stale
//! completions can be recognized and dropped.

use features::ServiceType;
use geo::{AoiRing, GeoBounds, LatLng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::composite::PointOutcome;
use crate::protocol::{
    AirQualitySample, DensityResponse, ServiceGapsResponse, SolarResponse, VacantLandResponse,
};
use crate::task::{Seq, SourceId};

/// A single upstream call the host must perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FetchRequest {
    /// Viewport-scoped density query at the given zoom's detail level.
    Density {
        seq: Seq,
        bounds: GeoBounds,
        zoom: u8,
    },
    /// Fallback when no suitable viewport exists at activation: load the
    /// upstream's default region instead of nothing.
    DensityDefaultRegion { seq: Seq },
    /// Composite query: one sub-request per grid point, all for `date`.
    AirQualityGrid {
        seq: Seq,
        points: Vec<LatLng>,
        date: String,
        grid_resolution: u8,
    },
    /// AOI-scoped vacant-land analysis.
    VacantLand { seq: Seq, aoi: AoiRing },
    /// AOI-scoped service-gap analysis over the ring's bounding box.
    ServiceGaps {
        seq: Seq,
        bounds: GeoBounds,
        service_types: Vec<ServiceType>,
        grid_resolution_km: f64,
    },
    /// Solar suitability over the current viewport.
    Solar { seq: Seq, bounds: GeoBounds },
}

impl FetchRequest {
    pub fn source(&self) -> SourceId {
        match self {
            FetchRequest::Density { .. } | FetchRequest::DensityDefaultRegion { .. } => {
                SourceId::Density
            }
            FetchRequest::AirQualityGrid { .. } => SourceId::AirQuality,
            FetchRequest::VacantLand { .. } => SourceId::VacantLand,
            FetchRequest::ServiceGaps { .. } => SourceId::ServiceGaps,
            FetchRequest::Solar { .. } => SourceId::Solar,
        }
    }

    pub fn seq(&self) -> Seq {
        match self {
            FetchRequest::Density { seq, .. }
            | FetchRequest::DensityDefaultRegion { seq }
            | FetchRequest::AirQualityGrid { seq, .. }
            | FetchRequest::VacantLand { seq, .. }
            | FetchRequest::ServiceGaps { seq, .. }
            | FetchRequest::Solar { seq, .. } => *seq,
        }
    }
}

/// Decoded payload for a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePayload {
    Density(DensityResponse),
    AirQuality(Vec<PointOutcome<AirQualitySample>>),
    VacantLand(VacantLandResponse),
    ServiceGaps(ServiceGapsResponse),
    Solar(SolarResponse),
}

impl SourcePayload {
    pub fn source(&self) -> SourceId {
        match self {
            SourcePayload::Density(_) => SourceId::Density,
            SourcePayload::AirQuality(_) => SourceId::AirQuality,
            SourcePayload::VacantLand(_) => SourceId::VacantLand,
            SourcePayload::ServiceGaps(_) => SourceId::ServiceGaps,
            SourcePayload::Solar(_) => SourceId::Solar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("transport error: {message}")]
    Transport { message: String },
    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Completion of one [`FetchRequest`], tagged for staleness checks.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub source: SourceId,
    pub seq: Seq,
    pub result: Result<SourcePayload, FetchError>,
}

impl FetchOutcome {
    pub fn ok(request: &FetchRequest, payload: SourcePayload) -> Self {
        Self {
            source: request.source(),
            seq: request.seq(),
            result: Ok(payload),
        }
    }

    pub fn err(request: &FetchRequest, error: FetchError) -> Self {
        Self {
            source: request.source(),
            seq: request.seq(),
            result: Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchError, FetchRequest};
    use crate::task::{Seq, SourceId};
    use geo::{GeoBounds, LatLng};

    #[test]
    fn requests_report_source_and_seq() {
        let req = FetchRequest::AirQualityGrid {
            seq: Seq(7),
            points: vec![LatLng::new(0.0, 0.0)],
            date: "2024-06-01".to_string(),
            grid_resolution: 4,
        };
        assert_eq!(req.source(), SourceId::AirQuality);
        assert_eq!(req.seq(), Seq(7));

        let fallback = FetchRequest::DensityDefaultRegion { seq: Seq(1) };
        assert_eq!(fallback.source(), SourceId::Density);
    }

    #[test]
    fn errors_format_for_display() {
        let err = FetchError::Upstream {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned status 502: bad gateway");
    }

    #[test]
    fn density_request_round_trips_through_json() {
        let req = FetchRequest::Density {
            seq: Seq(3),
            bounds: GeoBounds::new(1.0, 0.0, 1.0, 0.0),
            zoom: 10,
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: FetchRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
