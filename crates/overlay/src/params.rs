use features::ServiceType;
use serde::{Deserialize, Serialize};

/// User-adjustable query parameters shared across fetches.
///
/// Changing these does not retrigger loads by itself; they are read when the
/// next request is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayParams {
    /// ISO date for air-quality queries (YYYY-MM-DD).
    pub date: String,
    /// Services included in the gap analysis.
    pub service_types: Vec<ServiceType>,
    /// Sampling cell size for the gap analysis, in kilometres.
    pub grid_resolution_km: f64,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            date: "2025-01-01".to_string(),
            service_types: ServiceType::ALL.to_vec(),
            grid_resolution_km: 1.0,
        }
    }
}
