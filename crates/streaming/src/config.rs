use serde::{Deserialize, Serialize};

use crate::task::SourceId;

/// Viewport gating thresholds.
///
/// These are the empirically chosen constants from the production dashboard,
/// kept configurable rather than hardcoded: nothing derives them, and they
/// should not be assumed optimal.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Viewports larger than this (square degrees) are global/continental
    /// views and are never loaded.
    pub area_max_deg2: f64,
    /// Minimum zoom at which this source is loadable.
    pub zoom_min: u8,
    /// A zoom jump of at least this size always forces a reload (the LOD
    /// class almost certainly changed).
    pub zoom_delta_reload: u8,
    /// A pan reloads only once this fraction of the visible span has moved.
    pub drift_fraction_reload: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            area_max_deg2: 50_000.0,
            zoom_min: 6,
            zoom_delta_reload: 2,
            drift_fraction_reload: 0.5,
        }
    }
}

/// Per-source scheduling parameters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub debounce_ms: u64,
    pub filter: FilterConfig,
}

impl SchedulerConfig {
    /// Observed production values: 800 ms for density data, 1000 ms for the
    /// externally rate-limited air-quality queries.
    pub fn for_source(source: SourceId) -> Self {
        let filter = FilterConfig::default();
        match source {
            SourceId::Density => Self {
                debounce_ms: 800,
                filter,
            },
            SourceId::AirQuality => Self {
                debounce_ms: 1_000,
                filter: FilterConfig {
                    zoom_min: 5,
                    ..filter
                },
            },
            SourceId::Solar => Self {
                debounce_ms: 800,
                filter: FilterConfig {
                    zoom_min: 8,
                    ..filter
                },
            },
            // AOI-scoped sources are issued on activation/commit, not on
            // viewport movement; the debounce is unused but kept uniform.
            SourceId::VacantLand | SourceId::ServiceGaps => Self {
                debounce_ms: 0,
                filter,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SchedulerConfig;
    use crate::task::SourceId;

    #[test]
    fn air_quality_has_the_longer_debounce() {
        let density = SchedulerConfig::for_source(SourceId::Density);
        let air = SchedulerConfig::for_source(SourceId::AirQuality);
        assert_eq!(density.debounce_ms, 800);
        assert_eq!(air.debounce_ms, 1_000);
    }
}
