use geo::Viewport;
use runtime::Millis;
use serde::{Deserialize, Serialize};

/// The independently scheduled data sources.
///
/// Each source owns its debounce timer, sequence counter and last-loaded
/// memo; there is no coupling or ordering guarantee across sources.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Density,
    AirQuality,
    VacantLand,
    ServiceGaps,
    Solar,
}

impl SourceId {
    pub const ALL: [SourceId; 5] = [
        SourceId::Density,
        SourceId::AirQuality,
        SourceId::VacantLand,
        SourceId::ServiceGaps,
        SourceId::Solar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Density => "density",
            SourceId::AirQuality => "air_quality",
            SourceId::VacantLand => "vacant_land",
            SourceId::ServiceGaps => "service_gaps",
            SourceId::Solar => "solar",
        }
    }

    /// Viewport-scoped sources reload as the map moves; the others reload
    /// only when the drawn area of interest changes.
    pub fn is_viewport_scoped(&self) -> bool {
        matches!(
            self,
            SourceId::Density | SourceId::AirQuality | SourceId::Solar
        )
    }
}

/// Per-source monotonic sequence number.
///
/// The staleness mechanism: a completion whose sequence no longer matches the
/// source's current task is discarded ("last request wins").
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Seq(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InFlight,
    Done,
    Stale,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Stale)
    }
}

/// One scheduled fetch for a source.
///
/// Invariant (held by `SourceScheduler`): at most one task per source is
/// Pending or InFlight at any time; issuing a new task marks the prior one
/// Stale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FetchTask {
    pub source: SourceId,
    pub seq: Seq,
    pub status: TaskStatus,
    pub viewport: Viewport,
    pub issued_at: Millis,
}

#[cfg(test)]
mod tests {
    use super::{SourceId, TaskStatus};

    #[test]
    fn scope_split_matches_the_layer_model() {
        assert!(SourceId::Density.is_viewport_scoped());
        assert!(SourceId::AirQuality.is_viewport_scoped());
        assert!(SourceId::Solar.is_viewport_scoped());
        assert!(!SourceId::VacantLand.is_viewport_scoped());
        assert!(!SourceId::ServiceGaps.is_viewport_scoped());
    }

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Stale.is_terminal());
        assert!(!TaskStatus::InFlight.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
    }
}
