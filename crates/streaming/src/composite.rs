use geo::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One sub-query result within a composite (grid) fetch.
///
/// `None` means the upstream reported no data for this location — a valid
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOutcome<T> {
    pub at: LatLng,
    pub sample: Option<T>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSummary {
    pub succeeded: usize,
    pub unavailable: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositeError {
    #[error("no data at any of the {total} grid locations")]
    AllUnavailable { total: usize },
}

/// Folds the sub-query outcomes of a composite fetch.
///
/// Individual failures are tolerated: the aggregate succeeds if at least one
/// point produced data, and the unavailable count is reported alongside the
/// successes rather than failing the whole request.
pub fn aggregate<T>(
    points: Vec<PointOutcome<T>>,
) -> Result<(Vec<(LatLng, T)>, CompositeSummary), CompositeError> {
    let total = points.len();
    let mut out = Vec::new();
    let mut unavailable = 0;

    for point in points {
        match point.sample {
            Some(sample) => out.push((point.at, sample)),
            None => unavailable += 1,
        }
    }

    if out.is_empty() {
        return Err(CompositeError::AllUnavailable { total });
    }

    let summary = CompositeSummary {
        succeeded: out.len(),
        unavailable,
    };
    Ok((out, summary))
}
