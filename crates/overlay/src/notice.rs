use std::fmt;

use streaming::{SourceId, Unsuitable};

/// A user-facing message produced while orchestrating fetches.
///
/// Notices accumulate until the host drains them; they never interrupt
/// rendering and carry no retry semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The fetch succeeded but the region has no data.
    NoData { source: SourceId },
    /// A composite fetch succeeded partially.
    PartialData { source: SourceId, unavailable: usize },
    /// The viewport failed a load precondition; nothing was fetched.
    Gated { source: SourceId, reason: Unsuitable },
    /// The fetch failed; previously loaded features remain visible.
    FetchFailed { source: SourceId, message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoData { source } => {
                write!(f, "{}: no data available in this area", source.as_str())
            }
            Notice::PartialData {
                source,
                unavailable,
            } => write!(
                f,
                "{}: {unavailable} locations without data",
                source.as_str()
            ),
            Notice::Gated { source, reason } => write!(f, "{}: {reason}", source.as_str()),
            Notice::FetchFailed { source, message } => {
                write!(f, "{} failed: {message}", source.as_str())
            }
        }
    }
}
