use features::AoiError;
use layers::LayerId;
use thiserror::Error;

/// Rejected user commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("layer {} requires a committed area of interest", .layer.as_str())]
    NeedsAoi { layer: LayerId },
    #[error(transparent)]
    Aoi(#[from] AoiError),
}
