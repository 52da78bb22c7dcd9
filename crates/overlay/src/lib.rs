//! Overlay orchestration.
//!
//! [`OverlayManager`] ties the layer registry, per-source schedulers, AOI
//! capture and the feature store together behind a sans-IO surface: callers
//! feed it viewport events, clock ticks and fetch completions, and it hands
//! back the requests the host transport must perform.

pub mod error;
pub mod manager;
pub mod normalize;
pub mod notice;
pub mod params;

pub use error::*;
pub use manager::*;
pub use normalize::*;
pub use notice::*;
pub use params::*;
