//! Layer identity, activation rules, and styling.
//!
//! The registry decides which layers may be active together; symbology maps
//! stored features to paint, with no per-feature style state anywhere else.

pub mod registry;
pub mod symbology;

pub use registry::*;
pub use symbology::*;
