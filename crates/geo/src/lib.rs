pub mod bounds;
pub mod lod;
pub mod ring;

// Geo crate: small, well-tested geographic primitives only.
pub use bounds::*;
pub use lod::*;
pub use ring::*;
