pub mod aoi;
pub mod bindings;
pub mod detail;
pub mod feature;
pub mod store;

pub use aoi::*;
pub use bindings::*;
pub use detail::*;
pub use feature::*;
pub use store::*;
