pub mod clock;
pub mod debounce;
pub mod trace;

pub use clock::*;
pub use debounce::*;
pub use trace::*;
