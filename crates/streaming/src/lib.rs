pub mod aqi;
pub mod composite;
pub mod config;
pub mod filters;
pub mod protocol;
pub mod scheduler;
pub mod sources;
pub mod task;

pub use aqi::*;
pub use composite::*;
pub use config::*;
pub use filters::*;
pub use protocol::*;
pub use scheduler::*;
pub use sources::*;
pub use task::*;
