//! System orchestration, configuration, startup, and shutdown logic.

pub mod config;
pub mod expiry_sweeper;
pub mod store_system;
pub mod tracing;

pub use config::*;
pub use expiry_sweeper::*;
pub use store_system::*;
pub use self::tracing::*;
