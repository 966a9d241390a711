//! Order records and their status state machine.

mod actions;
pub mod entity;
pub mod lifecycle;

pub use actions::*;
pub use lifecycle::{can_cancel, check_transition};
