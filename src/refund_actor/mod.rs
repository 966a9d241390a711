//! Refund requests against delivered orders.

mod actions;
pub mod entity;

pub use actions::*;
