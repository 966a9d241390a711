//! Time-boxed payment verifications and their pending -> terminal transitions.

mod actions;
pub mod entity;

pub use actions::*;
