//! Customer records and the per-user voucher claim.

mod actions;
pub mod entity;

pub use actions::*;
