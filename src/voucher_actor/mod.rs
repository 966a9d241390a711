//! Voucher records, the read-only eligibility rules, and the atomic redeem action.

mod actions;
pub mod entity;
pub mod rules;

pub use actions::*;
pub use rules::evaluate;
