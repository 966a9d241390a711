//! Flat notification log and the recipient rules read over it.

pub mod entity;
pub mod fanout;

pub use entity::*;
pub use fanout::*;
