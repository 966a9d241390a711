//! Support thread flags consumed by the admin unread count.

pub mod entity;

pub use entity::*;
