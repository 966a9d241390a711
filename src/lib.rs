//! In-process storefront engine: orders, payment verification, vouchers,
//! refunds, and notifications, each owned by a resource actor.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod clock;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod session;

pub mod conversation_actor;
pub mod notification_actor;
pub mod order_actor;
pub mod payment_actor;
pub mod refund_actor;
pub mod user_actor;
pub mod voucher_actor;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, EngineConfig, StoreSystem};
pub use error::{EngineError, EngineResult};
pub use session::{Role, Session};
