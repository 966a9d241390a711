//! Domain clients. Each wraps one or more resource clients and owns the
//! orchestration for its component.

#[macro_use]
mod macros;

pub mod checkout_client;
pub mod conversation_client;
pub mod notification_client;
pub mod order_client;
pub mod payment_client;
pub mod refund_client;
pub mod user_client;
pub mod voucher_client;

pub use checkout_client::*;
pub use conversation_client::*;
pub use notification_client::*;
pub use order_client::*;
pub use payment_client::*;
pub use refund_client::*;
pub use user_client::*;
pub use voucher_client::*;
