pub mod conversation;
pub mod notification;
pub mod order;
pub mod payment;
pub mod refund;
pub mod user;
pub mod voucher;

pub use conversation::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use refund::*;
pub use user::*;
pub use voucher::*;
