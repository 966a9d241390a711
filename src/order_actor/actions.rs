use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderStatus};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Administrative status change. Skips the self-service gate but not the
    /// state machine.
    Transition { to: OrderStatus, at: DateTime<Utc> },
    /// Customer cancelling their own order.
    CancelByCustomer { user_id: String, at: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Transitioned { from: OrderStatus, order: Order },
}
