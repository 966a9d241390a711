use chrono::{DateTime, Utc};

use crate::domain::{RefundRequest, RefundStatus};

#[derive(Debug, Clone)]
pub enum RefundAction {
    /// Moves a pending refund to `to` (approved or rejected).
    /// An already-terminal refund is left untouched.
    Process {
        to: RefundStatus,
        admin_notes: Option<String>,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub enum RefundActionResult {
    Processed(RefundRequest),
    /// The refund was already terminal; nothing changed.
    Unchanged(RefundRequest),
}
