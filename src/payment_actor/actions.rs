use chrono::{DateTime, Utc};

use crate::domain::{PaymentVerification, VerificationStatus};

/// Custom actions for PaymentVerification entities.
///
/// Every action carries `now` so the expiry check and the transition happen
/// in one step inside the actor.
#[derive(Debug, Clone)]
pub enum PaymentAction {
    Approve { now: DateTime<Utc> },
    Reject { now: DateTime<Utc> },
    /// Materializes `expired` if the deadline has passed. No-op otherwise.
    Expire { now: DateTime<Utc> },
    /// Records the order created from an approved verification.
    LinkOrder { order_id: String },
}

#[derive(Debug, Clone)]
pub enum PaymentActionResult {
    Decided(PaymentVerification),
    /// Returns the status after the sweep and whether it changed.
    Swept { status: VerificationStatus, changed: bool },
    Linked,
}
