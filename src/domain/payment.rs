use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OrderDraft;

/// Seconds a digital payment stays open for admin review.
pub const DEFAULT_VERIFICATION_TTL_SECS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// Status as of `now`.
///
/// A stored `pending` past its deadline reads as `expired`; every other stored
/// status is returned unchanged, so a materialized `expired` stays expired.
pub fn effective_status(
    stored: VerificationStatus,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> VerificationStatus {
    if stored == VerificationStatus::Pending && now >= expires_at {
        VerificationStatus::Expired
    } else {
        stored
    }
}

/// A digital payment claim waiting for admin confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub id: String,
    pub user_id: String,
    pub order: OrderDraft,
    pub amount: f64,
    pub payer_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Set once approval has materialized the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl PaymentVerification {
    pub fn status_at(&self, now: DateTime<Utc>) -> VerificationStatus {
        effective_status(self.status, self.expires_at, now)
    }

    /// Time left in the review window, floored at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.status_at(now) != VerificationStatus::Pending {
            return Duration::zero();
        }
        (self.expires_at - now).max(Duration::zero())
    }
}

/// Payload for opening a verification.
#[derive(Debug, Clone)]
pub struct PaymentVerificationCreate {
    pub order: OrderDraft,
    pub amount: f64,
    pub payer_phone: String,
    pub transaction_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

/// What a reader sees: the record with its status and countdown evaluated now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationView {
    pub verification: PaymentVerification,
    pub status: VerificationStatus,
    pub remaining_secs: i64,
}

impl VerificationView {
    pub fn at(verification: PaymentVerification, now: DateTime<Utc>) -> Self {
        let status = verification.status_at(now);
        let remaining_secs = verification.remaining(now).num_seconds();
        Self {
            verification,
            status,
            remaining_secs,
        }
    }
}
