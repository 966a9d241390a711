use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: String,
    /// Stored upper-cased; lookups are case-insensitive.
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    pub min_order_amount: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: u32,
    pub used_count: u32,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Canonical stored form of a voucher code: trimmed, Unicode upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Voucher {
    pub fn matches_code(&self, code: &str) -> bool {
        self.code == normalize_code(code)
    }

    pub fn has_headroom(&self) -> bool {
        self.used_count < self.usage_limit
    }
}

/// Discount granted by `voucher` on `order_total`.
///
/// Percentage discounts are capped by `max_discount`; fixed discounts are not
/// capped by the order total.
pub fn discount_for(voucher: &Voucher, order_total: f64) -> f64 {
    match voucher.kind {
        DiscountKind::Percentage => {
            let raw = order_total * voucher.value / 100.0;
            voucher.max_discount.map_or(raw, |cap| raw.min(cap))
        }
        DiscountKind::Fixed => voucher.value,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherCreate {
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    #[serde(default)]
    pub max_discount: Option<f64>,
    #[serde(default)]
    pub min_order_amount: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct VoucherPatch {
    pub is_active: Option<bool>,
    pub usage_limit: Option<u32>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_discount: Option<Option<f64>>,
}

/// Why a voucher was refused. `Display` gives the user-facing reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum VoucherRejection {
    #[error("invalid code")]
    InvalidCode,
    #[error("no longer active")]
    Inactive,
    #[error("not yet valid")]
    NotYetValid,
    #[error("expired")]
    Expired,
    #[error("usage limit reached")]
    UsageLimitReached,
    #[error("minimum order amount not met (requires {required:.2})")]
    MinimumNotMet { required: f64 },
    #[error("already used by this user")]
    AlreadyUsedByUser,
}

/// Result of a read-only voucher check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherCheck {
    pub valid: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<VoucherRejection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher: Option<Voucher>,
    pub discount: f64,
}

impl VoucherCheck {
    pub fn accepted(voucher: Voucher, order_total: f64) -> Self {
        let discount = discount_for(&voucher, order_total);
        Self {
            valid: true,
            reason: "voucher applied".to_string(),
            rejection: None,
            voucher: Some(voucher),
            discount,
        }
    }

    pub fn rejected(rejection: VoucherRejection, voucher: Option<Voucher>) -> Self {
        Self {
            valid: false,
            reason: rejection.to_string(),
            rejection: Some(rejection),
            voucher,
            discount: 0.0,
        }
    }
}
