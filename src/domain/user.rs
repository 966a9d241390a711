use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Represents a registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Ids of vouchers this user has redeemed. A voucher id appears at most once.
    #[serde(default)]
    pub used_vouchers: BTreeSet<String>,
}

impl User {
    pub fn has_used_voucher(&self, voucher_id: &str) -> bool {
        self.used_vouchers.contains(voucher_id)
    }
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
