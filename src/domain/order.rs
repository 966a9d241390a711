use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Payment method label that marks an order as cash-collected at the door.
pub const CASH_ON_DELIVERY: &str = "Cash on Delivery";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The status an administrative `advance` moves to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cart line, with the unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            quantity,
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Voucher snapshot frozen onto an order at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedVoucher {
    pub voucher_id: String,
    pub code: String,
    pub discount: f64,
}

/// Order content before it has an identity.
///
/// Committed directly for cash payments, or embedded in a payment
/// verification until an admin approves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub delivery_charge: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher: Option<AppliedVoucher>,
    pub shipping: ShippingAddress,
    pub payment_method: String,
}

/// A cart that can become an order: at least one line, every quantity
/// positive, every price finite and not negative.
pub fn validate_line_items(items: &[LineItem]) -> EngineResult<()> {
    if items.is_empty() {
        return Err(EngineError::ValidationFailed("order has no items".into()));
    }
    if let Some(item) = items.iter().find(|i| i.quantity == 0 || !i.price.is_finite() || i.price < 0.0) {
        return Err(EngineError::ValidationFailed(format!(
            "invalid line item for product {}",
            item.product_id
        )));
    }
    Ok(())
}

impl OrderDraft {
    pub fn validate(&self) -> EngineResult<()> {
        validate_line_items(&self.items)
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn discount(&self) -> f64 {
        self.voucher.as_ref().map_or(0.0, |v| v.discount)
    }

    /// `subtotal + delivery - discount`, never below zero.
    pub fn total(&self) -> f64 {
        (self.subtotal() + self.delivery_charge - self.discount()).max(0.0)
    }

    pub fn is_cash(&self) -> bool {
        self.payment_method == CASH_ON_DELIVERY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub delivery_charge: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher: Option<AppliedVoucher>,
    pub total: f64,
    pub shipping: ShippingAddress,
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub draft: OrderDraft,
    pub status: OrderStatus,
    pub transaction_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(city: &str) -> ShippingAddress {
        ShippingAddress {
            full_name: "Rahim Uddin".into(),
            phone: "01700000000".into(),
            street: "House 4, Road 7".into(),
            city: city.into(),
            postal_code: None,
        }
    }

    #[test]
    fn test_total_includes_delivery_and_discount() {
        let draft = OrderDraft {
            user_id: "user_1".into(),
            items: vec![
                LineItem::new("p1", "Kurta", 1200.0, 2),
                LineItem::new("p2", "Scarf", 350.0, 1).with_variant("blue"),
            ],
            delivery_charge: 60.0,
            voucher: Some(AppliedVoucher {
                voucher_id: "voucher_1".into(),
                code: "SAVE100".into(),
                discount: 100.0,
            }),
            shipping: address("Dhaka"),
            payment_method: CASH_ON_DELIVERY.into(),
        };

        assert_eq!(draft.subtotal(), 2750.0);
        assert_eq!(draft.total(), 2710.0);
        assert!(draft.is_cash());
    }

    #[test]
    fn test_total_never_negative() {
        let draft = OrderDraft {
            user_id: "user_1".into(),
            items: vec![LineItem::new("p1", "Socks", 100.0, 1)],
            delivery_charge: 60.0,
            voucher: Some(AppliedVoucher {
                voucher_id: "voucher_1".into(),
                code: "FLAT500".into(),
                discount: 500.0,
            }),
            shipping: address("Sylhet"),
            payment_method: "bKash".into(),
        };
        assert_eq!(draft.total(), 0.0);
    }

    #[test]
    fn test_validate_rejects_unorderable_carts() {
        let mut draft = OrderDraft {
            user_id: "user_1".into(),
            items: vec![LineItem::new("p1", "Shawl", 800.0, 1)],
            delivery_charge: 110.0,
            voucher: None,
            shipping: address("Rajshahi"),
            payment_method: "bKash".into(),
        };
        assert!(draft.validate().is_ok());

        draft.items.push(LineItem::new("p2", "Zero", 500.0, 0));
        assert_eq!(
            draft.validate(),
            Err(EngineError::ValidationFailed("invalid line item for product p2".into()))
        );

        draft.items = vec![LineItem::new("p3", "Refund trick", -50.0, 1)];
        assert!(draft.validate().is_err());
        draft.items = vec![LineItem::new("p4", "Unpriced", f64::NAN, 1)];
        assert!(draft.validate().is_err());
        draft.items = vec![LineItem::new("p5", "Unbounded", f64::INFINITY, 1)];
        assert!(draft.validate().is_err());

        draft.items.clear();
        assert_eq!(draft.validate(), Err(EngineError::ValidationFailed("order has no items".into())));
    }

    #[test]
    fn test_status_progression() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::Shipped.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert_eq!(serde_json::to_string(&OrderStatus::Processing).unwrap(), "\"processing\"");
    }
}
