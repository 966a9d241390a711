use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::clients::{OrderClient, PaymentClient, VoucherClient};
use crate::domain::{
    validate_line_items, AppliedVoucher, LineItem, Order, OrderDraft, ShippingAddress, VerificationView, VoucherCheck,
    CASH_ON_DELIVERY,
};
use crate::error::{EngineError, EngineResult};
use crate::session::Session;

/// What the customer claims to have paid for a digital checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentClaim {
    pub payer_phone: String,
    #[serde(default)]
    pub transaction_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<LineItem>,
    pub shipping: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub voucher_code: Option<String>,
    /// Required unless paying Cash on Delivery.
    #[serde(default)]
    pub payment: Option<PaymentClaim>,
}

impl CheckoutRequest {
    pub fn cash(items: Vec<LineItem>, shipping: ShippingAddress) -> Self {
        Self {
            items,
            shipping,
            payment_method: CASH_ON_DELIVERY.to_string(),
            voucher_code: None,
            payment: None,
        }
    }

    pub fn digital(items: Vec<LineItem>, shipping: ShippingAddress, method: impl Into<String>, claim: PaymentClaim) -> Self {
        Self {
            items,
            shipping,
            payment_method: method.into(),
            voucher_code: None,
            payment: Some(claim),
        }
    }

    pub fn with_voucher(mut self, code: impl Into<String>) -> Self {
        self.voucher_code = Some(code.into());
        self
    }

    fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

/// Priced checkout before anything is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: f64,
    pub delivery_charge: f64,
    /// Present when a voucher code was supplied, valid or not.
    pub voucher: Option<VoucherCheck>,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Cash on Delivery: the order exists in `pending`.
    Placed(Order),
    /// Digital payment: the order is created when an admin approves.
    AwaitingPayment(VerificationView),
}

/// Front door for a customer checkout. Prices the cart, then either commits a
/// cash order or opens a payment verification.
#[derive(Clone)]
pub struct CheckoutClient {
    orders: OrderClient,
    payments: PaymentClient,
    vouchers: VoucherClient,
}

impl CheckoutClient {
    pub fn new(orders: OrderClient, payments: PaymentClient, vouchers: VoucherClient) -> Self {
        Self {
            orders,
            payments,
            vouchers,
        }
    }

    /// Prices `request` for the session's user. Vouchers are checked against
    /// the item subtotal.
    #[instrument(skip(self, session, request), fields(user_id = %session.user_id))]
    pub async fn quote(&self, session: &Session, request: &CheckoutRequest) -> EngineResult<Quote> {
        let subtotal = self.subtotal_of(request)?;
        let delivery_charge = self.orders.calculate_delivery_charge(&request.shipping.city, subtotal);

        let voucher = match request.voucher_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(
                self.vouchers
                    .validate_voucher(code, subtotal, Some(&session.user_id))
                    .await?,
            ),
            _ => None,
        };
        let discount = voucher.as_ref().map_or(0.0, |v| v.discount);
        let total = (subtotal + delivery_charge - discount).max(0.0);

        Ok(Quote {
            subtotal,
            delivery_charge,
            voucher,
            discount,
            total,
        })
    }

    /// Runs a checkout for the session's user.
    ///
    /// # Errors
    /// * `ValidationFailed` for an empty cart, a rejected voucher, a digital
    ///   payment without a claim, or when the user already has a verification
    ///   awaiting review.
    #[instrument(skip(self, session, request), fields(user_id = %session.user_id, method = %request.payment_method))]
    pub async fn checkout(&self, session: &Session, request: CheckoutRequest) -> EngineResult<CheckoutOutcome> {
        let quote = self.quote(session, &request).await?;

        let voucher = match &quote.voucher {
            Some(check) if !check.valid => {
                warn!(reason = %check.reason, "Checkout voucher rejected");
                return Err(EngineError::ValidationFailed(check.reason.clone()));
            }
            Some(VoucherCheck {
                voucher: Some(v),
                discount,
                ..
            }) => Some(AppliedVoucher {
                voucher_id: v.id.clone(),
                code: v.code.clone(),
                discount: *discount,
            }),
            _ => None,
        };

        let draft = OrderDraft {
            user_id: session.user_id.clone(),
            items: request.items,
            delivery_charge: quote.delivery_charge,
            voucher,
            shipping: request.shipping,
            payment_method: request.payment_method,
        };

        if draft.is_cash() {
            let order = self.orders.place_order(session, draft).await?;
            info!(order_id = %order.id, total = order.total, "Cash checkout placed");
            return Ok(CheckoutOutcome::Placed(order));
        }

        let claim = request.payment.ok_or_else(|| {
            EngineError::ValidationFailed(format!("{} checkout requires payment details", draft.payment_method))
        })?;
        if let Some(active) = self.payments.active_verification_for_user(session.user_id.clone()).await? {
            return Err(EngineError::ValidationFailed(format!(
                "payment verification {} is still pending ({}s left)",
                active.verification.id, active.remaining_secs
            )));
        }

        let view = self
            .payments
            .request_payment_verification(session, draft, quote.total, claim.payer_phone, claim.transaction_ref)
            .await?;
        info!(verification_id = %view.verification.id, "Digital checkout awaiting verification");
        Ok(CheckoutOutcome::AwaitingPayment(view))
    }

    fn subtotal_of(&self, request: &CheckoutRequest) -> EngineResult<f64> {
        validate_line_items(&request.items)?;
        Ok(request.subtotal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ConversationClient, NotificationClient, UserClient};
    use crate::clock::{ManualClock, SharedClock};
    use crate::delivery::DeliverySettings;
    use crate::mock_framework::create_mock_client;
    use std::sync::Arc;

    fn checkout_client() -> CheckoutClient {
        let clock: SharedClock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let (users, _) = create_mock_client(1);
        let (vouchers, _) = create_mock_client(1);
        let (orders, _) = create_mock_client(1);
        let (payments, _) = create_mock_client(1);
        let (notes, _) = create_mock_client(1);
        let (convs, _) = create_mock_client(1);
        let users = UserClient::new(users);
        let notifier = NotificationClient::new(notes, ConversationClient::new(convs, clock.clone()), clock.clone());
        let vouchers = VoucherClient::new(vouchers, users.clone(), clock.clone());
        let orders = OrderClient::new(
            orders,
            users,
            vouchers.clone(),
            notifier.clone(),
            DeliverySettings::default(),
            clock.clone(),
        );
        let payments = PaymentClient::new(payments, orders.clone(), notifier, clock, chrono::Duration::seconds(180));
        CheckoutClient::new(orders, payments, vouchers)
    }

    fn address(city: &str) -> ShippingAddress {
        ShippingAddress {
            full_name: "Karim".into(),
            phone: "01700000000".into(),
            street: "House 4".into(),
            city: city.into(),
            postal_code: Some("4000".into()),
        }
    }

    #[tokio::test]
    async fn test_quote_prices_delivery_by_city() {
        let client = checkout_client();
        let session = Session::customer("user_1");
        let items = vec![LineItem::new("p1", "Panjabi", 1200.0, 1), LineItem::new("p2", "Cap", 150.0, 2)];

        let dhaka = client.quote(&session, &CheckoutRequest::cash(items.clone(), address("Dhaka"))).await.unwrap();
        assert_eq!(dhaka.subtotal, 1500.0);
        assert_eq!(dhaka.delivery_charge, 60.0);
        assert_eq!(dhaka.total, 1560.0);
        assert!(dhaka.voucher.is_none());

        let ctg = client.quote(&session, &CheckoutRequest::cash(items, address("Chittagong"))).await.unwrap();
        assert_eq!(ctg.delivery_charge, 110.0);
        assert_eq!(ctg.total, 1610.0);
    }

    #[test]
    fn test_request_from_json() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{
                "items": [{"product_id": "p1", "name": "Fatua", "price": 850.0, "quantity": 1}],
                "shipping": {"full_name": "Karim", "phone": "01700000000", "street": "House 4", "city": "Khulna"},
                "payment_method": "Rocket",
                "payment": {"payer_phone": "01600000000"}
            }"#,
        )
        .unwrap();
        assert_eq!(request.voucher_code, None);
        assert_eq!(request.items[0].variant, None);
        let claim = request.payment.unwrap();
        assert_eq!(claim.transaction_ref, None);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let client = checkout_client();
        let result = client
            .checkout(&Session::customer("user_1"), CheckoutRequest::cash(vec![], address("Dhaka")))
            .await;
        assert!(matches!(result, Err(EngineError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_digital_checkout_requires_claim() {
        let client = checkout_client();
        let mut request = CheckoutRequest::cash(vec![LineItem::new("p1", "Saree", 3000.0, 1)], address("Dhaka"));
        request.payment_method = "Nagad".into();

        let result = client.checkout(&Session::customer("user_1"), request).await;
        match result {
            Err(EngineError::ValidationFailed(reason)) => assert!(reason.contains("Nagad")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
