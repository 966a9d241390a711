use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::{error, info, Instrument};

use storefront_engine::clients::{CheckoutOutcome, CheckoutRequest, PaymentClaim};
use storefront_engine::clock::{SharedClock, SystemClock};
use storefront_engine::domain::{
    DiscountKind, LineItem, OrderStatus, ShippingAddress, UserCreate, VoucherCreate,
};
use storefront_engine::{setup_tracing, EngineConfig, Session, StoreSystem};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = EngineConfig::from_env().context("Failed to load engine config")?;
    info!(?config, "Starting storefront engine");

    let clock: SharedClock = Arc::new(SystemClock);
    let system = StoreSystem::new(config, clock);
    let admin = Session::admin("admin");

    let user = system
        .user_client
        .register_user(UserCreate::new("Alice", "alice@example.com"))
        .await?;
    let alice = Session::customer(user.id.clone());
    info!(user_id = %user.id, "User registered");

    let now = Utc::now();
    system
        .voucher_client
        .create_voucher(
            &admin,
            VoucherCreate {
                code: "welcome20".into(),
                kind: DiscountKind::Percentage,
                value: 20.0,
                max_discount: Some(500.0),
                min_order_amount: 1000.0,
                valid_from: now - Duration::days(1),
                valid_until: now + Duration::days(30),
                usage_limit: 100,
                is_active: true,
                category: None,
            },
        )
        .await?;

    let address = ShippingAddress {
        full_name: "Alice".into(),
        phone: "01711000000".into(),
        street: "House 12, Road 5".into(),
        city: "Dhaka".into(),
        postal_code: Some("1209".into()),
    };

    // Cash on Delivery with a voucher
    let span = tracing::info_span!("cash_checkout");
    let cash_order = async {
        let request = CheckoutRequest::cash(
            vec![LineItem::new("prod_1", "Cotton Panjabi", 2500.0, 2).with_variant("L")],
            address.clone(),
        )
        .with_voucher("WELCOME20");
        match system.checkout_client.checkout(&alice, request).await? {
            CheckoutOutcome::Placed(order) => Ok::<_, anyhow::Error>(order),
            other => anyhow::bail!("unexpected checkout outcome {:?}", other),
        }
    }
    .instrument(span)
    .await?;
    let receipt = serde_json::to_string(&cash_order).context("Failed to encode order")?;
    info!(order_id = %cash_order.id, total = cash_order.total, %receipt, "Cash order placed");

    // Digital payment, approved by an admin
    let span = tracing::info_span!("digital_checkout");
    let digital_order = async {
        let request = CheckoutRequest::digital(
            vec![LineItem::new("prod_2", "Leather Wallet", 900.0, 1)],
            address.clone(),
            "bKash",
            PaymentClaim {
                payer_phone: "01811000000".into(),
                transaction_ref: Some("8N7A6B5C".into()),
            },
        );
        let view = match system.checkout_client.checkout(&alice, request).await? {
            CheckoutOutcome::AwaitingPayment(view) => view,
            other => anyhow::bail!("unexpected checkout outcome {:?}", other),
        };
        info!(verification_id = %view.verification.id, remaining_secs = view.remaining_secs, "Awaiting verification");

        let (_, order) = system
            .payment_client
            .approve_payment_verification(&admin, view.verification.id.clone())
            .await?;
        Ok::<_, anyhow::Error>(order)
    }
    .instrument(span)
    .await?;
    info!(order_id = %digital_order.id, status = %digital_order.status, "Digital order created");

    // Deliver the digital order and ask for a refund
    for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
        system
            .order_client
            .update_order_status(&admin, digital_order.id.clone(), status)
            .await?;
    }
    let refund = system
        .refund_client
        .create_refund_request(&alice, digital_order.id.clone(), "Stitching came apart".into())
        .await?;
    let refund = system
        .refund_client
        .approve_refund(&admin, refund.id, Some("Refund sent to bKash".into()))
        .await?;
    info!(refund_id = %refund.id, status = %refund.status, amount = refund.amount, "Refund processed");

    // A customer may not cancel Cash on Delivery themselves
    if let Err(e) = system.order_client.cancel_order(&alice, cash_order.id.clone()).await {
        error!(error = %e, "Cancel refused");
    }

    let unread = system.notification_client.user_unread_count(user.id.clone()).await?;
    let admin_unread = system.notification_client.admin_unread_count().await?;
    info!(unread, admin_unread, "Notification counts");

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
