use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::actor_framework::ResourceActor;
use crate::app_system::{spawn_expiry_sweeper, EngineConfig};
use crate::clients::{
    CheckoutClient, ConversationClient, NotificationClient, OrderClient, PaymentClient, RefundClient,
    UserClient, VoucherClient,
};
use crate::clock::SharedClock;
use crate::domain::{Conversation, Notification, Order, PaymentVerification, RefundRequest, User, Voucher};

/// How long shutdown waits for each actor to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Sequential ids of the form `<prefix>_<n>`, starting at 1.
fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    }
}

/// The storefront engine: every actor, the clients wired over them, and the
/// optional expiry sweeper.
pub struct StoreSystem {
    pub user_client: UserClient,
    pub voucher_client: VoucherClient,
    pub order_client: OrderClient,
    pub payment_client: PaymentClient,
    pub refund_client: RefundClient,
    pub notification_client: NotificationClient,
    pub conversation_client: ConversationClient,
    pub checkout_client: CheckoutClient,
    handles: Vec<JoinHandle<()>>,
    sweeper: Option<JoinHandle<()>>,
}

impl StoreSystem {
    /// Starts every actor. Must be called inside a tokio runtime.
    pub fn new(config: EngineConfig, clock: SharedClock) -> Self {
        let mailbox = config.mailbox_size;

        // 1. Users
        let (user_actor, users) = ResourceActor::<User>::new(mailbox, sequential_ids("user"));
        let user_client = UserClient::new(users);
        let user_handle = tokio::spawn(user_actor.run());

        // 2. Conversations and notifications
        let (conversation_actor, conversations) =
            ResourceActor::<Conversation>::new(mailbox, sequential_ids("conversation"));
        let conversation_client = ConversationClient::new(conversations, clock.clone());
        let conversation_handle = tokio::spawn(conversation_actor.run());

        let (notification_actor, notifications) =
            ResourceActor::<Notification>::new(mailbox, sequential_ids("notification"));
        let notification_client =
            NotificationClient::new(notifications, conversation_client.clone(), clock.clone());
        let notification_handle = tokio::spawn(notification_actor.run());

        // 3. Vouchers
        let (voucher_actor, vouchers) = ResourceActor::<Voucher>::new(mailbox, sequential_ids("voucher"));
        let voucher_client = VoucherClient::new(vouchers, user_client.clone(), clock.clone());
        let voucher_handle = tokio::spawn(voucher_actor.run());

        // 4. Orders
        let (order_actor, orders) = ResourceActor::<Order>::new(mailbox, sequential_ids("order"));
        let order_client = OrderClient::new(
            orders,
            user_client.clone(),
            voucher_client.clone(),
            notification_client.clone(),
            config.delivery.clone(),
            clock.clone(),
        );
        let order_handle = tokio::spawn(order_actor.run());

        // 5. Payment verifications
        let (payment_actor, payments) =
            ResourceActor::<PaymentVerification>::new(mailbox, sequential_ids("verification"));
        let payment_client = PaymentClient::new(
            payments,
            order_client.clone(),
            notification_client.clone(),
            clock.clone(),
            config.verification_ttl(),
        );
        let payment_handle = tokio::spawn(payment_actor.run());

        // 6. Refunds
        let (refund_actor, refunds) = ResourceActor::<RefundRequest>::new(mailbox, sequential_ids("refund"));
        let refund_client = RefundClient::new(
            refunds,
            order_client.clone(),
            notification_client.clone(),
            clock.clone(),
        );
        let refund_handle = tokio::spawn(refund_actor.run());

        let checkout_client = CheckoutClient::new(order_client.clone(), payment_client.clone(), voucher_client.clone());

        let sweeper = config
            .payment
            .sweep_interval_secs
            .map(|secs| spawn_expiry_sweeper(payment_client.clone(), Duration::from_secs(secs)));

        info!(mailbox, sweeper = sweeper.is_some(), "Store system started");
        Self {
            user_client,
            voucher_client,
            order_client,
            payment_client,
            refund_client,
            notification_client,
            conversation_client,
            checkout_client,
            handles: vec![
                user_handle,
                conversation_handle,
                notification_handle,
                voucher_handle,
                order_handle,
                payment_handle,
                refund_handle,
            ],
            sweeper,
        }
    }

    /// Stops the sweeper, drops every client so the actors drain, and waits
    /// for them. Clones of clients held elsewhere keep their actor alive; such
    /// actors are aborted after a grace period.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down system...");

        if let Some(sweeper) = self.sweeper {
            sweeper.abort();
            let _ = sweeper.await;
        }

        drop(self.checkout_client);
        drop(self.refund_client);
        drop(self.payment_client);
        drop(self.order_client);
        drop(self.voucher_client);
        drop(self.notification_client);
        drop(self.conversation_client);
        drop(self.user_client);

        let mut failed = 0;
        for mut handle in self.handles {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = ?e, "Actor task failed");
                    failed += 1;
                }
                Err(_) => {
                    warn!("Actor still has live clients, aborting");
                    handle.abort();
                }
            }
        }

        anyhow::ensure!(failed == 0, "{} actor task(s) failed", failed);
        info!("System shutdown complete.");
        Ok(())
    }
}
