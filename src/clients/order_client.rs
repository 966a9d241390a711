use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::{NotificationClient, UserClient, VoucherClient};
use crate::clock::SharedClock;
use crate::delivery::{calculate_delivery_charge, DeliverySettings};
use crate::domain::{
    NotificationCreate, NotificationKind, Order, OrderCreate, OrderDraft, OrderStatus,
};
use crate::error::{EngineError, EngineResult};
use crate::order_actor::{OrderAction, OrderActionResult};
use crate::session::Session;

/// Client for the order lifecycle.
///
/// Commits drafts into orders, applies administrative status changes and the
/// customer self-service cancel, and emits a notification for every change.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    users: UserClient,
    vouchers: VoucherClient,
    notifier: NotificationClient,
    delivery: DeliverySettings,
    clock: SharedClock,
}

impl_client_methods!(OrderClient, Order, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        users: UserClient,
        vouchers: VoucherClient,
        notifier: NotificationClient,
        delivery: DeliverySettings,
        clock: SharedClock,
    ) -> Self {
        Self {
            inner,
            users,
            vouchers,
            notifier,
            delivery,
            clock,
        }
    }

    pub fn calculate_delivery_charge(&self, city: &str, subtotal: f64) -> f64 {
        calculate_delivery_charge(city, subtotal, &self.delivery)
    }

    /// Commits a Cash on Delivery draft as a `pending` order.
    ///
    /// Digital payments go through payment verification instead; their order
    /// is created on approval.
    #[instrument(skip(self, session, draft), fields(user_id = %draft.user_id, total = draft.total()))]
    pub async fn place_order(&self, session: &Session, draft: OrderDraft) -> EngineResult<Order> {
        info!("Processing place_order request");

        if !session.owns(&draft.user_id) && !session.is_admin() {
            return Err(EngineError::Unauthorized(format!(
                "cannot place an order for {}",
                draft.user_id
            )));
        }
        if !draft.is_cash() {
            return Err(EngineError::ValidationFailed(format!(
                "{} payments must be verified before an order is created",
                draft.payment_method
            )));
        }

        self.commit(draft, OrderStatus::Pending, None).await
    }

    /// Creates the order, then redeems its voucher and notifies.
    ///
    /// Redemption runs after the order exists so abandoned checkouts never
    /// consume a use. A refused redemption leaves the order standing and raises
    /// an admin notice naming the order and the unearned discount.
    pub(crate) async fn commit(
        &self,
        draft: OrderDraft,
        status: OrderStatus,
        transaction_ref: Option<String>,
    ) -> EngineResult<Order> {
        // Step 1: Validate user
        let user = self.users.require_user(&draft.user_id).await?;
        debug!(user_name = %user.name, "User validation successful");

        // Step 2: Create order
        let order = self
            .inner
            .create(OrderCreate {
                draft,
                status,
                transaction_ref,
                created_at: self.clock.now(),
            })
            .await?;
        info!(order_id = %order.id, status = %order.status, "Order created");

        // Step 3: Redeem voucher
        if let Some(applied) = &order.voucher {
            if let Err(e) = self.vouchers.redeem_voucher(&applied.code, &order.user_id).await {
                error!(order_id = %order.id, code = %applied.code, error = %e, "Voucher redemption failed after commit");
                self.notifier
                    .notify(
                        NotificationCreate::for_admin(
                            NotificationKind::System,
                            "Voucher not redeemed",
                            format!(
                                "Order {} kept a {:.2} discount from {} but the voucher refused redemption: {}",
                                order.id, applied.discount, applied.code, e
                            ),
                        )
                        .with_link(format!("/admin/orders/{}", order.id)),
                    )
                    .await;
            }
        }

        // Step 4: Notify
        self.notifier
            .notify(NotificationCreate::for_user(
                order.user_id.clone(),
                NotificationKind::Order,
                "Order placed",
                format!("Your order {} has been placed. Total: {:.2}", order.id, order.total),
            )
            .with_link(format!("/orders/{}", order.id)))
            .await;
        self.notifier
            .notify(NotificationCreate::for_admin(
                NotificationKind::Order,
                "New order",
                format!("Order {} ({}) for {:.2}", order.id, order.payment_method, order.total),
            ))
            .await;

        Ok(order)
    }

    /// Admin: moves an order to `to` along the state machine.
    #[instrument(skip(self, session))]
    pub async fn update_order_status(
        &self,
        session: &Session,
        order_id: String,
        to: OrderStatus,
    ) -> EngineResult<Order> {
        require_admin!(session, "updating order status");
        let at = self.clock.now();
        let result = self.inner.perform_action(order_id, OrderAction::Transition { to, at }).await;
        self.finish_transition(result).await
    }

    /// Customer self-service cancel. Only the owner, never Cash on Delivery,
    /// and only while `pending` or `processing`.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn cancel_order(&self, session: &Session, order_id: String) -> EngineResult<Order> {
        let at = self.clock.now();
        let action = OrderAction::CancelByCustomer {
            user_id: session.user_id.clone(),
            at,
        };
        let result = self.inner.perform_action(order_id, action).await;
        self.finish_transition(result).await
    }

    async fn finish_transition(&self, result: EngineResult<OrderActionResult>) -> EngineResult<Order> {
        let OrderActionResult::Transitioned { from, order } = result.map_err(|e| {
            warn!(error = %e, "Order transition refused");
            e
        })?;
        info!(order_id = %order.id, from = %from, to = %order.status, "Order status changed");

        self.notifier
            .notify(
                NotificationCreate::for_user(
                    order.user_id.clone(),
                    NotificationKind::Order,
                    format!("Order {}", order.status),
                    format!("Your order {} is now {}.", order.id, order.status),
                )
                .with_link(format!("/orders/{}", order.id)),
            )
            .await;
        Ok(order)
    }

    /// Admin escape hatch. Normal flow never deletes orders.
    #[instrument(skip(self, session))]
    pub async fn delete_order(&self, session: &Session, order_id: String) -> EngineResult<()> {
        require_admin!(session, "deleting an order");
        self.inner.delete(order_id).await
    }

    /// Fetches an order the session may see: its own, or any for an admin.
    pub async fn order_for(&self, session: &Session, order_id: String) -> EngineResult<Order> {
        let order = self.inner.fetch(order_id).await?;
        if !session.owns(&order.user_id) && !session.is_admin() {
            return Err(EngineError::Unauthorized(format!("order {} belongs to another user", order.id)));
        }
        Ok(order)
    }

    pub async fn orders_for_user(&self, user_id: String) -> EngineResult<Vec<Order>> {
        let mut orders = self.inner.find(move |o: &Order| o.user_id == user_id).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
