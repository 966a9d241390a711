use tracing::{info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::{NotificationClient, OrderClient};
use crate::clock::SharedClock;
use crate::domain::{
    NotificationCreate, NotificationKind, OrderStatus, RefundCreate, RefundRequest, RefundStatus,
};
use crate::error::{EngineError, EngineResult};
use crate::refund_actor::{RefundAction, RefundActionResult};
use crate::session::Session;

/// Client for customer refund requests and their admin review.
#[derive(Clone)]
pub struct RefundClient {
    inner: ResourceClient<RefundRequest>,
    orders: OrderClient,
    notifier: NotificationClient,
    clock: SharedClock,
}

impl_client_methods!(RefundClient, RefundRequest, refund_request);

impl RefundClient {
    pub fn new(
        inner: ResourceClient<RefundRequest>,
        orders: OrderClient,
        notifier: NotificationClient,
        clock: SharedClock,
    ) -> Self {
        Self {
            inner,
            orders,
            notifier,
            clock,
        }
    }

    /// Files a refund for a delivered order the caller owns. The amount is
    /// the order total.
    ///
    /// # Errors
    /// * `Unauthorized` if the order belongs to someone else.
    /// * `InvalidTransition` if the order is not `delivered`.
    /// * `ValidationFailed` if the order already has an open refund, or the
    ///   reason is blank.
    #[instrument(skip(self, session, reason), fields(user_id = %session.user_id))]
    pub async fn create_refund_request(
        &self,
        session: &Session,
        order_id: String,
        reason: String,
    ) -> EngineResult<RefundRequest> {
        let order = self.orders.order_for(session, order_id).await?;
        if !session.owns(&order.user_id) {
            return Err(EngineError::Unauthorized(format!(
                "only the customer can request a refund for {}",
                order.id
            )));
        }
        if order.status != OrderStatus::Delivered {
            return Err(EngineError::InvalidTransition(format!(
                "order {} is {}; refunds require a delivered order",
                order.id, order.status
            )));
        }

        let open_for = order.id.clone();
        let open = self
            .inner
            .find(move |r: &RefundRequest| r.order_id == open_for && r.status != RefundStatus::Rejected)
            .await?;
        if !open.is_empty() {
            return Err(EngineError::ValidationFailed(format!(
                "order {} already has a refund request",
                order.id
            )));
        }

        let refund = self
            .inner
            .create(RefundCreate {
                order_id: order.id.clone(),
                user_id: order.user_id.clone(),
                reason,
                amount: order.total,
                created_at: self.clock.now(),
            })
            .await?;
        info!(refund_id = %refund.id, order_id = %order.id, amount = refund.amount, "Refund requested");

        self.notifier
            .notify(
                NotificationCreate::for_admin(
                    NotificationKind::Refund,
                    "Refund requested",
                    format!("Refund of {:.2} requested for order {}", refund.amount, order.id),
                )
                .with_link(format!("/admin/refunds/{}", refund.id)),
            )
            .await;
        Ok(refund)
    }

    #[instrument(skip(self, session, admin_notes))]
    pub async fn approve_refund(
        &self,
        session: &Session,
        id: String,
        admin_notes: Option<String>,
    ) -> EngineResult<RefundRequest> {
        require_admin!(session, "approving a refund");
        self.process(id, RefundStatus::Approved, admin_notes).await
    }

    #[instrument(skip(self, session, admin_notes))]
    pub async fn reject_refund(
        &self,
        session: &Session,
        id: String,
        admin_notes: Option<String>,
    ) -> EngineResult<RefundRequest> {
        require_admin!(session, "rejecting a refund");
        self.process(id, RefundStatus::Rejected, admin_notes).await
    }

    /// Applies the decision once. Repeating it on a processed refund returns
    /// the record unchanged and sends nothing.
    async fn process(
        &self,
        id: String,
        to: RefundStatus,
        admin_notes: Option<String>,
    ) -> EngineResult<RefundRequest> {
        let action = RefundAction::Process {
            to,
            admin_notes,
            at: self.clock.now(),
        };
        match self.inner.perform_action(id, action).await? {
            RefundActionResult::Unchanged(refund) => {
                warn!(refund_id = %refund.id, status = %refund.status, "Refund already processed");
                Ok(refund)
            }
            RefundActionResult::Processed(refund) => {
                info!(refund_id = %refund.id, status = %refund.status, "Refund processed");
                let message = match &refund.admin_notes {
                    Some(notes) => format!("Your refund for order {} was {}. {}", refund.order_id, refund.status, notes),
                    None => format!("Your refund for order {} was {}.", refund.order_id, refund.status),
                };
                self.notifier
                    .notify(NotificationCreate::for_user(
                        refund.user_id.clone(),
                        NotificationKind::Refund,
                        format!("Refund {}", refund.status),
                        message,
                    ))
                    .await;
                Ok(refund)
            }
        }
    }

    pub async fn refunds_for_user(&self, user_id: String) -> EngineResult<Vec<RefundRequest>> {
        let mut refunds = self.inner.find(move |r: &RefundRequest| r.user_id == user_id).await?;
        refunds.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(refunds)
    }
}
