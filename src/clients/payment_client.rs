use chrono::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::{NotificationClient, OrderClient};
use crate::clock::SharedClock;
use crate::domain::{
    NotificationCreate, NotificationKind, Order, OrderDraft, OrderStatus, PaymentVerification,
    PaymentVerificationCreate, VerificationStatus, VerificationView,
};
use crate::error::{EngineError, EngineResult};
use crate::payment_actor::{PaymentAction, PaymentActionResult};
use crate::session::Session;

/// Client for the payment verification workflow.
///
/// A digital checkout parks its draft here until an admin approves it
/// within the review window. Approval creates the order.
#[derive(Clone)]
pub struct PaymentClient {
    inner: ResourceClient<PaymentVerification>,
    orders: OrderClient,
    notifier: NotificationClient,
    clock: SharedClock,
    ttl: Duration,
}

impl_client_methods!(PaymentClient, PaymentVerification, payment_verification);

impl PaymentClient {
    pub fn new(
        inner: ResourceClient<PaymentVerification>,
        orders: OrderClient,
        notifier: NotificationClient,
        clock: SharedClock,
        ttl: Duration,
    ) -> Self {
        Self {
            inner,
            orders,
            notifier,
            clock,
            ttl,
        }
    }

    #[instrument(skip(self, session, order), fields(user_id = %order.user_id))]
    pub async fn request_payment_verification(
        &self,
        session: &Session,
        order: OrderDraft,
        amount: f64,
        payer_phone: String,
        transaction_ref: Option<String>,
    ) -> EngineResult<VerificationView> {
        if !session.owns(&order.user_id) {
            return Err(EngineError::Unauthorized(format!(
                "cannot request verification for {}",
                order.user_id
            )));
        }

        let now = self.clock.now();
        let verification = self
            .inner
            .create(PaymentVerificationCreate {
                order,
                amount,
                payer_phone,
                transaction_ref,
                created_at: now,
                ttl: self.ttl,
            })
            .await?;
        info!(verification_id = %verification.id, expires_at = %verification.expires_at, "Payment verification opened");

        self.notifier
            .notify(
                NotificationCreate::for_admin(
                    NotificationKind::Payment,
                    "Payment awaiting verification",
                    format!(
                        "{} payment of {:.2} from {}",
                        verification.order.payment_method, verification.amount, verification.payer_phone
                    ),
                )
                .with_link(format!("/admin/payments/{}", verification.id)),
            )
            .await;

        Ok(VerificationView::at(verification, now))
    }

    /// Admin: approves a pending verification and creates its order in
    /// `processing`.
    ///
    /// # Errors
    /// `InvalidTransition` when the record is no longer pending, including when
    /// its review window has lapsed. A lapsed record is left stored as
    /// `expired`.
    #[instrument(skip(self, session))]
    pub async fn approve_payment_verification(
        &self,
        session: &Session,
        id: String,
    ) -> EngineResult<(PaymentVerification, Order)> {
        require_admin!(session, "approving a payment");
        let now = self.clock.now();

        // Step 1: Decide
        let mut verification = self.decide(id, PaymentAction::Approve { now }).await?;

        // Step 2: Create order
        let order = self
            .orders
            .commit(
                verification.order.clone(),
                OrderStatus::Processing,
                verification.transaction_ref.clone(),
            )
            .await
            .map_err(|e| {
                error!(verification_id = %verification.id, error = %e, "Order creation failed after approval");
                e
            })?;

        // Step 3: Link
        match self
            .inner
            .perform_action(verification.id.clone(), PaymentAction::LinkOrder { order_id: order.id.clone() })
            .await
        {
            Ok(_) => verification.order_id = Some(order.id.clone()),
            Err(e) => warn!(error = %e, "Failed to link order to verification"),
        }
        info!(verification_id = %verification.id, order_id = %order.id, "Payment approved");

        // Step 4: Notify
        self.notifier
            .notify(
                NotificationCreate::for_user(
                    verification.user_id.clone(),
                    NotificationKind::Payment,
                    "Payment approved",
                    format!("Your payment of {:.2} was approved. Order {} is processing.", verification.amount, order.id),
                )
                .with_link(format!("/orders/{}", order.id)),
            )
            .await;

        Ok((verification, order))
    }

    #[instrument(skip(self, session))]
    pub async fn reject_payment_verification(
        &self,
        session: &Session,
        id: String,
    ) -> EngineResult<PaymentVerification> {
        require_admin!(session, "rejecting a payment");
        let now = self.clock.now();
        let verification = self.decide(id, PaymentAction::Reject { now }).await?;
        info!(verification_id = %verification.id, "Payment rejected");

        self.notifier
            .notify(NotificationCreate::for_user(
                verification.user_id.clone(),
                NotificationKind::Payment,
                "Payment rejected",
                format!(
                    "Your payment of {:.2} could not be verified. Please contact support.",
                    verification.amount
                ),
            ))
            .await;
        Ok(verification)
    }

    async fn decide(&self, id: String, action: PaymentAction) -> EngineResult<PaymentVerification> {
        debug!("Sending request");
        match self.inner.perform_action(id, action).await {
            Ok(PaymentActionResult::Decided(v)) => Ok(v),
            Ok(other) => Err(EngineError::Storage(format!("unexpected payment action result {:?}", other))),
            Err(e) => {
                warn!(error = %e, "Payment decision refused");
                Err(e)
            }
        }
    }

    /// The record with its status evaluated against the clock.
    pub async fn get_payment_verification_view(&self, id: String) -> EngineResult<Option<VerificationView>> {
        let now = self.clock.now();
        Ok(self.inner.get(id).await?.map(|v| VerificationView::at(v, now)))
    }

    /// The user's verification still awaiting review, if any.
    pub async fn active_verification_for_user(&self, user_id: String) -> EngineResult<Option<VerificationView>> {
        let now = self.clock.now();
        let mut active = self
            .inner
            .find(move |v: &PaymentVerification| {
                v.user_id == user_id && v.status_at(now) == VerificationStatus::Pending
            })
            .await?;
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active.into_iter().next().map(|v| VerificationView::at(v, now)))
    }

    /// Admin queue: effectively pending records, oldest first.
    pub async fn pending_verifications(&self) -> EngineResult<Vec<VerificationView>> {
        let now = self.clock.now();
        let mut pending = self
            .inner
            .find(move |v: &PaymentVerification| v.status_at(now) == VerificationStatus::Pending)
            .await?;
        pending.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        Ok(pending.into_iter().map(|v| VerificationView::at(v, now)).collect())
    }

    /// Stores `expired` on every lapsed pending record and tells its user.
    /// Returns how many records changed.
    #[instrument(skip(self))]
    pub async fn expire_overdue(&self) -> EngineResult<usize> {
        let now = self.clock.now();
        let lapsed = self
            .inner
            .find(move |v: &PaymentVerification| {
                v.status == VerificationStatus::Pending && v.status_at(now) == VerificationStatus::Expired
            })
            .await?;

        let mut expired = 0;
        for verification in lapsed {
            match self.inner.perform_action(verification.id.clone(), PaymentAction::Expire { now }).await {
                Ok(PaymentActionResult::Swept { changed: true, .. }) => {
                    expired += 1;
                    self.notifier
                        .notify(NotificationCreate::for_user(
                            verification.user_id.clone(),
                            NotificationKind::Payment,
                            "Payment verification expired",
                            "Your payment was not verified in time. Please place the order again.",
                        ))
                        .await;
                }
                Ok(_) => {}
                Err(e) => warn!(verification_id = %verification.id, error = %e, "Failed to expire verification"),
            }
        }
        if expired > 0 {
            info!(expired, "Expired overdue payment verifications");
        }
        Ok(expired)
    }
}
