use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{PaymentVerification, PaymentVerificationCreate, VerificationStatus};
use crate::error::{EngineError, EngineResult};
use super::actions::{PaymentAction, PaymentActionResult};

/// Claimed amounts within this distance of the order total are accepted.
const AMOUNT_TOLERANCE: f64 = 0.005;

impl Entity for PaymentVerification {
    type Id = String;
    type CreatePayload = PaymentVerificationCreate;
    type Patch = ();
    type Action = PaymentAction;
    type ActionResult = PaymentActionResult;

    const KIND: &'static str = "payment verification";

    fn id(&self) -> &String {
        &self.id
    }

    /// Opens a `pending` verification expiring `ttl` after `created_at`.
    ///
    /// # Errors
    /// `ValidationFailed` when the embedded order could never be created, the
    /// claimed amount differs from its total, the payer phone is blank, or the
    /// order is cash.
    fn from_create(id: String, params: PaymentVerificationCreate) -> EngineResult<Self> {
        if params.order.is_cash() {
            return Err(EngineError::ValidationFailed(
                "cash orders do not need payment verification".into(),
            ));
        }
        params.order.validate()?;
        if params.payer_phone.trim().is_empty() {
            return Err(EngineError::ValidationFailed("payer phone required".into()));
        }
        let expected = params.order.total();
        if (params.amount - expected).abs() > AMOUNT_TOLERANCE {
            return Err(EngineError::ValidationFailed(format!(
                "claimed amount {:.2} does not match order total {:.2}",
                params.amount, expected
            )));
        }

        Ok(Self {
            id,
            user_id: params.order.user_id.clone(),
            order: params.order,
            amount: params.amount,
            payer_phone: params.payer_phone,
            transaction_ref: params.transaction_ref,
            status: VerificationStatus::Pending,
            created_at: params.created_at,
            expires_at: params.created_at + params.ttl,
            processed_at: None,
            order_id: None,
        })
    }

    fn on_update(&mut self, _patch: ()) -> EngineResult<()> {
        Ok(())
    }

    fn handle_action(&mut self, action: PaymentAction) -> EngineResult<PaymentActionResult> {
        match action {
            PaymentAction::Approve { now } => {
                self.decide(VerificationStatus::Approved, now, "approve")
            }
            PaymentAction::Reject { now } => {
                self.decide(VerificationStatus::Rejected, now, "reject")
            }
            PaymentAction::Expire { now } => {
                let changed = self.materialize_expiry(now);
                Ok(PaymentActionResult::Swept {
                    status: self.status,
                    changed,
                })
            }
            PaymentAction::LinkOrder { order_id } => {
                if self.status != VerificationStatus::Approved {
                    return Err(EngineError::invalid_transition(Self::KIND, self.status, "link an order to"));
                }
                self.order_id = Some(order_id);
                Ok(PaymentActionResult::Linked)
            }
        }
    }
}

impl PaymentVerification {
    fn decide(
        &mut self,
        to: VerificationStatus,
        now: DateTime<Utc>,
        verb: &str,
    ) -> EngineResult<PaymentActionResult> {
        // A lapsed record is stored as expired even though the decision fails.
        self.materialize_expiry(now);
        if self.status != VerificationStatus::Pending {
            return Err(EngineError::invalid_transition(Self::KIND, self.status, verb));
        }
        self.status = to;
        self.processed_at = Some(now);
        Ok(PaymentActionResult::Decided(self.clone()))
    }

    fn materialize_expiry(&mut self, now: DateTime<Utc>) -> bool {
        let effective = self.status_at(now);
        if effective == self.status {
            return false;
        }
        self.status = effective;
        self.processed_at = Some(self.expires_at);
        true
    }
}
