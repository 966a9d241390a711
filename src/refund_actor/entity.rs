use crate::actor_framework::Entity;
use crate::domain::{RefundCreate, RefundRequest, RefundStatus};
use crate::error::{EngineError, EngineResult};
use super::actions::{RefundAction, RefundActionResult};

impl Entity for RefundRequest {
    type Id = String;
    type CreatePayload = RefundCreate;
    type Patch = ();
    type Action = RefundAction;
    type ActionResult = RefundActionResult;

    const KIND: &'static str = "refund request";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, params: RefundCreate) -> EngineResult<Self> {
        if params.reason.trim().is_empty() {
            return Err(EngineError::ValidationFailed("refund reason required".into()));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            user_id: params.user_id,
            reason: params.reason,
            amount: params.amount,
            status: RefundStatus::Pending,
            admin_notes: None,
            created_at: params.created_at,
            processed_at: None,
        })
    }

    fn on_update(&mut self, _patch: ()) -> EngineResult<()> {
        Ok(())
    }

    fn handle_action(&mut self, action: RefundAction) -> EngineResult<RefundActionResult> {
        match action {
            RefundAction::Process { to, admin_notes, at } => {
                if to == RefundStatus::Pending {
                    return Err(EngineError::invalid_transition(Self::KIND, self.status, "reopen"));
                }
                if self.status.is_terminal() {
                    return Ok(RefundActionResult::Unchanged(self.clone()));
                }
                self.status = to;
                self.admin_notes = admin_notes;
                self.processed_at = Some(at);
                Ok(RefundActionResult::Processed(self.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending() -> RefundRequest {
        RefundRequest::from_create(
            "refund_1".into(),
            RefundCreate {
                order_id: "order_1".into(),
                user_id: "user_1".into(),
                reason: "Wrong size".into(),
                amount: 1560.0,
                created_at: Utc::now(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_process_is_terminal_and_idempotent() {
        let mut refund = pending();
        let at = Utc::now();
        let first = refund
            .handle_action(RefundAction::Process {
                to: RefundStatus::Approved,
                admin_notes: Some("bKash reversal done".into()),
                at,
            })
            .unwrap();
        assert!(matches!(first, RefundActionResult::Processed(ref r) if r.status == RefundStatus::Approved));

        let second = refund
            .handle_action(RefundAction::Process {
                to: RefundStatus::Rejected,
                admin_notes: None,
                at: Utc::now(),
            })
            .unwrap();
        assert!(matches!(second, RefundActionResult::Unchanged(_)));
        assert_eq!(refund.status, RefundStatus::Approved);
        assert_eq!(refund.processed_at, Some(at));
        assert_eq!(refund.admin_notes.as_deref(), Some("bKash reversal done"));
    }

    #[test]
    fn test_blank_reason_rejected() {
        let result = RefundRequest::from_create(
            "refund_1".into(),
            RefundCreate {
                order_id: "order_1".into(),
                user_id: "user_1".into(),
                reason: " ".into(),
                amount: 10.0,
                created_at: Utc::now(),
            },
        );
        assert!(result.is_err());
    }
}
