use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus};
use crate::error::{EngineError, EngineResult};
use super::actions::{OrderAction, OrderActionResult};
use super::lifecycle::{can_cancel, check_transition};

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = (); // Status moves only through actions
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    const KIND: &'static str = "order";

    fn id(&self) -> &String {
        &self.id
    }

    /// Materializes an order from a draft.
    ///
    /// Totals are computed here from the line items, so a stored order always
    /// satisfies `total == subtotal + delivery_charge - discount` (floored at 0).
    ///
    /// # Errors
    /// `ValidationFailed` for an empty cart, a zero quantity or a negative price.
    fn from_create(id: String, params: OrderCreate) -> EngineResult<Self> {
        let draft = params.draft;
        draft.validate()?;

        let subtotal = draft.subtotal();
        let total = draft.total();
        Ok(Self {
            id,
            user_id: draft.user_id,
            items: draft.items,
            subtotal,
            delivery_charge: draft.delivery_charge,
            voucher: draft.voucher,
            total,
            shipping: draft.shipping,
            payment_method: draft.payment_method,
            transaction_ref: params.transaction_ref,
            status: params.status,
            created_at: params.created_at,
            updated_at: params.created_at,
        })
    }

    fn on_update(&mut self, _patch: ()) -> EngineResult<()> {
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> EngineResult<OrderActionResult> {
        match action {
            OrderAction::Transition { to, at } => {
                check_transition(self.status, to)?;
                Ok(self.move_to(to, at))
            }
            OrderAction::CancelByCustomer { user_id, at } => {
                if self.user_id != user_id {
                    return Err(EngineError::Unauthorized(format!(
                        "order {} does not belong to {}",
                        self.id, user_id
                    )));
                }
                if !can_cancel(self) {
                    return Err(EngineError::InvalidTransition(format!(
                        "order {} cannot be cancelled by the customer ({}, {})",
                        self.id, self.payment_method, self.status
                    )));
                }
                Ok(self.move_to(OrderStatus::Cancelled, at))
            }
        }
    }
}

impl Order {
    fn move_to(&mut self, to: OrderStatus, at: chrono::DateTime<chrono::Utc>) -> OrderActionResult {
        let from = self.status;
        self.status = to;
        self.updated_at = at;
        OrderActionResult::Transitioned {
            from,
            order: self.clone(),
        }
    }
}
