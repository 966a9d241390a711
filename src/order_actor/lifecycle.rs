use crate::domain::{Order, OrderStatus, CASH_ON_DELIVERY};
use crate::error::{EngineError, EngineResult};

/// Customer self-service cancellation gate.
///
/// Cash on Delivery orders are never self-cancellable. Other orders can be
/// cancelled while `pending` or `processing`.
pub fn can_cancel(order: &Order) -> bool {
    order.payment_method != CASH_ON_DELIVERY && order.status.is_cancellable()
}

/// Allowed moves: one step forward along
/// `pending -> processing -> shipped -> delivered`, or `cancelled` from
/// `pending`/`processing`.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> EngineResult<()> {
    let allowed = match to {
        OrderStatus::Cancelled => from.is_cancellable(),
        _ => from.next() == Some(to),
    };
    if allowed {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition(format!(
            "order cannot move from {} to {}",
            from, to
        )))
    }
}
