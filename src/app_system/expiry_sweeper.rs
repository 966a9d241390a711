use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::clients::PaymentClient;
use crate::error::EngineError;

/// Periodically stores `expired` on lapsed payment verifications so that
/// admin queues and storage agree with what readers already see.
///
/// Stops once the payment actor is gone.
pub fn spawn_expiry_sweeper(payments: PaymentClient, every: Duration) -> JoinHandle<()> {
    tokio::spawn(run_sweeper(payments, every))
}

#[instrument(name = "expiry_sweeper", skip(payments))]
async fn run_sweeper(payments: PaymentClient, every: Duration) {
    info!("Expiry sweeper starting");
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match payments.expire_overdue().await {
            Ok(0) => debug!("Nothing to expire"),
            Ok(expired) => debug!(expired, "Sweep finished"),
            Err(EngineError::Storage(reason)) => {
                info!(%reason, "Payment actor gone, expiry sweeper stopping");
                break;
            }
            Err(e) => warn!(error = %e, "Expiry sweep failed"),
        }
    }
}
