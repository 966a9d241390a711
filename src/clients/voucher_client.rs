use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::UserClient;
use crate::clock::SharedClock;
use crate::domain::{normalize_code, Voucher, VoucherCheck, VoucherCreate, VoucherPatch, VoucherRejection};
use crate::error::{EngineError, EngineResult};
use crate::session::Session;
use crate::voucher_actor::{evaluate, VoucherAction, VoucherActionResult};

/// Client for voucher validation and redemption.
#[derive(Clone)]
pub struct VoucherClient {
    inner: ResourceClient<Voucher>,
    users: UserClient,
    clock: SharedClock,
}

impl_client_methods!(VoucherClient, Voucher, voucher);

impl VoucherClient {
    pub fn new(inner: ResourceClient<Voucher>, users: UserClient, clock: SharedClock) -> Self {
        Self { inner, users, clock }
    }

    /// Admin: adds a voucher. Codes are unique ignoring case.
    #[instrument(skip(self, session, voucher), fields(code = %voucher.code))]
    pub async fn create_voucher(&self, session: &Session, voucher: VoucherCreate) -> EngineResult<Voucher> {
        require_admin!(session, "creating a voucher");
        if self.find_by_code(&voucher.code).await?.is_some() {
            return Err(EngineError::ValidationFailed(format!(
                "voucher code {} already exists",
                normalize_code(&voucher.code)
            )));
        }
        let voucher = self.inner.create(voucher).await?;
        info!(voucher_id = %voucher.id, "Voucher created");
        Ok(voucher)
    }

    #[instrument(skip(self, session))]
    pub async fn update_voucher(&self, session: &Session, id: String, patch: VoucherPatch) -> EngineResult<Voucher> {
        require_admin!(session, "editing a voucher");
        self.inner.update(id, patch).await
    }

    pub async fn find_by_code(&self, code: &str) -> EngineResult<Option<Voucher>> {
        let code = code.to_string();
        let mut found = self.inner.find(move |v: &Voucher| v.matches_code(&code)).await?;
        Ok(found.pop())
    }

    /// Read-only eligibility check. Rule failures come back as an invalid
    /// `VoucherCheck`, not as an error.
    #[instrument(skip(self))]
    pub async fn validate_voucher(
        &self,
        code: &str,
        order_total: f64,
        user_id: Option<&str>,
    ) -> EngineResult<VoucherCheck> {
        debug!("Validating voucher");
        let Some(voucher) = self.find_by_code(code).await? else {
            info!("Unknown voucher code");
            return Ok(VoucherCheck::rejected(VoucherRejection::InvalidCode, None));
        };

        let user = match user_id {
            Some(id) => self.users.get_user(id.to_string()).await?,
            None => None,
        };

        let check = match evaluate(&voucher, order_total, user.as_ref(), self.clock.now()) {
            Ok(()) => VoucherCheck::accepted(voucher, order_total),
            Err(rejection) => VoucherCheck::rejected(rejection, Some(voucher)),
        };
        info!(valid = check.valid, reason = %check.reason, "Voucher checked");
        Ok(check)
    }

    /// Consumes one use of `code` for `user_id`.
    ///
    /// The per-user claim is taken first on the user record; the voucher then
    /// re-checks its limit as it increments. If the voucher refuses, the claim
    /// is released again.
    #[instrument(skip(self))]
    pub async fn redeem_voucher(&self, code: &str, user_id: &str) -> EngineResult<Voucher> {
        let voucher = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| EngineError::ValidationFailed(VoucherRejection::InvalidCode.to_string()))?;

        self.users.claim_voucher(user_id, &voucher.id).await?;

        match self.inner.perform_action(voucher.id.clone(), VoucherAction::Redeem).await {
            Ok(VoucherActionResult::Redeemed { used_count }) => {
                info!(voucher_id = %voucher.id, used_count, "Voucher redeemed");
                Ok(Voucher { used_count, ..voucher })
            }
            Err(e) => {
                warn!(error = %e, "Voucher refused redemption, releasing user claim");
                if let Err(release) = self.users.release_voucher(user_id, &voucher.id).await {
                    error!(error = %release, "Failed to release voucher claim");
                }
                Err(e)
            }
        }
    }
}
