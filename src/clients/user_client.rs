use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserPatch};
use crate::error::EngineResult;
use crate::user_actor::{UserAction, UserActionResult};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_client_methods!(UserClient, User, user);

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, user), fields(user_email = %user.email))]
    pub async fn register_user(&self, user: UserCreate) -> EngineResult<User> {
        debug!("Sending request");
        let user = self.inner.create(user).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: String, patch: UserPatch) -> EngineResult<User> {
        debug!("Sending request");
        self.inner.update(id, patch).await
    }

    /// Like `get_user`, but a missing user is `NotFound`.
    pub async fn require_user(&self, id: &str) -> EngineResult<User> {
        self.inner.fetch(id.to_string()).await
    }

    #[instrument(skip(self))]
    pub(crate) async fn claim_voucher(&self, user_id: &str, voucher_id: &str) -> EngineResult<()> {
        debug!("Sending request");
        self.inner
            .perform_action(user_id.to_string(), UserAction::ClaimVoucher(voucher_id.to_string()))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    pub(crate) async fn release_voucher(&self, user_id: &str, voucher_id: &str) -> EngineResult<()> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(user_id.to_string(), UserAction::ReleaseVoucher(voucher_id.to_string()))
            .await?
        {
            UserActionResult::Released(true) => Ok(()),
            _ => {
                warn!("No voucher claim to release");
                Ok(())
            }
        }
    }
}
