use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserPatch, VoucherRejection};
use crate::error::{EngineError, EngineResult};
use super::actions::{UserAction, UserActionResult};

impl Entity for User {
    type Id = String;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = UserAction;
    type ActionResult = UserActionResult;

    const KIND: &'static str = "user";

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Errors
    /// Returns `ValidationFailed` when the email is empty.
    fn from_create(id: String, payload: UserCreate) -> EngineResult<Self> {
        if payload.email.trim().is_empty() {
            return Err(EngineError::ValidationFailed("Email required".to_string()));
        }
        Ok(Self {
            id,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            used_vouchers: Default::default(),
        })
    }

    /// Updates the user's profile information.
    ///
    /// # Fields Updated
    /// - `name`: User's display name
    /// - `email`: User's email address
    /// - `phone`: Contact number used for payment claims
    fn on_update(&mut self, patch: UserPatch) -> EngineResult<()> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        Ok(())
    }

    fn handle_action(&mut self, action: UserAction) -> EngineResult<UserActionResult> {
        match action {
            UserAction::ClaimVoucher(voucher_id) => {
                if !self.used_vouchers.insert(voucher_id) {
                    return Err(EngineError::ValidationFailed(
                        VoucherRejection::AlreadyUsedByUser.to_string(),
                    ));
                }
                Ok(UserActionResult::Claimed)
            }
            UserAction::ReleaseVoucher(voucher_id) => {
                Ok(UserActionResult::Released(self.used_vouchers.remove(&voucher_id)))
            }
        }
    }
}
