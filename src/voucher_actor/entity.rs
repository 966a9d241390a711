use crate::actor_framework::Entity;
use crate::domain::{normalize_code, DiscountKind, Voucher, VoucherCreate, VoucherPatch, VoucherRejection};
use crate::error::{EngineError, EngineResult};
use super::actions::{VoucherAction, VoucherActionResult};

impl Entity for Voucher {
    type Id = String;
    type CreatePayload = VoucherCreate;
    type Patch = VoucherPatch;
    type Action = VoucherAction;
    type ActionResult = VoucherActionResult;

    const KIND: &'static str = "voucher";

    fn id(&self) -> &String {
        &self.id
    }

    /// Builds a voucher, normalizing the code to upper case.
    ///
    /// # Errors
    /// `ValidationFailed` for an empty code, a non-positive value, a percentage
    /// above 100, an inverted validity window or a zero usage limit.
    fn from_create(id: String, payload: VoucherCreate) -> EngineResult<Self> {
        let code = normalize_code(&payload.code);
        if code.is_empty() {
            return Err(EngineError::ValidationFailed("voucher code required".into()));
        }
        if payload.value <= 0.0 {
            return Err(EngineError::ValidationFailed("discount value must be positive".into()));
        }
        if payload.kind == DiscountKind::Percentage && payload.value > 100.0 {
            return Err(EngineError::ValidationFailed("percentage cannot exceed 100".into()));
        }
        if payload.valid_from > payload.valid_until {
            return Err(EngineError::ValidationFailed("validity window is inverted".into()));
        }
        if payload.usage_limit == 0 {
            return Err(EngineError::ValidationFailed("usage limit must be at least 1".into()));
        }

        Ok(Self {
            id,
            code,
            kind: payload.kind,
            value: payload.value,
            max_discount: payload.max_discount,
            min_order_amount: payload.min_order_amount,
            valid_from: payload.valid_from,
            valid_until: payload.valid_until,
            usage_limit: payload.usage_limit,
            used_count: 0,
            is_active: payload.is_active,
            category: payload.category,
        })
    }

    /// Applies the patch only if every field in it is acceptable.
    fn on_update(&mut self, patch: VoucherPatch) -> EngineResult<()> {
        if patch.usage_limit == Some(0) {
            return Err(EngineError::ValidationFailed("usage limit must be at least 1".into()));
        }
        if matches!(patch.valid_until, Some(until) if until < self.valid_from) {
            return Err(EngineError::ValidationFailed("validity window is inverted".into()));
        }
        if matches!(patch.max_discount, Some(Some(cap)) if !cap.is_finite() || cap < 0.0) {
            return Err(EngineError::ValidationFailed("discount cap cannot be negative".into()));
        }

        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(usage_limit) = patch.usage_limit {
            self.usage_limit = usage_limit;
        }
        if let Some(valid_until) = patch.valid_until {
            self.valid_until = valid_until;
        }
        if let Some(max_discount) = patch.max_discount {
            self.max_discount = max_discount;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: VoucherAction) -> EngineResult<VoucherActionResult> {
        match action {
            VoucherAction::Redeem => {
                if !self.is_active {
                    return Err(EngineError::ValidationFailed(VoucherRejection::Inactive.to_string()));
                }
                if !self.has_headroom() {
                    return Err(EngineError::ValidationFailed(
                        VoucherRejection::UsageLimitReached.to_string(),
                    ));
                }
                self.used_count += 1;
                Ok(VoucherActionResult::Redeemed { used_count: self.used_count })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn create(usage_limit: u32) -> VoucherCreate {
        let now = Utc::now();
        VoucherCreate {
            code: " welcome20 ".into(),
            kind: DiscountKind::Percentage,
            value: 20.0,
            max_discount: Some(500.0),
            min_order_amount: 1000.0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit,
            is_active: true,
            category: None,
        }
    }

    #[test]
    fn test_code_is_normalized() {
        let v = Voucher::from_create("voucher_1".into(), create(5)).unwrap();
        assert_eq!(v.code, "WELCOME20");
        assert_eq!(v.used_count, 0);
    }

    #[test]
    fn test_rejects_bad_payloads() {
        let mut over = create(5);
        over.value = 120.0;
        assert!(Voucher::from_create("v".into(), over).is_err());

        assert!(Voucher::from_create("v".into(), create(0)).is_err());

        let mut inverted = create(5);
        std::mem::swap(&mut inverted.valid_from, &mut inverted.valid_until);
        assert!(Voucher::from_create("v".into(), inverted).is_err());
    }

    #[test]
    fn test_redeem_stops_at_limit() {
        let mut v = Voucher::from_create("voucher_1".into(), create(1)).unwrap();
        assert!(matches!(
            v.handle_action(VoucherAction::Redeem),
            Ok(VoucherActionResult::Redeemed { used_count: 1 })
        ));
        assert_eq!(
            v.handle_action(VoucherAction::Redeem).unwrap_err(),
            EngineError::ValidationFailed("usage limit reached".into())
        );
        assert_eq!(v.used_count, 1);
    }

    #[test]
    fn test_redeem_refused_when_inactive() {
        let mut v = Voucher::from_create("voucher_1".into(), create(3)).unwrap();
        v.on_update(VoucherPatch { is_active: Some(false), ..Default::default() }).unwrap();
        assert_eq!(
            v.handle_action(VoucherAction::Redeem).unwrap_err(),
            EngineError::ValidationFailed("no longer active".into())
        );
    }

    #[test]
    fn test_rejected_patch_leaves_voucher_untouched() {
        let mut v = Voucher::from_create("voucher_1".into(), create(5)).unwrap();
        let before = v.clone();

        let inverted = VoucherPatch {
            is_active: Some(false),
            usage_limit: Some(1),
            valid_until: Some(v.valid_from - Duration::days(5)),
            max_discount: None,
        };
        assert_eq!(
            v.on_update(inverted).unwrap_err(),
            EngineError::ValidationFailed("validity window is inverted".into())
        );
        assert_eq!(v, before);

        let zero_limit = VoucherPatch { is_active: Some(false), usage_limit: Some(0), ..Default::default() };
        assert!(v.on_update(zero_limit).is_err());
        let negative_cap = VoucherPatch { usage_limit: Some(2), max_discount: Some(Some(-1.0)), ..Default::default() };
        assert!(v.on_update(negative_cap).is_err());
        assert_eq!(v, before);
    }
}
