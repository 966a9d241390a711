use chrono::{DateTime, Utc};

use crate::domain::{User, Voucher, VoucherRejection};

/// Checks an existing voucher against the order and the shopper.
///
/// Rules run in a fixed order and stop at the first failure: active flag,
/// validity window, usage headroom, minimum order, then per-user reuse.
/// Code lookup happens before this is called.
pub fn evaluate(
    voucher: &Voucher,
    order_total: f64,
    user: Option<&User>,
    now: DateTime<Utc>,
) -> Result<(), VoucherRejection> {
    if !voucher.is_active {
        return Err(VoucherRejection::Inactive);
    }
    if now < voucher.valid_from {
        return Err(VoucherRejection::NotYetValid);
    }
    if now > voucher.valid_until {
        return Err(VoucherRejection::Expired);
    }
    if !voucher.has_headroom() {
        return Err(VoucherRejection::UsageLimitReached);
    }
    if order_total < voucher.min_order_amount {
        return Err(VoucherRejection::MinimumNotMet {
            required: voucher.min_order_amount,
        });
    }
    if user.is_some_and(|u| u.has_used_voucher(&voucher.id)) {
        return Err(VoucherRejection::AlreadyUsedByUser);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiscountKind;
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn welcome20(now: DateTime<Utc>) -> Voucher {
        Voucher {
            id: "voucher_1".into(),
            code: "WELCOME20".into(),
            kind: DiscountKind::Percentage,
            value: 20.0,
            max_discount: None,
            min_order_amount: 1000.0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit: 1,
            used_count: 0,
            is_active: true,
            category: None,
        }
    }

    fn user_with(used: &[&str]) -> User {
        User {
            id: "user_1".into(),
            name: "Karim".into(),
            email: "karim@example.com".into(),
            phone: None,
            used_vouchers: used.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_accepts_eligible_voucher() {
        let now = Utc::now();
        assert_eq!(evaluate(&welcome20(now), 1500.0, Some(&user_with(&[])), now), Ok(()));
    }

    #[test]
    fn test_usage_limit_wins_regardless_of_total() {
        let now = Utc::now();
        let mut v = welcome20(now);
        v.used_count = 1;
        assert_eq!(evaluate(&v, 50.0, None, now), Err(VoucherRejection::UsageLimitReached));
        assert_eq!(evaluate(&v, 50_000.0, None, now), Err(VoucherRejection::UsageLimitReached));
    }

    #[test]
    fn test_window_bounds_have_distinct_reasons() {
        let now = Utc::now();
        let v = welcome20(now);
        assert_eq!(
            evaluate(&v, 1500.0, None, now - Duration::days(2)),
            Err(VoucherRejection::NotYetValid)
        );
        assert_eq!(
            evaluate(&v, 1500.0, None, now + Duration::days(2)),
            Err(VoucherRejection::Expired)
        );
    }

    #[test]
    fn test_inactive_checked_before_window() {
        let now = Utc::now();
        let mut v = welcome20(now);
        v.is_active = false;
        assert_eq!(
            evaluate(&v, 1500.0, None, now + Duration::days(5)),
            Err(VoucherRejection::Inactive)
        );
    }

    #[test]
    fn test_minimum_then_per_user() {
        let now = Utc::now();
        let v = welcome20(now);
        let used = user_with(&["voucher_1"]);
        assert_eq!(
            evaluate(&v, 999.0, Some(&used), now),
            Err(VoucherRejection::MinimumNotMet { required: 1000.0 })
        );
        assert_eq!(
            evaluate(&v, 1000.0, Some(&used), now),
            Err(VoucherRejection::AlreadyUsedByUser)
        );
        assert_eq!(evaluate(&v, 1000.0, None, now), Ok(()));
    }
}
