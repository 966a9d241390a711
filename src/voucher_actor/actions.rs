/// Custom actions for Voucher entities.
#[derive(Debug, Clone)]
pub enum VoucherAction {
    /// Consumes one use if the voucher is active and below its usage limit.
    ///
    /// The limit is re-checked here, at increment time, so concurrent
    /// redemptions can never push `used_count` past `usage_limit`.
    Redeem,
}

#[derive(Debug, Clone)]
pub enum VoucherActionResult {
    Redeemed { used_count: u32 },
}
