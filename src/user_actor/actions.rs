/// Custom actions for User entities.
#[derive(Debug, Clone)]
pub enum UserAction {
    /// Adds a voucher id to `used_vouchers`.
    ///
    /// # Errors
    /// Fails if the user already redeemed that voucher.
    ClaimVoucher(String),
    /// Removes a claim made by a redeem that was then refused by the voucher.
    ReleaseVoucher(String),
}

#[derive(Debug, Clone)]
pub enum UserActionResult {
    Claimed,
    Released(bool),
}
