//! Liquidation price estimate for cross and isolated margin.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use super::{div_or_zero, mul_or_zero, PRICE_DP};
use crate::models::{MarginMode, PositionSide};

/// Maintenance margin rate applied to the backing collateral. Fixed, not user-configurable.
pub const MAINTENANCE_MARGIN_RATE: Decimal = dec!(0.005);

/// Price at which the position's margin is exhausted.
///
/// Cross margin counts the whole wallet balance as collateral, isolated
/// margin only the invested amount:
///
/// ```text
/// long:  entry * (1 - balance * (1 - mmr) / (amount * leverage))
/// short: entry * (1 + balance * (1 - mmr) / (amount * leverage))
/// ```
///
/// Returns 0 when the price is undefined (zero entry, leverage or amount).
/// A long whose collateral covers the whole notional cannot be liquidated,
/// so negative results are floored at 0.
pub fn compute_liquidation(
    entry: Decimal,
    leverage: u32,
    wallet_balance: Decimal,
    amount: Decimal,
    side: PositionSide,
    margin_mode: MarginMode,
) -> Decimal {
    if entry.is_zero() || leverage == 0 {
        warn!(entry = %entry, leverage, "Liquidation price undefined for zero entry or leverage");
        return Decimal::ZERO;
    }

    let notional_margin = mul_or_zero(amount, Decimal::from(leverage));
    if notional_margin.is_zero() {
        warn!("Liquidation price undefined for zero invested amount");
        return Decimal::ZERO;
    }

    let total_balance = match margin_mode {
        MarginMode::Cross => wallet_balance,
        MarginMode::Isolated => amount,
    };

    let usable = mul_or_zero(total_balance, Decimal::ONE - MAINTENANCE_MARGIN_RATE);
    let buffer = div_or_zero(usable, notional_margin);
    let liquidation = mul_or_zero(entry, Decimal::ONE - side.direction() * buffer);

    liquidation.max(Decimal::ZERO).round_dp(PRICE_DP)
}
