//! DCA ladder: averaging entries at fixed loss checkpoints.
//!
//! Each checkpoint assumes the previous ones already filled. The add-on size
//! is the same at every rung and is capped by the free wallet collateral.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{div_or_zero, mul_or_zero, HUNDRED, PRICE_DP, USD_DP};
use crate::models::{DcaLevel, MarginMode, PositionSide};

/// Loss on margin, in percent, at which each DCA entry triggers.
pub const DCA_LOSS_CHECKPOINTS: [Decimal; 3] = [dec!(20), dec!(40), dec!(60)];

/// Unrounded price at which the position has lost `loss_pct` of its margin.
///
/// The required price move is the loss divided by leverage. With zero
/// leverage there is no move and the entry price is returned.
pub fn checkpoint_price(side: PositionSide, entry: Decimal, leverage: u32, loss_pct: Decimal) -> Decimal {
    let move_fraction = div_or_zero(loss_pct / HUNDRED, Decimal::from(leverage));
    mul_or_zero(entry, Decimal::ONE - side.direction() * move_fraction)
}

/// The DCA ladder for a position, one level per checkpoint.
pub fn dca_levels(side: PositionSide, entry: Decimal, leverage: u32) -> Vec<DcaLevel> {
    DCA_LOSS_CHECKPOINTS
        .iter()
        .map(|&loss_pct| DcaLevel {
            trigger_loss_pct: loss_pct,
            price: checkpoint_price(side, entry, leverage, loss_pct).round_dp(PRICE_DP),
        })
        .collect()
}

/// Amount to add at each DCA level.
///
/// Under cross margin this is the free wallet balance, capped at the
/// original invested amount. Isolated margin has no spare collateral, so
/// nothing is suggested. Never negative, rounded to cents.
pub fn suggested_dca_amount(
    margin_mode: MarginMode,
    wallet_balance: Decimal,
    invested_amount: Decimal,
) -> Decimal {
    let max_dca_budget = match margin_mode {
        MarginMode::Cross => wallet_balance - invested_amount,
        MarginMode::Isolated => Decimal::ZERO,
    };

    max_dca_budget
        .min(invested_amount)
        .max(Decimal::ZERO)
        .round_dp(USD_DP)
}

/// Blended entry price after every DCA level fills.
///
/// The original entry is weighted by the invested amount and each DCA price
/// by `dca_amount`. If nothing is allocated at all the entry price is
/// returned unchanged.
pub fn average_entry(
    side: PositionSide,
    entry: Decimal,
    leverage: u32,
    invested_amount: Decimal,
    dca_amount: Decimal,
) -> Decimal {
    let fills = std::iter::once((entry, invested_amount)).chain(
        DCA_LOSS_CHECKPOINTS
            .iter()
            .map(|&loss_pct| (checkpoint_price(side, entry, leverage, loss_pct), dca_amount)),
    );

    let (weighted, total_amount) = fills.fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(weighted, total), (price, amount)| (weighted + mul_or_zero(price, amount), total + amount),
    );

    if total_amount.is_zero() {
        return entry;
    }

    div_or_zero(weighted, total_amount)
}
