//! Profit and loss of a leveraged position at the current market price.

use rust_decimal::Decimal;
use tracing::warn;

use super::{div_or_zero, mul_or_zero, HUNDRED, USD_DP};
use crate::models::PositionSide;

/// Position size in contracts for `amount` of margin at `leverage`.
pub fn position_quantity(amount: Decimal, leverage: u32, price: Decimal) -> Decimal {
    div_or_zero(mul_or_zero(amount, Decimal::from(leverage)), price)
}

/// Compute `(profit, profit_percent)` for a position.
///
/// Profit is in USD, the percentage is relative to the invested amount.
/// Both are rounded to cents. A zero entry price yields `(0, 0)`, and a zero
/// invested amount yields a zero percentage.
pub fn compute_pnl(
    side: PositionSide,
    entry: Decimal,
    market: Decimal,
    amount: Decimal,
    leverage: u32,
) -> (Decimal, Decimal) {
    if entry.is_zero() {
        warn!("Entry price is zero, P/L is undefined");
        return (Decimal::ZERO, Decimal::ZERO);
    }

    let quantity = position_quantity(amount, leverage, entry);
    let price_move = (market - entry) * side.direction();
    let profit = mul_or_zero(price_move, quantity);

    let profit_percent = mul_or_zero(div_or_zero(profit, amount), HUNDRED);

    (profit.round_dp(USD_DP), profit_percent.round_dp(USD_DP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_long_in_profit() {
        assert_eq!(position_quantity(dec!(1000), 10, dec!(100)), dec!(100));

        let (profit, pct) = compute_pnl(PositionSide::Long, dec!(100), dec!(110), dec!(1000), 10);
        assert_eq!(profit, dec!(1000.00));
        assert_eq!(pct, dec!(100.00));
    }

    #[test]
    fn test_short_in_profit() {
        assert_eq!(position_quantity(dec!(500), 5, dec!(200)), dec!(12.5));

        let (profit, pct) = compute_pnl(PositionSide::Short, dec!(200), dec!(190), dec!(500), 5);
        assert_eq!(profit, dec!(125.00));
        assert_eq!(pct, dec!(25.00));
    }

    #[test]
    fn test_long_in_loss() {
        // 20x on $250 at 50 000, market drops 1% -> 20% loss on margin
        let (profit, pct) =
            compute_pnl(PositionSide::Long, dec!(50000), dec!(49500), dec!(250), 20);
        assert_eq!(profit, dec!(-50.00));
        assert_eq!(pct, dec!(-20.00));
    }

    #[test]
    fn test_zero_entry_is_neutral() {
        let (profit, pct) = compute_pnl(PositionSide::Long, Decimal::ZERO, dec!(110), dec!(1000), 10);
        assert_eq!(profit, Decimal::ZERO);
        assert_eq!(pct, Decimal::ZERO);
    }

    #[test]
    fn test_zero_amount_is_neutral() {
        let (profit, pct) = compute_pnl(PositionSide::Short, dec!(200), dec!(150), Decimal::ZERO, 5);
        assert_eq!(profit, Decimal::ZERO);
        assert_eq!(pct, Decimal::ZERO);
    }

    #[test]
    fn test_rounds_to_cents() {
        // quantity = 300 / 7 = 42.857142...; profit = 42.857142... * 1
        let (profit, pct) = compute_pnl(PositionSide::Long, dec!(7), dec!(8), dec!(100), 3);
        assert_eq!(profit, dec!(42.86));
        assert_eq!(pct, dec!(42.86));
    }
}
