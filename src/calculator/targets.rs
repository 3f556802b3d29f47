//! Take-profit / stop-loss targets and distance to liquidation.

use rust_decimal::Decimal;
use tracing::debug;

use super::pnl::position_quantity;
use super::{div_or_zero, mul_or_zero, HUNDRED};
use crate::models::PositionSide;

/// Take-profit and stop-loss trigger prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
}

/// Price move that realizes `yield_pct` of `invested_amount` across a
/// position of `quantity` contracts. Zero for an empty position.
pub fn price_delta(yield_pct: Decimal, invested_amount: Decimal, quantity: Decimal) -> Decimal {
    let dollars = mul_or_zero(yield_pct / HUNDRED, invested_amount);
    div_or_zero(dollars, quantity)
}

/// Derive TP/SL prices from yield targets on invested capital.
///
/// Targets are measured from the blended average entry. The stop-loss never
/// sits beyond the liquidation price, and neither target goes below 0.
pub fn compute_targets(
    side: PositionSide,
    average_entry: Decimal,
    invested_amount: Decimal,
    leverage: u32,
    take_profit_yield_pct: Decimal,
    stop_loss_yield_pct: Decimal,
    liquidation_price: Decimal,
) -> Targets {
    let quantity = position_quantity(invested_amount, leverage, average_entry);
    let tp_delta = price_delta(take_profit_yield_pct, invested_amount, quantity);
    let sl_delta = price_delta(stop_loss_yield_pct, invested_amount, quantity);

    let direction = side.direction();
    let take_profit = average_entry + direction * tp_delta;
    let mut stop_loss = average_entry - direction * sl_delta;

    match side {
        PositionSide::Long if stop_loss <= liquidation_price => {
            debug!(stop_loss = %stop_loss, liquidation = %liquidation_price, "Clamping long stop-loss to liquidation");
            stop_loss = liquidation_price;
        }
        PositionSide::Short if stop_loss >= liquidation_price => {
            debug!(stop_loss = %stop_loss, liquidation = %liquidation_price, "Clamping short stop-loss to liquidation");
            stop_loss = liquidation_price;
        }
        _ => {}
    }

    Targets {
        take_profit: take_profit.max(Decimal::ZERO),
        stop_loss: stop_loss.max(Decimal::ZERO),
    }
}

/// Distance from the market price to liquidation, in percent of the market
/// price. Zero when there is no market price.
pub fn liquidation_distance_pct(market: Decimal, liquidation: Decimal) -> Decimal {
    let distance = div_or_zero((market - liquidation).abs(), market);
    mul_or_zero(distance, HUNDRED)
}
