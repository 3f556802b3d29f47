//! Trade calculator: P/L, liquidation, DCA ladder and TP/SL targets.
//!
//! The pipeline runs strictly forward:
//! inputs → P/L → liquidation → DCA ladder → targets and risk.
//! Every stage is a pure function of the `TradeConfig`. Zero denominators
//! produce neutral values instead of errors, so `calculate` always returns
//! a result.

mod dca;
mod liquidation;
mod pnl;
mod targets;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::models::{RiskLevel, TradeConfig, TradeResult};

pub use dca::{average_entry, dca_levels, suggested_dca_amount, DCA_LOSS_CHECKPOINTS};
pub use liquidation::{compute_liquidation, MAINTENANCE_MARGIN_RATE};
pub use pnl::compute_pnl;
pub use targets::{compute_targets, liquidation_distance_pct};

const HUNDRED: Decimal = dec!(100);

/// Decimal places for USD amounts.
const USD_DP: u32 = 2;

/// Decimal places for prices and price-derived percentages.
const PRICE_DP: u32 = 6;

/// Division that yields zero for a zero divisor or on overflow.
fn div_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Multiplication that yields zero on overflow.
fn mul_or_zero(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

/// Liquidation distance rounded for output, and the risk bucket of the
/// exact distance.
fn assess_risk(market: Decimal, liquidation: Decimal) -> (Decimal, RiskLevel) {
    let distance = liquidation_distance_pct(market, liquidation);
    (distance.round_dp(PRICE_DP), RiskLevel::from_distance_pct(distance))
}

/// Runs the full calculation for one trade configuration.
pub struct TradeCalculator;

impl TradeCalculator {
    /// Calculate every output for `config`.
    ///
    /// Idempotent: identical configs always produce identical results.
    pub fn calculate(config: &TradeConfig) -> TradeResult {
        let side = config.position_side;
        let leverage = config.leverage;
        let entry = config.entry_price;
        let invested = config.invested_amount;

        let (profit, profit_percent) =
            compute_pnl(side, entry, config.market_price, invested, leverage);

        let liquidation_price = compute_liquidation(
            entry,
            leverage,
            config.wallet_balance,
            invested,
            side,
            config.margin_mode,
        );

        let levels = dca_levels(side, entry, leverage);
        let dca_amount =
            suggested_dca_amount(config.margin_mode, config.wallet_balance, invested);
        let average = average_entry(side, entry, leverage, invested, dca_amount);

        let targets = compute_targets(
            side,
            average,
            invested,
            leverage,
            config.take_profit_yield_pct,
            config.stop_loss_yield_pct,
            liquidation_price,
        );

        if config.market_price.is_zero() {
            warn!("Market price is zero, distance to liquidation is undefined");
        }
        let (liquidation_distance_pct, risk_level) =
            assess_risk(config.market_price, liquidation_price);

        debug!(
            side = %side,
            margin_mode = %config.margin_mode,
            leverage,
            profit = %profit,
            profit_percent = %profit_percent,
            liquidation = %liquidation_price,
            average_entry = %average,
            take_profit = %targets.take_profit,
            stop_loss = %targets.stop_loss,
            distance_pct = %liquidation_distance_pct,
            risk = %risk_level,
            "Trade calculated"
        );

        TradeResult {
            profit,
            profit_percent,
            liquidation_price,
            liquidation_distance_pct,
            risk_level,
            dca_levels: levels,
            suggested_dca_amount: dca_amount,
            average_entry_after_dca: average.round_dp(PRICE_DP),
            take_profit_price: targets.take_profit.round_dp(PRICE_DP),
            stop_loss_price: targets.stop_loss.round_dp(PRICE_DP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarginMode, PositionSide};

    fn cross_long() -> TradeConfig {
        TradeConfig::new(PositionSide::Long, MarginMode::Cross, 10, dec!(100))
            .with_wallet_balance(dec!(5000))
            .with_invested_amount(dec!(1000))
            .with_market_price(dec!(110))
    }

    fn isolated_short() -> TradeConfig {
        TradeConfig::new(PositionSide::Short, MarginMode::Isolated, 5, dec!(200))
            .with_invested_amount(dec!(500))
            .with_market_price(dec!(190))
    }

    #[test]
    fn test_cross_long_scenario() {
        let result = TradeCalculator::calculate(&cross_long());

        assert_eq!(result.profit, dec!(1000.00));
        assert_eq!(result.profit_percent, dec!(100.00));
        assert_eq!(result.liquidation_price, dec!(50.25));

        let prices: Vec<Decimal> = result.dca_levels.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(98), dec!(96), dec!(94)]);
        assert_eq!(result.suggested_dca_amount, dec!(1000));
        assert_eq!(result.average_entry_after_dca, dec!(97));

        assert_eq!(result.take_profit_price, dec!(100.88));
        assert_eq!(result.stop_loss_price, dec!(93.12));

        assert_eq!(result.liquidation_distance_pct, dec!(54.318182));
        assert_eq!(result.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_isolated_short_scenario() {
        let result = TradeCalculator::calculate(&isolated_short());

        assert_eq!(result.profit, dec!(125.00));
        assert_eq!(result.profit_percent, dec!(25.00));
        assert_eq!(result.liquidation_price, dec!(239.8));
        assert_eq!(result.suggested_dca_amount, Decimal::ZERO);
        assert_eq!(result.average_entry_after_dca, dec!(200));
        assert_eq!(result.take_profit_price, dec!(184));
        assert_eq!(result.stop_loss_price, dec!(216));
        assert_eq!(result.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_zero_entry_is_degenerate() {
        let config = TradeConfig {
            entry_price: Decimal::ZERO,
            ..cross_long()
        };
        let result = TradeCalculator::calculate(&config);

        assert_eq!(result.liquidation_price, Decimal::ZERO);
        assert_eq!(result.profit, Decimal::ZERO);
        assert_eq!(result.profit_percent, Decimal::ZERO);
        assert!(!result.has_liquidation_price());
    }

    #[test]
    fn test_zero_leverage_is_degenerate() {
        let config = TradeConfig {
            leverage: 0,
            ..isolated_short()
        };
        let result = TradeCalculator::calculate(&config);

        assert_eq!(result.liquidation_price, Decimal::ZERO);
        // No quantity at zero leverage, so no P/L either
        assert_eq!(result.profit, Decimal::ZERO);
        assert_eq!(result.profit_percent, Decimal::ZERO);
        assert!(result.stop_loss_price <= result.liquidation_price);
    }

    #[test]
    fn test_short_stop_loss_with_zero_investment() {
        let config = TradeConfig {
            invested_amount: Decimal::ZERO,
            ..isolated_short()
        };
        let result = TradeCalculator::calculate(&config);

        assert_eq!(result.liquidation_price, Decimal::ZERO);
        assert_eq!(result.stop_loss_price, Decimal::ZERO);
    }

    #[test]
    fn test_zero_everything_does_not_panic() {
        let config = TradeConfig {
            leverage: 0,
            market_price: Decimal::ZERO,
            ..TradeConfig::default()
        };
        let result = TradeCalculator::calculate(&config);

        assert_eq!(result.profit, Decimal::ZERO);
        assert_eq!(result.liquidation_price, Decimal::ZERO);
        assert_eq!(result.average_entry_after_dca, Decimal::ZERO);
        assert_eq!(result.liquidation_distance_pct, Decimal::ZERO);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_long_short_symmetry() {
        let long = TradeCalculator::calculate(&TradeConfig {
            margin_mode: MarginMode::Isolated,
            ..cross_long()
        });
        let short_same_move = TradeCalculator::calculate(&TradeConfig {
            position_side: PositionSide::Short,
            margin_mode: MarginMode::Isolated,
            ..cross_long()
        });
        let short_mirrored_move = TradeCalculator::calculate(&TradeConfig {
            position_side: PositionSide::Short,
            margin_mode: MarginMode::Isolated,
            market_price: dec!(90),
            ..cross_long()
        });

        assert_eq!(long.profit, -short_same_move.profit);
        assert_eq!(long.profit_percent, -short_same_move.profit_percent);
        assert_eq!(long.profit, short_mirrored_move.profit);
    }

    #[test]
    fn test_profit_percent_tracks_profit() {
        let configs = [
            cross_long(),
            isolated_short(),
            cross_long().with_market_price(dec!(97.3)),
            isolated_short().with_invested_amount(dec!(123.45)),
        ];

        for config in configs {
            let result = TradeCalculator::calculate(&config);
            let expected = (result.profit / config.invested_amount * dec!(100)).round_dp(2);
            assert!((result.profit_percent - expected).abs() <= dec!(0.01));
        }
    }

    #[test]
    fn test_stop_loss_never_beyond_liquidation() {
        for leverage in [1, 5, 20, 50, 125, 500] {
            for margin_mode in [MarginMode::Cross, MarginMode::Isolated] {
                let long = TradeCalculator::calculate(&TradeConfig {
                    leverage,
                    margin_mode,
                    stop_loss_yield_pct: dec!(150),
                    ..cross_long()
                });
                assert!(long.stop_loss_price >= long.liquidation_price);

                let short = TradeCalculator::calculate(&TradeConfig {
                    leverage,
                    margin_mode,
                    stop_loss_yield_pct: dec!(150),
                    ..isolated_short().with_wallet_balance(dec!(2000))
                });
                assert!(short.stop_loss_price <= short.liquidation_price);
            }
        }
    }

    #[test]
    fn test_high_leverage_is_high_risk() {
        let config = TradeConfig::new(PositionSide::Long, MarginMode::Isolated, 20, dec!(100))
            .with_invested_amount(dec!(100));
        let result = TradeCalculator::calculate(&config);

        // Liquidation at 95.025, under 5% away
        assert_eq!(result.liquidation_price, dec!(95.025));
        assert_eq!(result.liquidation_distance_pct, dec!(4.975));
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_moderate_leverage_is_medium_risk() {
        let config = TradeConfig::new(PositionSide::Long, MarginMode::Isolated, 8, dec!(100))
            .with_invested_amount(dec!(100));
        let result = TradeCalculator::calculate(&config);

        assert_eq!(result.liquidation_price, dec!(87.5625));
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_risk_uses_exact_distance() {
        // 9.9999996% away rounds to 10.000000 but is still under 10%
        let (distance, risk) = assess_risk(dec!(100000000), dec!(90000000.4));
        assert_eq!(distance, dec!(10));
        assert_eq!(risk, RiskLevel::High);

        let (distance, risk) = assess_risk(dec!(100), dec!(80));
        assert_eq!(distance, dec!(20));
        assert_eq!(risk, RiskLevel::Safe);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let config = cross_long().with_market_price(dec!(101.37));
        let first = TradeCalculator::calculate(&config);
        let second = TradeCalculator::calculate(&config);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
