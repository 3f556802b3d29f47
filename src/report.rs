//! Text rendering of a calculation: trade summary, price levels, risk and DCA.
//!
//! Only formats fields of `TradeConfig` and `TradeResult`; no calculation
//! happens here.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{TradeConfig, TradeResult};

/// Width of the price axis in characters.
const AXIS_WIDTH: usize = 50;

/// What a price level marks on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Liquidation,
    Entry,
    Current,
    Dca,
    TakeProfit,
    StopLoss,
}

impl LevelKind {
    fn marker(&self) -> char {
        match self {
            LevelKind::Liquidation => 'X',
            LevelKind::Entry => 'E',
            LevelKind::Current => 'M',
            LevelKind::Dca => 'd',
            LevelKind::TakeProfit => '+',
            LevelKind::StopLoss => '-',
        }
    }
}

/// A labelled price on the trade visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    pub label: String,
    pub price: Decimal,
    pub kind: LevelKind,
}

/// Every level worth plotting, highest price first.
///
/// An undefined (zero) liquidation price is left out.
pub fn price_levels(config: &TradeConfig, result: &TradeResult) -> Vec<PriceLevel> {
    let mut levels = Vec::with_capacity(8);

    if result.has_liquidation_price() {
        levels.push(PriceLevel {
            label: "Liquidation".to_string(),
            price: result.liquidation_price,
            kind: LevelKind::Liquidation,
        });
    }
    levels.push(PriceLevel {
        label: "Entry".to_string(),
        price: config.entry_price,
        kind: LevelKind::Entry,
    });
    levels.push(PriceLevel {
        label: "Current".to_string(),
        price: config.market_price,
        kind: LevelKind::Current,
    });
    for (i, dca) in result.dca_levels.iter().enumerate() {
        levels.push(PriceLevel {
            label: format!("DCA {}", i + 1),
            price: dca.price,
            kind: LevelKind::Dca,
        });
    }
    levels.push(PriceLevel {
        label: "TP".to_string(),
        price: result.take_profit_price,
        kind: LevelKind::TakeProfit,
    });
    levels.push(PriceLevel {
        label: "SL".to_string(),
        price: result.stop_loss_price,
        kind: LevelKind::StopLoss,
    });

    levels.sort_by(|a, b| b.price.cmp(&a.price));
    levels
}

/// Visible price range: 5% margin below the lowest and above the highest level.
pub fn axis_range(levels: &[PriceLevel]) -> Option<(Decimal, Decimal)> {
    let min = levels.iter().map(|l| l.price).min()?;
    let max = levels.iter().map(|l| l.price).max()?;
    Some((min * dec!(0.95), max * dec!(1.05)))
}

/// Column of `price` on an axis of `AXIS_WIDTH` characters spanning `range`.
fn axis_column(price: Decimal, (low, high): (Decimal, Decimal)) -> usize {
    let span = high - low;
    if span <= Decimal::ZERO {
        return AXIS_WIDTH / 2;
    }

    let last = Decimal::from(AXIS_WIDTH - 1);
    let column = ((price - low) / span * last).round();
    column.to_usize().unwrap_or(0).min(AXIS_WIDTH - 1)
}

/// Round to cents for display. A `{:.2}` precision alone truncates a `Decimal`.
fn cents(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Human-readable report of one calculation.
pub struct TradeReport<'a> {
    config: &'a TradeConfig,
    result: &'a TradeResult,
}

impl<'a> TradeReport<'a> {
    pub fn new(config: &'a TradeConfig, result: &'a TradeResult) -> Self {
        Self { config, result }
    }

    fn liquidation_text(&self) -> String {
        if self.result.has_liquidation_price() {
            format!("${}", self.result.liquidation_price.normalize())
        } else {
            "n/a".to_string()
        }
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        let result = self.result;
        let outcome = if result.is_profitable() { "gain" } else { "loss" };

        writeln!(f, "=== Trade Summary ===")?;
        writeln!(f, "Position:            {}", config.position_side)?;
        writeln!(f, "Margin Mode:         {}", config.margin_mode)?;
        writeln!(f, "Leverage:            {}x", config.leverage)?;
        writeln!(f, "Entry Price:         ${}", config.entry_price.normalize())?;
        writeln!(f, "Current Price:       ${}", config.market_price.normalize())?;
        writeln!(f, "Profit:              ${:.2} ({})", cents(result.profit), outcome)?;
        writeln!(f, "Profit %:            {:.2}%", cents(result.profit_percent))?;
        writeln!(f, "Liquidation Price:   {}", self.liquidation_text())
    }

    fn write_levels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels = price_levels(self.config, self.result);

        writeln!(f, "=== Trade Price Levels ===")?;
        let Some(range) = axis_range(&levels) else {
            return Ok(());
        };

        writeln!(f, "{:<12} {:>14}  {:.2} .. {:.2}", "Level", "Price", cents(range.0), cents(range.1))?;
        for level in &levels {
            let mut axis = vec!['.'; AXIS_WIDTH];
            axis[axis_column(level.price, range)] = level.kind.marker();
            let axis: String = axis.into_iter().collect();

            writeln!(f, "{:<12} {:>14.2}  |{}|", level.label, cents(level.price), axis)?;
        }
        writeln!(f, "Distance to Liq:     {:.2}%", cents(self.result.liquidation_distance_pct))
    }

    fn write_risk(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;

        writeln!(f, "=== Risk & DCA Strategy ===")?;
        writeln!(
            f,
            "Risk Level:          {} (Liq is {:.2}% away)",
            result.risk_level, cents(result.liquidation_distance_pct)
        )?;
        writeln!(f, "Max Suggested DCA:   ${:.2}", cents(result.suggested_dca_amount))?;
        writeln!(f, "DCA Tip:             First entry around -20% loss, followed by more if needed.")?;
        writeln!(f, "DCA Entry Suggestions:")?;
        for (i, dca) in result.dca_levels.iter().enumerate() {
            writeln!(
                f,
                "  DCA {}  ${:.2} (-{}% loss)",
                i + 1,
                cents(dca.price),
                dca.trigger_loss_pct.normalize()
            )?;
        }
        writeln!(f, "Avg Entry After DCA: ${:.2}", cents(result.average_entry_after_dca))?;
        writeln!(f, "TP Target:           ${:.2}", cents(result.take_profit_price))?;
        writeln!(f, "SL Target:           ${:.2}", cents(result.stop_loss_price))
    }
}

impl fmt::Display for TradeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f)?;
        writeln!(f)?;
        self.write_levels(f)?;
        writeln!(f)?;
        self.write_risk(f)
    }
}
