//! Calculation output: P/L, liquidation, DCA ladder, targets and risk.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Distance to liquidation (percent of market price) at or above which a
/// position counts as safe.
pub const SAFE_DISTANCE_PCT: Decimal = dec!(20);

/// Distance to liquidation at or above which a position counts as medium risk.
pub const MEDIUM_DISTANCE_PCT: Decimal = dec!(10);

/// Risk bucket derived from how far the market is from liquidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a liquidation distance. Lower bounds are inclusive, so exact
    /// boundary values land in the safer bucket.
    pub fn from_distance_pct(distance_pct: Decimal) -> Self {
        if distance_pct >= SAFE_DISTANCE_PCT {
            RiskLevel::Safe
        } else if distance_pct >= MEDIUM_DISTANCE_PCT {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rung of the DCA ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcaLevel {
    /// Loss on margin (percent) at which this entry triggers
    pub trigger_loss_pct: Decimal,

    /// Price at which that loss is reached
    pub price: Decimal,
}

/// Everything derived from one `TradeConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeResult {
    // === P/L ===
    /// Unrealized profit in USD (negative for a loss)
    pub profit: Decimal,

    /// Profit as a percentage of invested amount
    pub profit_percent: Decimal,

    // === Liquidation ===
    /// Price at which the position is force-closed (0 if undefined)
    pub liquidation_price: Decimal,

    /// Distance from market price to liquidation, in percent of market price
    pub liquidation_distance_pct: Decimal,

    /// Bucket derived from `liquidation_distance_pct`
    pub risk_level: RiskLevel,

    // === DCA ===
    /// Suggested averaging entries, ordered by loss checkpoint
    pub dca_levels: Vec<DcaLevel>,

    /// Amount to add at each DCA level
    pub suggested_dca_amount: Decimal,

    /// Blended entry price once every DCA level has filled
    pub average_entry_after_dca: Decimal,

    // === Targets ===
    /// Take-profit price; floored at 0 when a short's target move exceeds the entry
    pub take_profit_price: Decimal,

    /// Stop-loss price, never beyond `liquidation_price`
    pub stop_loss_price: Decimal,
}

impl TradeResult {
    pub fn is_profitable(&self) -> bool {
        self.profit >= Decimal::ZERO
    }

    /// Whether a liquidation price could be computed at all.
    pub fn has_liquidation_price(&self) -> bool {
        self.liquidation_price > Decimal::ZERO
    }
}
