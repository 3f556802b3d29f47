//! Trade configuration: the full set of inputs for one calculation.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Lowest leverage accepted from user input.
pub const MIN_LEVERAGE: u32 = 1;

/// Highest leverage accepted from user input.
pub const MAX_LEVERAGE: u32 = 500;

/// Direction of the futures position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    #[default]
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "Long",
            PositionSide::Short => "Short",
        }
    }

    /// +1 for Long, -1 for Short: the sign of the price move that pays off.
    pub fn direction(&self) -> Decimal {
        match self {
            PositionSide::Long => Decimal::ONE,
            PositionSide::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How collateral backs the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    /// The whole wallet balance backs the position
    #[default]
    Cross,
    /// Only the invested amount backs the position
    Isolated,
}

impl MarginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginMode::Cross => "Cross",
            MarginMode::Isolated => "Isolated",
        }
    }
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for a single trade calculation.
///
/// Every engine receives its values from here explicitly; nothing is read
/// from ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Long or Short
    pub position_side: PositionSide,

    /// Cross or Isolated margin
    pub margin_mode: MarginMode,

    /// Leverage multiplier (1 to 500)
    pub leverage: u32,

    /// Wallet balance in USD, only used under cross margin
    pub wallet_balance: Decimal,

    /// Margin committed to this trade in USD
    pub invested_amount: Decimal,

    /// Price the position was opened at
    pub entry_price: Decimal,

    /// Current market price
    pub market_price: Decimal,

    /// Target return on invested capital, in percent
    pub take_profit_yield_pct: Decimal,

    /// Maximum acceptable loss on invested capital, in percent
    pub stop_loss_yield_pct: Decimal,
}

/// A config loaded from JSON.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: TradeConfig,

    /// Whether the document set `market_price` itself. Without it the market
    /// price follows the entry price.
    pub has_market_price: bool,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            position_side: PositionSide::Long,
            margin_mode: MarginMode::Cross,
            leverage: 20,
            wallet_balance: Decimal::ZERO,
            invested_amount: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            market_price: Decimal::ZERO,
            take_profit_yield_pct: dec!(40),
            stop_loss_yield_pct: dec!(40),
        }
    }
}

impl TradeConfig {
    /// Create a config for a position opened at `entry_price`.
    ///
    /// The market price starts out equal to the entry price.
    pub fn new(position_side: PositionSide, margin_mode: MarginMode, leverage: u32, entry_price: Decimal) -> Self {
        Self {
            position_side,
            margin_mode,
            leverage,
            entry_price,
            market_price: entry_price,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults,
    /// except a missing market price, which follows the entry price.
    pub fn read_file(path: impl AsRef<Path>) -> Result<ConfigFile> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse_json(&contents)
    }

    fn parse_json(json: &str) -> Result<ConfigFile> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Failed to parse config JSON")?;
        let has_market_price = value.get("market_price").is_some();

        let mut config: TradeConfig =
            serde_json::from_value(value).context("Invalid trade config")?;
        if !has_market_price {
            config.market_price = config.entry_price;
        }
        Ok(ConfigFile {
            config,
            has_market_price,
        })
    }

    pub fn with_wallet_balance(mut self, balance: Decimal) -> Self {
        self.wallet_balance = balance;
        self
    }

    pub fn with_invested_amount(mut self, amount: Decimal) -> Self {
        self.invested_amount = amount;
        self
    }

    pub fn with_market_price(mut self, price: Decimal) -> Self {
        self.market_price = price;
        self
    }

    /// Set take-profit and stop-loss yields, both in percent of invested capital.
    pub fn with_targets(mut self, take_profit_pct: Decimal, stop_loss_pct: Decimal) -> Self {
        self.take_profit_yield_pct = take_profit_pct;
        self.stop_loss_yield_pct = stop_loss_pct;
        self
    }

    /// Wallet balance that actually backs the position.
    ///
    /// Isolated margin has no wallet in play, so this is zero there.
    pub fn effective_wallet_balance(&self) -> Decimal {
        match self.margin_mode {
            MarginMode::Cross => self.wallet_balance,
            MarginMode::Isolated => Decimal::ZERO,
        }
    }

    /// Check user-supplied ranges before handing the config to the calculator.
    ///
    /// The calculator itself only guards against zero denominators.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LEVERAGE..=MAX_LEVERAGE).contains(&self.leverage) {
            bail!(
                "Leverage must be between {}x and {}x, got {}x",
                MIN_LEVERAGE,
                MAX_LEVERAGE,
                self.leverage
            );
        }

        let amounts = [
            ("wallet balance", self.wallet_balance),
            ("invested amount", self.invested_amount),
            ("entry price", self.entry_price),
            ("market price", self.market_price),
            ("take-profit yield", self.take_profit_yield_pct),
            ("stop-loss yield", self.stop_loss_yield_pct),
        ];
        for (name, value) in amounts {
            if value.is_sign_negative() && !value.is_zero() {
                bail!("The {} cannot be negative, got {}", name, value);
            }
        }

        Ok(())
    }
}
