//! Futures P/L Calculator
//!
//! Computes profit/loss, liquidation price, a DCA ladder and take-profit /
//! stop-loss targets for a single leveraged futures position.

mod calculator;
mod models;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::calculator::{TradeCalculator, DCA_LOSS_CHECKPOINTS, MAINTENANCE_MARGIN_RATE};
use crate::models::{
    MarginMode, PositionSide, TradeConfig, TradeResult, MAX_LEVERAGE, MEDIUM_DISTANCE_PCT,
    MIN_LEVERAGE, SAFE_DISTANCE_PCT,
};
use crate::report::TradeReport;

/// Futures trade calculator CLI.
#[derive(Parser)]
#[command(name = "futcalc")]
#[command(about = "Profit/loss, liquidation, DCA and TP/SL calculator for leveraged futures", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "FUTCALC_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate P/L, liquidation price, DCA ladder and TP/SL targets
    Calc(CalcArgs),

    /// Show the default trade configuration and fixed constants
    Defaults,
}

/// How to print a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Trade inputs. Flags override values loaded from `--config`.
#[derive(Args)]
struct CalcArgs {
    /// JSON file with a trade config
    #[arg(short, long, env = "FUTCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Position side
    #[arg(long, value_enum, env = "FUTCALC_SIDE")]
    side: Option<PositionSide>,

    /// Margin mode
    #[arg(long, value_enum, env = "FUTCALC_MARGIN_MODE")]
    margin_mode: Option<MarginMode>,

    /// Leverage (1-500)
    #[arg(short = 'x', long, env = "FUTCALC_LEVERAGE")]
    leverage: Option<u32>,

    /// Wallet balance in USD (cross margin only)
    #[arg(short, long, env = "FUTCALC_WALLET")]
    wallet: Option<Decimal>,

    /// Amount invested in USD
    #[arg(short, long)]
    amount: Option<Decimal>,

    /// Entry price
    #[arg(short, long)]
    entry: Option<Decimal>,

    /// Current market price (defaults to the entry price)
    #[arg(short, long)]
    market: Option<Decimal>,

    /// Target profit on capital, in percent
    #[arg(long)]
    tp: Option<Decimal>,

    /// Maximum loss on capital, in percent
    #[arg(long)]
    sl: Option<Decimal>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl CalcArgs {
    /// Build the trade config: defaults, then the config file, then flags.
    fn to_config(&self) -> Result<TradeConfig> {
        let (mut config, market_follows_entry) = match &self.config {
            Some(path) => {
                let file = TradeConfig::read_file(path)?;
                (file.config, !file.has_market_price)
            }
            None => (TradeConfig::default(), true),
        };

        if let Some(side) = self.side {
            config.position_side = side;
        }
        if let Some(mode) = self.margin_mode {
            config.margin_mode = mode;
        }
        if let Some(leverage) = self.leverage {
            config.leverage = leverage;
        }
        if let Some(wallet) = self.wallet {
            config.wallet_balance = wallet;
        }
        if let Some(amount) = self.amount {
            config.invested_amount = amount;
        }
        if let Some(entry) = self.entry {
            config.entry_price = entry;
        }
        match self.market {
            Some(market) => config.market_price = market,
            None if market_follows_entry => config.market_price = config.entry_price,
            None => {}
        }
        if let Some(tp) = self.tp {
            config.take_profit_yield_pct = tp;
        }
        if let Some(sl) = self.sl {
            config.stop_loss_yield_pct = sl;
        }

        Ok(config)
    }
}

/// JSON output of the `calc` command.
#[derive(Serialize)]
struct CalcOutput<'a> {
    config: &'a TradeConfig,
    result: &'a TradeResult,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Calc(args) => {
            let config = args.to_config()?;
            config.validate()?;

            info!(
                side = %config.position_side,
                margin_mode = %config.margin_mode,
                leverage = config.leverage,
                entry = %config.entry_price,
                market = %config.market_price,
                "Calculating trade"
            );

            let result = TradeCalculator::calculate(&config);

            match args.format {
                OutputFormat::Text => {
                    println!(
                        "\nFutures P/L Calculator ({})\n",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                    );
                    println!("{}", TradeReport::new(&config, &result));
                }
                OutputFormat::Json => {
                    let output = CalcOutput {
                        config: &config,
                        result: &result,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }

        Commands::Defaults => {
            let config = TradeConfig::default();

            println!("\n=== Default Trade Configuration ===\n");
            println!("  Position Side:        {}", config.position_side);
            println!("  Margin Mode:          {}", config.margin_mode);
            println!("  Leverage:             {}x", config.leverage);
            println!("  Take Profit Yield:    {}%", config.take_profit_yield_pct);
            println!("  Stop Loss Yield:      {}%", config.stop_loss_yield_pct);
            println!("  Market Price:         follows entry price");

            println!("\n=== Fixed Constants ===\n");
            println!("  Leverage Range:       {}x - {}x", MIN_LEVERAGE, MAX_LEVERAGE);
            println!(
                "  Maintenance Margin:   {}%",
                (MAINTENANCE_MARGIN_RATE * Decimal::ONE_HUNDRED).normalize()
            );
            let checkpoints: Vec<String> = DCA_LOSS_CHECKPOINTS
                .iter()
                .map(|c| format!("-{}%", c))
                .collect();
            println!("  DCA Checkpoints:      {}", checkpoints.join(", "));
            println!("  Safe Distance:        >= {}%", SAFE_DISTANCE_PCT);
            println!("  Medium Risk Distance: >= {}%", MEDIUM_DISTANCE_PCT);
        }
    }

    Ok(())
}
