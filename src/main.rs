//! # Evaluate one symbol
//! structural-certainty evaluate snapshot.json
//!
//! # Evaluate many symbols against one VIX reading
//! structural-certainty batch batch.json
//!
//! # Rank a swing universe
//! structural-certainty scan universe.json
//!
//! Inputs are JSON files, or `-` for stdin. Output is pretty JSON on stdout.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use structural_certainty::{
    BatchRequest, EngineConfig, EvaluationRequest, IndicatorSnapshot, ScanRequest,
    StructuralCertaintyEngine, SwingScanner,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "structural-certainty")]
#[command(about = "Market-structure regime classification and swing ranking")]
#[command(version)]
struct Cli {
    /// Threshold overrides (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one symbol into an execution envelope
    Evaluate {
        /// Evaluation request JSON (symbol, snapshot, optional weekly read)
        input: String,

        /// Shared volatility index level, overrides the snapshot's own
        #[arg(long)]
        vix: Option<f64>,
    },

    /// Evaluate a batch of symbols against one volatility reading
    Batch {
        /// Batch request JSON
        input: String,
    },

    /// Rank a universe into bullish and bearish swing candidates
    Scan {
        /// Scan request JSON
        input: String,
    },

    /// Daily bias from OI dominance and volume expansion
    Bias {
        /// Indicator snapshot JSON
        input: String,
    },

    /// Intraday tape narrative from the options chain
    Narrative {
        /// Indicator snapshot JSON
        input: String,
    },

    /// Print the effective threshold table
    ShowConfig,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("Failed to load thresholds")?;

    match cli.command {
        Commands::Evaluate { input, vix } => {
            let mut request: EvaluationRequest = read_json(&input)?;
            normalize_symbol(&mut request.symbol);
            let engine = StructuralCertaintyEngine::new(config);
            print_json(&engine.evaluate(&request, vix))
        }
        Commands::Batch { input } => {
            let mut request: BatchRequest = read_json(&input)?;
            for symbol in request.symbols.iter_mut() {
                normalize_symbol(&mut symbol.symbol);
            }
            let engine = StructuralCertaintyEngine::new(config);
            print_json(&engine.evaluate_batch(&request, Utc::now().date_naive()))
        }
        Commands::Scan { input } => {
            let mut request: ScanRequest = read_json(&input)?;
            normalize_scan(&mut request);
            let scanner = SwingScanner::new(config.scanner);
            let report = scanner
                .scan(&request, Utc::now().date_naive())
                .context("Invalid scan request")?;
            print_json(&report)
        }
        Commands::Bias { input } => {
            let mut snapshot: IndicatorSnapshot = read_json(&input)?;
            normalize_symbol(&mut snapshot.symbol);
            let engine = StructuralCertaintyEngine::new(config);
            print_json(&engine.daily_bias(&snapshot))
        }
        Commands::Narrative { input } => {
            let mut snapshot: IndicatorSnapshot = read_json(&input)?;
            normalize_symbol(&mut snapshot.symbol);
            let engine = StructuralCertaintyEngine::new(config);
            print_json(&engine.narrate(&snapshot))
        }
        Commands::ShowConfig => print_json(&config),
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("structural_certainty=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: DeserializeOwned>(input: &str) -> Result<T> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", input))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn normalize_symbol(symbol: &mut String) {
    *symbol = symbol.trim().to_uppercase();
}

/// Rows and the echoed universe share one casing
fn normalize_scan(request: &mut ScanRequest) {
    for row in request.data.iter_mut() {
        normalize_symbol(&mut row.symbol);
    }
    if let Some(universe) = request.universe.as_mut() {
        universe.symbols.iter_mut().for_each(normalize_symbol);
    }
}
