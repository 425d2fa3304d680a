//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_market_adapter::CsvMarketAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::portfolio_csv;
use crate::adapters::settings::Settings;
use crate::adapters::text_report;
use crate::domain::error::FolioError;
use crate::domain::holding::{Currency, Holding};
use crate::domain::metrics::{self, MetricsReport};
use crate::domain::rebalance::{self, RebalanceReport, TargetWeights};
use crate::domain::snapshot::PortfolioSnapshot;
use crate::ports::market_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Portfolio analysis and rebalancing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a portfolio against a benchmark
    Analyze {
        /// Portfolio holdings CSV
        file: PathBuf,
        #[arg(long)]
        prices_dir: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        benchmark: Option<String>,
        #[arg(long)]
        risk_free_rate: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write CSV report files under this path prefix
        #[arg(long)]
        export: Option<PathBuf>,
        /// Print the report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Propose trades converging holdings toward target weights
    Rebalance {
        /// Portfolio holdings CSV
        file: PathBuf,
        /// Target weights CSV (ticker,weight as decimal fractions)
        #[arg(short, long)]
        target: PathBuf,
        #[arg(long)]
        prices_dir: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(long)]
        tax_rate: Option<f64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

pub const DEFAULT_NAME: &str = "My Portfolio";
pub const DEFAULT_BENCHMARK: &str = "SPY";
pub const DEFAULT_PRICES_DIR: &str = "prices";
pub const DEFAULT_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct AnalyzeParams {
    pub name: String,
    pub currency: Currency,
    pub benchmark: String,
    pub risk_free_rate: f64,
    pub prices_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RebalanceParams {
    pub name: String,
    pub currency: Currency,
    pub tolerance: f64,
    pub tax_rate: f64,
    pub prices_dir: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            file,
            prices_dir,
            name,
            currency,
            benchmark,
            risk_free_rate,
            config,
            export,
            json,
        } => {
            let settings = match load_settings(config.as_ref()) {
                Ok(s) => s,
                Err(code) => return code,
            };
            let params = resolve_analyze_params(
                name,
                currency,
                benchmark,
                risk_free_rate,
                prices_dir,
                &settings,
            );
            run_analyze(&file, &params, export.as_deref(), json)
        }
        Command::Rebalance {
            file,
            target,
            prices_dir,
            name,
            currency,
            tolerance,
            tax_rate,
            config,
            export,
            json,
        } => {
            let settings = match load_settings(config.as_ref()) {
                Ok(s) => s,
                Err(code) => return code,
            };
            let params =
                resolve_rebalance_params(name, currency, tolerance, tax_rate, prices_dir, &settings);
            run_rebalance(&file, &target, &params, export.as_deref(), json)
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, ExitCode> {
    match path {
        Some(p) => Settings::from_file(p).map_err(|e| fail(&e)),
        None => Ok(Settings::default()),
    }
}

pub fn resolve_analyze_params(
    name: Option<String>,
    currency: Option<Currency>,
    benchmark: Option<String>,
    risk_free_rate: Option<f64>,
    prices_dir: Option<PathBuf>,
    settings: &Settings,
) -> AnalyzeParams {
    AnalyzeParams {
        name: name
            .or_else(|| settings.name.clone())
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        currency: currency.or(settings.currency).unwrap_or(Currency::Usd),
        benchmark: benchmark
            .or_else(|| settings.benchmark.clone())
            .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string()),
        risk_free_rate: risk_free_rate.or(settings.risk_free_rate).unwrap_or(0.0),
        prices_dir: prices_dir
            .or_else(|| settings.prices_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICES_DIR)),
    }
}

pub fn resolve_rebalance_params(
    name: Option<String>,
    currency: Option<Currency>,
    tolerance: Option<f64>,
    tax_rate: Option<f64>,
    prices_dir: Option<PathBuf>,
    settings: &Settings,
) -> RebalanceParams {
    RebalanceParams {
        name: name
            .or_else(|| settings.name.clone())
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        currency: currency.or(settings.currency).unwrap_or(Currency::Usd),
        tolerance: tolerance.or(settings.tolerance).unwrap_or(DEFAULT_TOLERANCE),
        tax_rate: tax_rate.or(settings.tax_rate).unwrap_or(0.0),
        prices_dir: prices_dir
            .or_else(|| settings.prices_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICES_DIR)),
    }
}

/// Analysis pipeline against any market-data port; the CLI wires in the CSV
/// adapter, tests wire in a mock.
pub fn analyze_portfolio(
    market: &dyn MarketDataPort,
    holdings: Vec<Holding>,
    params: &AnalyzeParams,
) -> Result<MetricsReport, FolioError> {
    let mut histories = HashMap::new();
    let mut prices = HashMap::new();
    for holding in &holdings {
        let series = market.price_history(&holding.ticker)?;
        let latest = series
            .latest()
            .map(|p| p.close)
            .ok_or_else(|| FolioError::MissingPrice {
                ticker: holding.ticker.clone(),
            })?;
        prices.insert(holding.ticker.clone(), latest);
        histories.insert(holding.ticker.clone(), series);
    }
    let benchmark = market.price_history(&params.benchmark)?;

    let snapshot = PortfolioSnapshot::new(&params.name, params.currency, holdings, prices)?;
    let values = metrics::build_value_series(snapshot.holdings(), &histories, &benchmark)?;
    metrics::compute(&snapshot, &values, &benchmark, params.risk_free_rate)
}

/// Rebalance pipeline. Quotes are fetched for every held ticker; target-only
/// tickers are quoted best-effort, and a missing quote only becomes an error
/// if the rebalancer actually needs to buy that ticker.
pub fn plan_rebalance(
    market: &dyn MarketDataPort,
    holdings: Vec<Holding>,
    targets: &TargetWeights,
    params: &RebalanceParams,
) -> Result<RebalanceReport, FolioError> {
    let mut prices = HashMap::new();
    for holding in &holdings {
        prices.insert(holding.ticker.clone(), market.latest_price(&holding.ticker)?);
    }
    for ticker in targets.tickers() {
        if !prices.contains_key(ticker) {
            if let Ok(price) = market.latest_price(ticker) {
                prices.insert(ticker.to_string(), price);
            }
        }
    }

    let snapshot = PortfolioSnapshot::new(&params.name, params.currency, holdings, prices)?;
    rebalance::rebalance(&snapshot, targets, params.tolerance, params.tax_rate)
}

fn run_analyze(
    file: &PathBuf,
    params: &AnalyzeParams,
    export: Option<&std::path::Path>,
    json: bool,
) -> ExitCode {
    let holdings = match portfolio_csv::load_holdings(file, params.currency) {
        Ok(h) => h,
        Err(e) => return fail(&e),
    };
    eprintln!("Loaded {} holdings from {}", holdings.len(), file.display());

    let market = CsvMarketAdapter::new(params.prices_dir.clone());
    let report = match analyze_portfolio(&market, holdings, params) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        println!("{}", text_report::format_summary(&report));
        println!();
        println!(
            "{}",
            text_report::format_holdings_table(&report.holdings, report.currency)
        );
    }

    if let Some(prefix) = export {
        if let Err(e) = CsvReportAdapter.write_analysis(&report, prefix) {
            return fail(&e);
        }
        eprintln!("Exported to {}_*.csv", prefix.display());
    }

    ExitCode::SUCCESS
}

fn run_rebalance(
    file: &PathBuf,
    target: &PathBuf,
    params: &RebalanceParams,
    export: Option<&std::path::Path>,
    json: bool,
) -> ExitCode {
    let holdings = match portfolio_csv::load_holdings(file, params.currency) {
        Ok(h) => h,
        Err(e) => return fail(&e),
    };
    eprintln!("Loaded {} holdings from {}", holdings.len(), file.display());

    let targets = match portfolio_csv::load_target_weights(target) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    eprintln!(
        "Target weights for {} tickers, tolerance {:.1}%",
        targets.tickers().count(),
        params.tolerance * 100.0
    );

    let market = CsvMarketAdapter::new(params.prices_dir.clone());
    let report = match plan_rebalance(&market, holdings, &targets, params) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return ExitCode::from(1);
            }
        }
    } else if report.orders.is_empty() {
        println!("Portfolio is within tolerance. No rebalancing needed.");
    } else {
        println!(
            "{}",
            text_report::format_orders_table(&report, params.currency)
        );
    }

    if let Some(prefix) = export {
        if let Err(e) = CsvReportAdapter.write_rebalance(&report, prefix) {
            return fail(&e);
        }
        eprintln!("Exported to {}_*.csv", prefix.display());
    }

    ExitCode::SUCCESS
}

fn fail(err: &FolioError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}
