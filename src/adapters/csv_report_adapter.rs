//! CSV report export adapter.
//!
//! Writes plain unformatted numbers so spreadsheets and downstream tools can
//! consume them. A `prefix` of `out/report` produces `out/report_summary.csv`,
//! `out/report_holdings.csv` and `out/report_orders.csv`.

use std::path::{Path, PathBuf};

use crate::domain::error::FolioError;
use crate::domain::metrics::MetricsReport;
use crate::domain::rebalance::RebalanceReport;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, FolioError> {
        csv::Writer::from_path(path).map_err(|e| FolioError::Data {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn finish(mut wtr: csv::Writer<std::fs::File>, path: &Path) -> Result<(), FolioError> {
        wtr.flush().map_err(|e| FolioError::Data {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let stem = prefix
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    prefix.with_file_name(format!("{stem}_{suffix}.csv"))
}

impl ReportPort for CsvReportAdapter {
    fn write_analysis(&self, report: &MetricsReport, prefix: &Path) -> Result<(), FolioError> {
        let summary_path = with_suffix(prefix, "summary");
        let mut wtr = Self::writer(&summary_path)?;
        let rows: Vec<(&str, String)> = vec![
            ("portfolio_name", report.portfolio_name.clone()),
            ("currency", report.currency.to_string()),
            ("benchmark", report.benchmark.clone()),
            ("total_value", report.total_value.to_string()),
            ("total_cost", report.total_cost.to_string()),
            ("profit_loss", report.profit_loss().to_string()),
            ("total_return", report.total_return.to_string()),
            ("annualized_return", report.annualized_return.to_string()),
            (
                "annualized_volatility",
                report.annualized_volatility.to_string(),
            ),
            (
                "sharpe_ratio",
                report
                    .sharpe_ratio
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            ),
            ("max_drawdown", report.max_drawdown.to_string()),
            ("beta", report.beta.to_string()),
            ("alpha", report.alpha.to_string()),
            ("risk_free_rate", report.risk_free_rate.to_string()),
        ];
        for (field, value) in rows {
            wtr.write_record([field, &value]).map_err(|e| FolioError::Data {
                file: summary_path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Self::finish(wtr, &summary_path)?;

        let holdings_path = with_suffix(prefix, "holdings");
        let mut wtr = Self::writer(&holdings_path)?;
        let write_err = |e: csv::Error| FolioError::Data {
            file: holdings_path.display().to_string(),
            reason: e.to_string(),
        };
        wtr.write_record([
            "ticker",
            "name",
            "quantity",
            "avg_cost",
            "current_price",
            "market_value",
            "weight",
            "return",
            "contribution",
        ])
        .map_err(write_err)?;
        for h in &report.holdings {
            wtr.write_record([
                h.ticker.as_str(),
                h.name.as_str(),
                &h.quantity.to_string(),
                &h.avg_cost.to_string(),
                &h.current_price.to_string(),
                &h.market_value.to_string(),
                &h.weight.to_string(),
                &h.holding_return.to_string(),
                &h.contribution.to_string(),
            ])
            .map_err(|e| FolioError::Data {
                file: holdings_path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Self::finish(wtr, &holdings_path)
    }

    fn write_rebalance(&self, report: &RebalanceReport, prefix: &Path) -> Result<(), FolioError> {
        let orders_path = with_suffix(prefix, "orders");
        let mut wtr = Self::writer(&orders_path)?;
        let write_err = |e: csv::Error| FolioError::Data {
            file: orders_path.display().to_string(),
            reason: e.to_string(),
        };
        wtr.write_record([
            "ticker",
            "name",
            "action",
            "quantity",
            "price",
            "amount",
            "estimated_tax",
        ])
        .map_err(write_err)?;
        for order in &report.orders {
            wtr.write_record([
                order.ticker.as_str(),
                order.name.as_str(),
                &order.action.to_string(),
                &order.quantity.to_string(),
                &order.price.to_string(),
                &order.amount.to_string(),
                &order.estimated_tax.to_string(),
            ])
            .map_err(|e| FolioError::Data {
                file: orders_path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Self::finish(wtr, &orders_path)
    }
}
