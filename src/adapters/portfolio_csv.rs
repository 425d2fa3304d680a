//! Portfolio and target-weights CSV loading.
//!
//! Holdings files carry `ticker,name,quantity,avg_cost` columns with an
//! optional `currency`; header case and padding are normalized. Row-level
//! validation failures are aggregated so one pass reports every bad row.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::error::FolioError;
use crate::domain::holding::{Currency, Holding};
use crate::domain::rebalance::TargetWeights;

const REQUIRED_COLUMNS: [&str; 4] = ["ticker", "name", "quantity", "avg_cost"];

pub fn load_holdings(path: &Path, default_currency: Currency) -> Result<Vec<Holding>, FolioError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| FolioError::Data {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| data_error(path, format!("CSV parse error: {e}")))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(data_error(
            path,
            format!("missing required columns: {}", missing.join(", ")),
        ));
    }

    let column = |name: &str| headers.iter().position(|h| h == name);
    let ticker_col = column("ticker").unwrap();
    let name_col = column("name").unwrap();
    let quantity_col = column("quantity").unwrap();
    let cost_col = column("avg_cost").unwrap();
    let currency_col = column("currency");

    let mut holdings = Vec::new();
    let mut errors = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let row_num = idx + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("row {row_num}: {e}"));
                continue;
            }
        };

        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let quantity = match field(quantity_col).parse::<f64>() {
            Ok(q) => q,
            Err(_) => {
                errors.push(format!(
                    "row {row_num}: invalid quantity: '{}'",
                    field(quantity_col)
                ));
                continue;
            }
        };
        let avg_cost = match field(cost_col).parse::<f64>() {
            Ok(c) => c,
            Err(_) => {
                errors.push(format!(
                    "row {row_num}: invalid avg_cost: '{}'",
                    field(cost_col)
                ));
                continue;
            }
        };
        let currency = match currency_col.map(field).filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<Currency>() {
                Ok(c) => c,
                Err(reason) => {
                    errors.push(format!("row {row_num}: {reason}"));
                    continue;
                }
            },
            None => default_currency,
        };

        match Holding::new(field(ticker_col), field(name_col), quantity, avg_cost, currency) {
            Ok(h) => holdings.push(h),
            Err(reason) => errors.push(format!("row {row_num}: {reason}")),
        }
    }

    if !errors.is_empty() {
        return Err(FolioError::InvalidHoldings { reasons: errors });
    }
    if holdings.is_empty() {
        return Err(data_error(path, "no holdings rows".into()));
    }
    Ok(holdings)
}

/// Target weights from a `ticker,weight` CSV, weights as decimal fractions.
/// Validation (non-negative, sum ≈ 1) happens in [`TargetWeights::new`].
pub fn load_target_weights(path: &Path) -> Result<TargetWeights, FolioError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| FolioError::Data {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut weights = BTreeMap::new();
    for (idx, result) in rdr.records().enumerate() {
        let row_num = idx + 1;
        let record = result.map_err(|e| data_error(path, format!("row {row_num}: {e}")))?;

        let ticker = record
            .get(0)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| data_error(path, format!("row {row_num}: missing ticker")))?;
        let weight: f64 = record
            .get(1)
            .unwrap_or("")
            .trim()
            .parse()
            .map_err(|_| data_error(path, format!("row {row_num}: invalid weight")))?;

        if weights.insert(ticker.to_string(), weight).is_some() {
            return Err(data_error(
                path,
                format!("row {row_num}: duplicate ticker {ticker}"),
            ));
        }
    }

    TargetWeights::new(weights)
}

fn data_error(path: &Path, reason: String) -> FolioError {
    FolioError::Data {
        file: path.display().to_string(),
        reason,
    }
}
