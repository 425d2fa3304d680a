//! Order generation toward target weights, with tax estimation.

use std::collections::{BTreeMap, BTreeSet};

use super::error::FolioError;
use super::snapshot::PortfolioSnapshot;

/// Allowed drift of the target-weight sum around 1.0.
pub const WEIGHT_SUM_EPSILON: f64 = 0.005;

/// Desired weight fraction per ticker. Validated at construction: weights are
/// non-negative and sum to 1.0 within [`WEIGHT_SUM_EPSILON`].
#[derive(Debug, Clone, PartialEq)]
pub struct TargetWeights {
    weights: BTreeMap<String, f64>,
}

impl TargetWeights {
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, FolioError> {
        for (ticker, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(FolioError::InvalidWeights {
                    reason: format!("negative weight {weight} for {ticker}"),
                });
            }
        }
        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(FolioError::InvalidWeights {
                reason: format!(
                    "weights sum to {sum:.4}, must be within {WEIGHT_SUM_EPSILON} of 1.0"
                ),
            });
        }
        Ok(TargetWeights { weights })
    }

    /// 0.0 for a ticker with no target.
    pub fn get(&self, ticker: &str) -> f64 {
        self.weights.get(ticker).copied().unwrap_or(0.0)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Action {
    Buy,
    Sell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
        }
    }
}

/// One trade instruction. Quantities are positive share counts, fractional
/// shares allowed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RebalanceOrder {
    pub ticker: String,
    /// Display name from the holding; the ticker itself for new positions.
    pub name: String,
    pub action: Action,
    pub quantity: f64,
    pub price: f64,
    /// Cash value of the trade, positive for both sides.
    pub amount: f64,
    /// Estimated tax on the realized gain; zero for buys and for losses.
    pub estimated_tax: f64,
}

/// Orders in lexical ticker order plus cash-flow summary.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RebalanceReport {
    pub orders: Vec<RebalanceOrder>,
    pub total_buy: f64,
    pub total_sell: f64,
    pub total_tax: f64,
}

impl RebalanceReport {
    /// Sell proceeds minus buy cost minus estimated tax.
    pub fn net_cash_flow(&self) -> f64 {
        self.total_sell - self.total_buy - self.total_tax
    }
}

/// Compute buy/sell orders converging the snapshot toward `targets`.
///
/// Tickers whose weight deviation is within `tolerance` generate no order
/// (dead zone against churn). Every order requires a positive quote, else
/// `MissingPrice`. Sells never exceed the held quantity, and a realized loss
/// carries no tax credit.
pub fn rebalance(
    snapshot: &PortfolioSnapshot,
    targets: &TargetWeights,
    tolerance: f64,
    tax_rate: f64,
) -> Result<RebalanceReport, FolioError> {
    if tolerance < 0.0 {
        return Err(FolioError::NegativeTolerance { tolerance });
    }

    // Union of held and target tickers; unheld targets carry zero value.
    let mut tickers: BTreeSet<&str> = snapshot
        .holdings()
        .iter()
        .map(|h| h.ticker.as_str())
        .collect();
    tickers.extend(targets.tickers());

    let total_value = snapshot.total_value();

    let mut orders = Vec::new();
    let mut total_buy = 0.0;
    let mut total_sell = 0.0;
    let mut total_tax = 0.0;

    for ticker in tickers {
        let held = snapshot.holdings().iter().find(|h| h.ticker == ticker);
        let current_value = held.map(|h| snapshot.market_value(h)).unwrap_or(0.0);
        let current_weight = if total_value > 0.0 {
            current_value / total_value
        } else {
            0.0
        };

        let target_weight = targets.get(ticker);
        let deviation = current_weight - target_weight;
        if deviation.abs() <= tolerance {
            continue;
        }

        let target_value = target_weight * total_value;
        let delta_value = target_value - current_value;
        let name = held
            .map(|h| h.name.clone())
            .unwrap_or_else(|| ticker.to_string());

        if delta_value > 0.0 {
            let price = snapshot
                .price(ticker)
                .filter(|p| *p > 0.0)
                .ok_or_else(|| FolioError::MissingPrice {
                    ticker: ticker.to_string(),
                })?;
            let quantity = delta_value / price;
            orders.push(RebalanceOrder {
                ticker: ticker.to_string(),
                name,
                action: Action::Buy,
                quantity,
                price,
                amount: delta_value,
                estimated_tax: 0.0,
            });
            total_buy += delta_value;
        } else if let Some(holding) = held {
            let price = snapshot
                .price(ticker)
                .filter(|p| *p > 0.0)
                .ok_or_else(|| FolioError::MissingPrice {
                    ticker: ticker.to_string(),
                })?;
            let quantity = if target_weight == 0.0 {
                // Full liquidation outside the band.
                holding.quantity
            } else {
                (delta_value.abs() / price).min(holding.quantity)
            };
            let proceeds = quantity * price;
            let realized_gain = quantity * (price - holding.avg_cost);
            let estimated_tax = if realized_gain > 0.0 {
                realized_gain * tax_rate
            } else {
                0.0
            };
            orders.push(RebalanceOrder {
                ticker: ticker.to_string(),
                name,
                action: Action::Sell,
                quantity,
                price,
                amount: proceeds,
                estimated_tax,
            });
            total_sell += proceeds;
            total_tax += estimated_tax;
        }
    }

    Ok(RebalanceReport {
        orders,
        total_buy,
        total_sell,
        total_tax,
    })
}
