//! Current-state portfolio snapshot: holdings priced at the latest quote.

use std::collections::HashMap;

use super::error::FolioError;
use super::holding::{Currency, Holding};

/// One holding valued at the current price.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HoldingAnalysis {
    pub ticker: String,
    pub name: String,
    pub quantity: f64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub market_value: f64,
    /// Fraction of total portfolio value, 0..=1.
    pub weight: f64,
    /// Simple return against average cost; NaN when `avg_cost` is zero.
    pub holding_return: f64,
    /// `weight * holding_return`.
    pub contribution: f64,
}

/// A named, currency-tagged collection of holdings plus the latest price per
/// ticker. The price map may carry quotes for tickers not currently held
/// (rebalance targets).
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub name: String,
    pub currency: Currency,
    holdings: Vec<Holding>,
    prices: HashMap<String, f64>,
}

impl PortfolioSnapshot {
    /// Every held ticker must have a quote in `prices`.
    pub fn new(
        name: &str,
        currency: Currency,
        holdings: Vec<Holding>,
        prices: HashMap<String, f64>,
    ) -> Result<Self, FolioError> {
        for holding in &holdings {
            if !prices.contains_key(&holding.ticker) {
                return Err(FolioError::MissingPrice {
                    ticker: holding.ticker.clone(),
                });
            }
        }
        Ok(PortfolioSnapshot {
            name: name.to_string(),
            currency,
            holdings,
            prices,
        })
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(ticker).copied()
    }

    pub fn market_value(&self, holding: &Holding) -> f64 {
        // Price presence is checked at construction.
        holding.quantity * self.prices[&holding.ticker]
    }

    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(|h| self.market_value(h)).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.holdings.iter().map(|h| h.total_cost()).sum()
    }

    /// Per-holding valuation in holding order. Weights sum to 1 when the
    /// portfolio has positive total value.
    pub fn analyses(&self) -> Vec<HoldingAnalysis> {
        let total = self.total_value();
        self.holdings
            .iter()
            .map(|h| {
                let current_price = self.prices[&h.ticker];
                let market_value = h.quantity * current_price;
                let weight = if total > 0.0 { market_value / total } else { 0.0 };
                let holding_return = if h.avg_cost > 0.0 {
                    (current_price - h.avg_cost) / h.avg_cost
                } else {
                    f64::NAN
                };
                HoldingAnalysis {
                    ticker: h.ticker.clone(),
                    name: h.name.clone(),
                    quantity: h.quantity,
                    avg_cost: h.avg_cost,
                    current_price,
                    market_value,
                    weight,
                    holding_return,
                    contribution: weight * holding_return,
                }
            })
            .collect()
    }
}
