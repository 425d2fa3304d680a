#![allow(dead_code)]

use chrono::NaiveDate;
use folio::domain::error::FolioError;
use folio::domain::holding::{Currency, Holding};
use folio::domain::series::{PricePoint, PriceSeries};
use folio::ports::market_port::MarketDataPort;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily closes starting 2024-01-01.
pub fn make_series(ticker: &str, closes: &[f64]) -> PriceSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            close,
        })
        .collect();
    PriceSeries::new(ticker, points).unwrap()
}

pub fn make_holding(ticker: &str, quantity: f64, avg_cost: f64) -> Holding {
    Holding::new(ticker, ticker, quantity, avg_cost, Currency::Usd).unwrap()
}

pub struct MockMarketData {
    pub series: HashMap<String, PriceSeries>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, ticker: &str, closes: &[f64]) -> Self {
        self.series
            .insert(ticker.to_string(), make_series(ticker, closes));
        self
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.ticker.clone(), series);
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn latest_price(&self, ticker: &str) -> Result<f64, FolioError> {
        let series = self.price_history(ticker)?;
        series
            .latest()
            .map(|p| p.close)
            .ok_or_else(|| FolioError::MissingPrice {
                ticker: ticker.to_string(),
            })
    }

    fn price_history(&self, ticker: &str) -> Result<PriceSeries, FolioError> {
        self.series
            .get(ticker)
            .cloned()
            .ok_or_else(|| FolioError::Data {
                file: format!("{ticker}.csv"),
                reason: "no data".to_string(),
            })
    }
}
