//! CSV file market-data adapter.
//!
//! Reads one `<TICKER>.csv` per symbol from a base directory, with
//! `date,close` columns and ISO dates.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::error::FolioError;
use crate::domain::series::{PricePoint, PriceSeries};
use crate::ports::market_port::MarketDataPort;

pub struct CsvMarketAdapter {
    base_path: PathBuf,
}

impl CsvMarketAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    fn data_error(&self, ticker: &str, reason: String) -> FolioError {
        FolioError::Data {
            file: self.csv_path(ticker).display().to_string(),
            reason,
        }
    }
}

impl MarketDataPort for CsvMarketAdapter {
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
        let path = self.csv_path(ticker);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| FolioError::Data {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| self.data_error(ticker, format!("CSV parse error: {e}")))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| self.data_error(ticker, "missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| self.data_error(ticker, format!("invalid date '{date_str}': {e}")))?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| self.data_error(ticker, "missing close column".into()))?
                .trim()
                .parse()
                .map_err(|e| self.data_error(ticker, format!("invalid close value: {e}")))?;

            points.push(PricePoint { date, close });
        }

        PriceSeries::new(ticker, points).map_err(|reason| self.data_error(ticker, reason))
    }
}
