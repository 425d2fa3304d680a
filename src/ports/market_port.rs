//! Market data access port trait.

use crate::domain::error::FolioError;
use crate::domain::series::PriceSeries;

/// Source of quotes and price history. Implementations own any caching,
/// retry, or timeout policy; the domain stays synchronous and pure.
pub trait MarketDataPort {
    /// Latest available closing price for a ticker.
    fn latest_price(&self, ticker: &str) -> Result<f64, FolioError>;

    /// Full closing-price history for a ticker, ascending by date.
    fn price_history(&self, ticker: &str) -> Result<PriceSeries, FolioError>;
}
