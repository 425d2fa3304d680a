//! Historical price series and date alignment.

use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices for one ticker, ascending by date, no duplicate dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Sorts the points by date; duplicate dates and non-positive or
    /// non-finite closes are rejected.
    pub fn new(ticker: &str, mut points: Vec<PricePoint>) -> Result<Self, String> {
        for p in &points {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(format!(
                    "invalid close {} on {} for {}",
                    p.close, p.date, ticker
                ));
            }
        }
        points.sort_by_key(|p| p.date);
        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(format!("duplicate date {} for {}", pair[0].date, ticker));
            }
        }
        Ok(PriceSeries {
            ticker: ticker.to_string(),
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].close)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Simple daily returns `p_i / p_{i-1} - 1`.
    pub fn daily_returns(&self) -> Vec<f64> {
        daily_returns_of(&self.closes())
    }

    fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

/// Dates present in every given series, ascending.
pub fn intersect_dates(series: &[&PriceSeries]) -> Vec<NaiveDate> {
    let Some((first, rest)) = series.split_first() else {
        return Vec::new();
    };
    let mut common: BTreeSet<NaiveDate> = first.dates().collect();
    for s in rest {
        let dates: BTreeSet<NaiveDate> = s.dates().collect();
        common = common.intersection(&dates).copied().collect();
        if common.is_empty() {
            break;
        }
    }
    common.into_iter().collect()
}

/// Simple daily returns over a value sequence. One observation per
/// consecutive pair; values are positive, enforced at series construction.
pub fn daily_returns_of(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}
