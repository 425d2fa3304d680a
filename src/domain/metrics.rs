//! Performance and risk metrics over the portfolio value series.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::FolioError;
use super::holding::{Currency, Holding};
use super::series::{daily_returns_of, intersect_dates, PriceSeries};
use super::snapshot::{HoldingAnalysis, PortfolioSnapshot};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum aligned dates for return/volatility computation.
pub const MIN_ALIGNED_DATES: usize = 2;

/// Total portfolio market value on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Aggregate metrics plus per-holding breakdown. All percentage-like fields
/// are decimal fractions (0.15 = 15%); formatting belongs to the adapters.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricsReport {
    pub portfolio_name: String,
    pub currency: Currency,
    pub benchmark: String,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    /// `None` when volatility is zero (undefined, not an error).
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub beta: f64,
    pub alpha: f64,
    pub risk_free_rate: f64,
    /// Sorted descending by contribution to total return.
    pub holdings: Vec<HoldingAnalysis>,
}

impl MetricsReport {
    pub fn profit_loss(&self) -> f64 {
        self.total_value - self.total_cost
    }
}

/// Portfolio value on each date in the strict intersection of all holdings'
/// series and the benchmark's. A holding with no price on a date drops that
/// date for the whole portfolio; no forward-fill. This shrinks the usable
/// range when a ticker is illiquid or newly listed — accepted limitation.
pub fn build_value_series(
    holdings: &[Holding],
    histories: &HashMap<String, PriceSeries>,
    benchmark: &PriceSeries,
) -> Result<Vec<ValuePoint>, FolioError> {
    let mut all: Vec<&PriceSeries> = Vec::with_capacity(holdings.len() + 1);
    for holding in holdings {
        let series = histories
            .get(&holding.ticker)
            .ok_or_else(|| FolioError::MissingPrice {
                ticker: holding.ticker.clone(),
            })?;
        all.push(series);
    }
    all.push(benchmark);

    let dates = intersect_dates(&all);
    if dates.len() < MIN_ALIGNED_DATES {
        return Err(FolioError::InsufficientData {
            points: dates.len(),
            minimum: MIN_ALIGNED_DATES,
        });
    }

    let values = dates
        .into_iter()
        .map(|date| {
            let value = holdings
                .iter()
                .map(|h| {
                    // Intersection guarantees a close on every kept date.
                    h.quantity * histories[&h.ticker].close_on(date).unwrap_or(0.0)
                })
                .sum();
            ValuePoint { date, value }
        })
        .collect();
    Ok(values)
}

/// Compute the full metrics report. Pure; the caller supplies the aligned
/// value series (see [`build_value_series`]) and the benchmark history.
pub fn compute(
    snapshot: &PortfolioSnapshot,
    values: &[ValuePoint],
    benchmark: &PriceSeries,
    risk_free_rate: f64,
) -> Result<MetricsReport, FolioError> {
    if values.len() < MIN_ALIGNED_DATES {
        return Err(FolioError::InsufficientData {
            points: values.len(),
            minimum: MIN_ALIGNED_DATES,
        });
    }

    let series: Vec<f64> = values.iter().map(|p| p.value).collect();
    let returns = daily_returns_of(&series);

    let first = series[0];
    let last = series[series.len() - 1];
    let total_return = if first != 0.0 { (last - first) / first } else { 0.0 };

    let periods = series.len() as f64;
    let annualized_return = (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / periods) - 1.0;

    let annualized_volatility = sample_stddev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe_ratio = if annualized_volatility > 0.0 {
        Some((annualized_return - risk_free_rate) / annualized_volatility)
    } else {
        None
    };

    let max_drawdown = compute_drawdown(&series);

    let (beta, alpha) = benchmark_stats(values, benchmark, annualized_return)?;

    let mut holdings = snapshot.analyses();
    holdings.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));

    Ok(MetricsReport {
        portfolio_name: snapshot.name.clone(),
        currency: snapshot.currency,
        benchmark: benchmark.ticker.clone(),
        total_value: snapshot.total_value(),
        total_cost: snapshot.total_cost(),
        total_return,
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
        max_drawdown,
        beta,
        alpha,
        risk_free_rate,
        holdings,
    })
}

/// Beta over the dates common to the value series and the benchmark, plus
/// alpha in the simplified single-factor form
/// `annualized_return - beta * annualized_benchmark_return` (no risk-free
/// adjustment).
fn benchmark_stats(
    values: &[ValuePoint],
    benchmark: &PriceSeries,
    annualized_return: f64,
) -> Result<(f64, f64), FolioError> {
    let mut portfolio_values = Vec::new();
    let mut benchmark_closes = Vec::new();
    for point in values {
        if let Some(close) = benchmark.close_on(point.date) {
            portfolio_values.push(point.value);
            benchmark_closes.push(close);
        }
    }

    if portfolio_values.len() < 2 {
        return Err(FolioError::BenchmarkMismatch {
            benchmark: benchmark.ticker.clone(),
            overlap: portfolio_values.len(),
        });
    }

    let portfolio_returns = daily_returns_of(&portfolio_values);
    let benchmark_returns = daily_returns_of(&benchmark_closes);

    let var = sample_variance(&benchmark_returns);
    let beta = if var > 0.0 {
        sample_covariance(&portfolio_returns, &benchmark_returns) / var
    } else {
        0.0
    };

    let first = benchmark_closes[0];
    let last = benchmark_closes[benchmark_closes.len() - 1];
    let benchmark_total = if first != 0.0 { (last - first) / first } else { 0.0 };
    let periods = benchmark_closes.len() as f64;
    let benchmark_annualized =
        (1.0 + benchmark_total).powf(TRADING_DAYS_PER_YEAR / periods) - 1.0;

    Ok((beta, annualized_return - beta * benchmark_annualized))
}

/// Maximum peak-to-trough decline, as a positive fraction in [0, 1].
fn compute_drawdown(series: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &value in series {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance, N-1 denominator. Zero when fewer than 2 observations.
fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64
}

fn sample_stddev(xs: &[f64]) -> f64 {
    sample_variance(xs).sqrt()
}

/// Sample covariance over paired observations, N-1 denominator.
fn sample_covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let mx = mean(&xs[..n]);
    let my = mean(&ys[..n]);
    xs[..n]
        .iter()
        .zip(&ys[..n])
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (n - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PricePoint;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: date(i as u32 + 1),
                close,
            })
            .collect();
        PriceSeries::new(ticker, points).unwrap()
    }

    fn value_points(values: &[f64]) -> Vec<ValuePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| ValuePoint {
                date: date(i as u32 + 1),
                value,
            })
            .collect()
    }

    fn snapshot(entries: &[(&str, f64, f64, f64)]) -> PortfolioSnapshot {
        let holdings = entries
            .iter()
            .map(|&(ticker, qty, cost, _)| {
                Holding::new(ticker, ticker, qty, cost, Currency::Usd).unwrap()
            })
            .collect();
        let prices = entries
            .iter()
            .map(|&(ticker, _, _, price)| (ticker.to_string(), price))
            .collect();
        PortfolioSnapshot::new("Test", Currency::Usd, holdings, prices).unwrap()
    }

    #[test]
    fn value_series_uses_strict_intersection() {
        let holdings = vec![
            Holding::new("AAPL", "Apple", 2.0, 100.0, Currency::Usd).unwrap(),
            Holding::new("MSFT", "Microsoft", 1.0, 200.0, Currency::Usd).unwrap(),
        ];
        // MSFT is missing day 2; that date must vanish for the portfolio.
        let aapl = series("AAPL", &[100.0, 101.0, 102.0]);
        let msft = PriceSeries::new(
            "MSFT",
            vec![
                PricePoint { date: date(1), close: 200.0 },
                PricePoint { date: date(3), close: 210.0 },
            ],
        )
        .unwrap();
        let bench = series("SPY", &[400.0, 401.0, 402.0]);
        let histories = HashMap::from([("AAPL".to_string(), aapl), ("MSFT".to_string(), msft)]);

        let values = build_value_series(&holdings, &histories, &bench).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].date, date(1));
        assert!((values[0].value - (2.0 * 100.0 + 200.0)).abs() < 1e-9);
        assert_eq!(values[1].date, date(3));
        assert!((values[1].value - (2.0 * 102.0 + 210.0)).abs() < 1e-9);
    }

    #[test]
    fn value_series_single_common_date_is_insufficient() {
        let holdings = vec![Holding::new("AAPL", "Apple", 1.0, 100.0, Currency::Usd).unwrap()];
        let histories = HashMap::from([("AAPL".to_string(), series("AAPL", &[100.0]))]);
        let bench = series("SPY", &[400.0]);

        let err = build_value_series(&holdings, &histories, &bench).unwrap_err();
        assert!(matches!(err, FolioError::InsufficientData { points: 1, .. }));
    }

    #[test]
    fn value_series_missing_history_names_ticker() {
        let holdings = vec![Holding::new("AAPL", "Apple", 1.0, 100.0, Currency::Usd).unwrap()];
        let err =
            build_value_series(&holdings, &HashMap::new(), &series("SPY", &[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, FolioError::MissingPrice { ticker } if ticker == "AAPL"));
    }

    #[test]
    fn constant_series_has_zero_returns_and_undefined_sharpe() {
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 100.0)]);
        let values = value_points(&[100.0, 100.0, 100.0, 100.0]);
        let bench = series("SPY", &[400.0, 401.0, 399.0, 402.0]);

        let report = compute(&snap, &values, &bench, 0.0).unwrap();
        assert!((report.total_return - 0.0).abs() < f64::EPSILON);
        assert!((report.annualized_return - 0.0).abs() < f64::EPSILON);
        assert!((report.annualized_volatility - 0.0).abs() < f64::EPSILON);
        assert_eq!(report.sharpe_ratio, None);
        assert!((report.max_drawdown - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_and_annualized_return() {
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 110.0)]);
        let values = value_points(&[100.0, 105.0, 110.0]);
        let bench = series("SPY", &[400.0, 401.0, 402.0]);

        let report = compute(&snap, &values, &bench, 0.0).unwrap();
        assert_relative_eq!(report.total_return, 0.10, max_relative = 1e-12);
        let expected_ann = 1.10_f64.powf(252.0 / 3.0) - 1.0;
        assert_relative_eq!(report.annualized_return, expected_ann, max_relative = 1e-9);
    }

    #[test]
    fn volatility_uses_sample_stddev() {
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 100.0)]);
        let values = value_points(&[100.0, 110.0, 99.0]);
        let bench = series("SPY", &[400.0, 401.0, 402.0]);

        let report = compute(&snap, &values, &bench, 0.0).unwrap();
        // Returns are +10% and -10%; sample stddev with N-1 denominator.
        let m = 0.0_f64;
        let var = ((0.10 - m).powi(2) + (-0.10 - m).powi(2)) / 1.0;
        let expected = var.sqrt() * 252.0_f64.sqrt();
        assert_relative_eq!(report.annualized_volatility, expected, max_relative = 1e-9);
        assert!(report.sharpe_ratio.is_some());
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        assert!((compute_drawdown(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0])
            - (110.0 - 80.0) / 110.0)
            .abs()
            < 1e-9);
    }

    #[test]
    fn max_drawdown_zero_for_non_decreasing_series() {
        assert!((compute_drawdown(&[100.0, 100.0, 105.0, 120.0]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn beta_of_benchmark_against_itself_is_one() {
        let closes = [400.0, 408.0, 396.0, 410.0, 405.0];
        let bench = series("SPY", &closes);
        let snap = snapshot(&[("SPY", 1.0, 400.0, 405.0)]);
        let values = value_points(&closes);

        let report = compute(&snap, &values, &bench, 0.0).unwrap();
        assert_relative_eq!(report.beta, 1.0, max_relative = 1e-9);
        assert!(report.alpha.abs() < 1e-9);
    }

    #[test]
    fn beta_scales_with_leverage() {
        let bench = series("SPY", &[100.0, 110.0, 99.0, 105.0]);
        // Portfolio moves exactly twice the benchmark's daily return.
        let mut values = vec![100.0];
        for r in bench.daily_returns() {
            let prev = *values.last().unwrap();
            values.push(prev * (1.0 + 2.0 * r));
        }
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 100.0)]);

        let report = compute(&snap, &value_points(&values), &bench, 0.0).unwrap();
        assert_relative_eq!(report.beta, 2.0, max_relative = 1e-9);
    }

    #[test]
    fn zero_variance_benchmark_yields_zero_beta() {
        let bench = series("SPY", &[400.0, 400.0, 400.0]);
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 100.0)]);
        let values = value_points(&[100.0, 101.0, 102.0]);

        let report = compute(&snap, &values, &bench, 0.0).unwrap();
        assert!((report.beta - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn benchmark_without_overlap_is_a_mismatch() {
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 100.0)]);
        let values = value_points(&[100.0, 101.0, 102.0]);
        // Benchmark dates far outside the value series.
        let bench = PriceSeries::new(
            "SPY",
            vec![
                PricePoint {
                    date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                    close: 400.0,
                },
                PricePoint {
                    date: NaiveDate::from_ymd_opt(2023, 6, 2).unwrap(),
                    close: 401.0,
                },
            ],
        )
        .unwrap();

        let err = compute(&snap, &values, &bench, 0.0).unwrap_err();
        assert!(matches!(
            err,
            FolioError::BenchmarkMismatch { overlap: 0, .. }
        ));
    }

    #[test]
    fn compute_rejects_short_value_series() {
        let snap = snapshot(&[("AAPL", 1.0, 100.0, 100.0)]);
        let bench = series("SPY", &[400.0, 401.0]);
        let err = compute(&snap, &value_points(&[100.0]), &bench, 0.0).unwrap_err();
        assert!(matches!(err, FolioError::InsufficientData { points: 1, .. }));
    }

    #[test]
    fn holdings_sorted_by_contribution() {
        let snap = snapshot(&[
            ("AAPL", 10.0, 150.0, 200.0),
            ("MSFT", 5.0, 250.0, 300.0),
            ("NVDA", 1.0, 500.0, 400.0),
        ]);
        let values = value_points(&[3000.0, 3200.0, 3900.0]);
        let bench = series("SPY", &[400.0, 401.0, 402.0]);

        let report = compute(&snap, &values, &bench, 0.0).unwrap();
        let contributions: Vec<f64> = report.holdings.iter().map(|h| h.contribution).collect();
        for pair in contributions.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_eq!(report.holdings[0].ticker, "AAPL");
        assert_eq!(report.holdings[2].ticker, "NVDA");
    }

    proptest! {
        #[test]
        fn drawdown_is_a_fraction(values in proptest::collection::vec(0.01f64..1e9, 2..60)) {
            let dd = compute_drawdown(&values);
            prop_assert!((0.0..=1.0).contains(&dd));
        }

        #[test]
        fn drawdown_zero_for_sorted_series(mut values in proptest::collection::vec(0.01f64..1e9, 2..60)) {
            values.sort_by(f64::total_cmp);
            prop_assert!(compute_drawdown(&values) == 0.0);
        }
    }
}
