//! Portfolio holdings and ticker validation.

use std::fmt;
use std::str::FromStr;

/// Currency a holding (or the whole portfolio) is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Currency {
    Usd,
    Krw,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Krw => write!(f, "KRW"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "KRW" => Ok(Currency::Krw),
            other => Err(format!("unknown currency: '{other}'")),
        }
    }
}

/// A single portfolio position, immutable within an analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Holding {
    pub ticker: String,
    pub name: String,
    pub quantity: f64,
    pub avg_cost: f64,
    pub currency: Currency,
}

impl Holding {
    /// Validates invariants: recognized ticker format, `quantity > 0`,
    /// `avg_cost >= 0`.
    pub fn new(
        ticker: &str,
        name: &str,
        quantity: f64,
        avg_cost: f64,
        currency: Currency,
    ) -> Result<Self, String> {
        let ticker = validate_ticker(ticker)?;
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(format!("quantity must be positive, got {quantity}"));
        }
        if !avg_cost.is_finite() || avg_cost < 0.0 {
            return Err(format!("avg_cost must be non-negative, got {avg_cost}"));
        }
        Ok(Holding {
            ticker,
            name: name.trim().to_string(),
            quantity,
            avg_cost,
            currency,
        })
    }

    pub fn total_cost(&self) -> f64 {
        self.quantity * self.avg_cost
    }
}

/// Validate and normalize a ticker symbol.
///
/// Accepted forms: US equity (`AAPL`, 1-5 uppercase letters), Korean listing
/// (`005930.KS` or `.KQ`, six digits) and index symbols (`^GSPC`).
pub fn validate_ticker(ticker: &str) -> Result<String, String> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err("ticker cannot be empty".to_string());
    }
    if is_us_ticker(ticker) || is_kr_ticker(ticker) || is_index_ticker(ticker) {
        return Ok(ticker.to_string());
    }
    Err(format!("invalid ticker: '{ticker}'"))
}

fn is_us_ticker(s: &str) -> bool {
    (1..=5).contains(&s.len()) && s.chars().all(|c| c.is_ascii_uppercase())
}

fn is_kr_ticker(s: &str) -> bool {
    let Some((code, market)) = s.split_once('.') else {
        return false;
    };
    code.len() == 6
        && code.chars().all(|c| c.is_ascii_digit())
        && matches!(market, "KS" | "KQ")
}

fn is_index_ticker(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('^') else {
        return false;
    };
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
