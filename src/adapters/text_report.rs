//! Terminal output formatting.
//!
//! All domain numbers are decimal fractions; this is the only place they are
//! turned into percentages and currency strings. KRW amounts render with no
//! decimal places, USD with two.

use crate::domain::holding::Currency;
use crate::domain::metrics::MetricsReport;
use crate::domain::rebalance::RebalanceReport;
use crate::domain::snapshot::HoldingAnalysis;

pub fn format_currency(value: f64, currency: Currency) -> String {
    let (symbol, decimals) = match currency {
        Currency::Usd => ("$", 2),
        Currency::Krw => ("KRW ", 0),
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{sign}{symbol}{}",
        group_thousands(&format!("{:.*}", decimals, value.abs()))
    )
}

/// Percentage with explicit sign, from a decimal fraction.
pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        return "n/a".to_string();
    }
    let pct = value * 100.0;
    if pct > 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}

pub fn format_summary(report: &MetricsReport) -> String {
    let c = report.currency;
    let sharpe = match report.sharpe_ratio {
        Some(s) => format!("{s:.2}"),
        None => "n/a".to_string(),
    };
    let rule = "=".repeat(60);
    let mut lines = vec![
        rule.clone(),
        format!("  Portfolio: {}", report.portfolio_name),
        format!("  Benchmark: {}", report.benchmark),
        rule.clone(),
        String::new(),
        format!("  Total Value:        {}", format_currency(report.total_value, c)),
        format!("  Total Cost:         {}", format_currency(report.total_cost, c)),
        format!("  Profit/Loss:        {}", format_currency(report.profit_loss(), c)),
        String::new(),
        format!("  Total Return:       {}", format_percent(report.total_return)),
        format!("  Annualized Return:  {}", format_percent(report.annualized_return)),
        format!("  Volatility:         {:.2}%", report.annualized_volatility * 100.0),
        format!("  Sharpe Ratio:       {sharpe}"),
        format!("  Max Drawdown:       {:.2}%", report.max_drawdown * 100.0),
        format!("  Beta:               {:.2}", report.beta),
        format!("  Alpha:              {}", format_percent(report.alpha)),
    ];
    lines.push(rule);
    lines.join("\n")
}

pub fn format_holdings_table(holdings: &[HoldingAnalysis], currency: Currency) -> String {
    let header = format!(
        "{:<10} {:<20} {:>10} {:>14} {:>14} {:>16} {:>8} {:>10}",
        "Ticker", "Name", "Qty", "Avg Cost", "Price", "Value", "Weight", "Return"
    );
    let mut lines = vec![header.clone(), "-".repeat(header.len())];
    for h in holdings {
        lines.push(format!(
            "{:<10} {:<20} {:>10.2} {:>14} {:>14} {:>16} {:>7.1}% {:>10}",
            h.ticker,
            h.name,
            h.quantity,
            format_currency(h.avg_cost, currency),
            format_currency(h.current_price, currency),
            format_currency(h.market_value, currency),
            h.weight * 100.0,
            format_percent(h.holding_return),
        ));
    }
    lines.join("\n")
}

pub fn format_orders_table(report: &RebalanceReport, currency: Currency) -> String {
    let header = format!(
        "{:<6} {:<10} {:<20} {:>12} {:>14} {:>16} {:>14}",
        "Action", "Ticker", "Name", "Qty", "Price", "Amount", "Est. Tax"
    );
    let mut lines = vec![header.clone(), "-".repeat(header.len())];
    for order in &report.orders {
        lines.push(format!(
            "{:<6} {:<10} {:<20} {:>12.4} {:>14} {:>16} {:>14}",
            order.action.to_string(),
            order.ticker,
            order.name,
            order.quantity,
            format_currency(order.price, currency),
            format_currency(order.amount, currency),
            format_currency(order.estimated_tax, currency),
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Total Buy:  {}",
        format_currency(report.total_buy, currency)
    ));
    lines.push(format!(
        "Total Sell: {}",
        format_currency(report.total_sell, currency)
    ));
    lines.push(format!(
        "Est. Tax:   {}",
        format_currency(report.total_tax, currency)
    ));
    lines.push(format!(
        "Net Cash:   {}",
        format_currency(report.net_cash_flow(), currency)
    ));
    lines.join("\n")
}

fn group_thousands(formatted: &str) -> String {
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
