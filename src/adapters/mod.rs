//! Concrete adapter implementations for ports.

pub mod csv_market_adapter;
pub mod csv_report_adapter;
pub mod portfolio_csv;
pub mod settings;
pub mod text_report;
