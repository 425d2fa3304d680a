//! CLI orchestration tests.
//!
//! Covers:
//! - Flag / config-file / built-in default precedence for both commands
//! - Settings parsing from real INI files on disk
//! - CSV report export driven through the report port

mod common;

use folio::adapters::settings::Settings;
use folio::cli::{
    resolve_analyze_params, resolve_rebalance_params, DEFAULT_BENCHMARK, DEFAULT_NAME,
    DEFAULT_PRICES_DIR, DEFAULT_TOLERANCE,
};
use folio::domain::holding::Currency;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_INI: &str = r#"
[portfolio]
name = Retirement
currency = KRW
benchmark = ^KS11
risk_free_rate = 0.03

[data]
prices_dir = /var/prices

[rebalance]
tolerance = 0.05
tax_rate = 0.22
"#;

mod params_resolution {
    use super::*;

    #[test]
    fn analyze_defaults_without_flags_or_config() {
        let params =
            resolve_analyze_params(None, None, None, None, None, &Settings::default());
        assert_eq!(params.name, DEFAULT_NAME);
        assert_eq!(params.currency, Currency::Usd);
        assert_eq!(params.benchmark, DEFAULT_BENCHMARK);
        assert!((params.risk_free_rate - 0.0).abs() < f64::EPSILON);
        assert_eq!(params.prices_dir, PathBuf::from(DEFAULT_PRICES_DIR));
    }

    #[test]
    fn analyze_config_fills_missing_flags() {
        let file = write_temp_ini(FULL_INI);
        let settings = Settings::from_file(file.path()).unwrap();

        let params = resolve_analyze_params(None, None, None, None, None, &settings);
        assert_eq!(params.name, "Retirement");
        assert_eq!(params.currency, Currency::Krw);
        assert_eq!(params.benchmark, "^KS11");
        assert!((params.risk_free_rate - 0.03).abs() < f64::EPSILON);
        assert_eq!(params.prices_dir, PathBuf::from("/var/prices"));
    }

    #[test]
    fn analyze_flags_override_config() {
        let file = write_temp_ini(FULL_INI);
        let settings = Settings::from_file(file.path()).unwrap();

        let params = resolve_analyze_params(
            Some("Override".to_string()),
            Some(Currency::Usd),
            Some("SPY".to_string()),
            Some(0.01),
            Some(PathBuf::from("./local")),
            &settings,
        );
        assert_eq!(params.name, "Override");
        assert_eq!(params.currency, Currency::Usd);
        assert_eq!(params.benchmark, "SPY");
        assert!((params.risk_free_rate - 0.01).abs() < f64::EPSILON);
        assert_eq!(params.prices_dir, PathBuf::from("./local"));
    }

    #[test]
    fn rebalance_defaults_without_flags_or_config() {
        let params = resolve_rebalance_params(None, None, None, None, None, &Settings::default());
        assert!((params.tolerance - DEFAULT_TOLERANCE).abs() < f64::EPSILON);
        assert!((params.tax_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rebalance_config_and_flag_precedence() {
        let file = write_temp_ini(FULL_INI);
        let settings = Settings::from_file(file.path()).unwrap();

        let from_config = resolve_rebalance_params(None, None, None, None, None, &settings);
        assert!((from_config.tolerance - 0.05).abs() < f64::EPSILON);
        assert!((from_config.tax_rate - 0.22).abs() < f64::EPSILON);

        let from_flags =
            resolve_rebalance_params(None, None, Some(0.01), Some(0.0), None, &settings);
        assert!((from_flags.tolerance - 0.01).abs() < f64::EPSILON);
        assert!((from_flags.tax_rate - 0.0).abs() < f64::EPSILON);
    }
}

mod report_export {
    use super::*;
    use crate::common::*;
    use folio::adapters::csv_report_adapter::CsvReportAdapter;
    use folio::cli::{self, AnalyzeParams};
    use folio::ports::report_port::ReportPort;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn exported_analysis_reflects_pipeline_output() {
        let market = MockMarketData::new()
            .with_closes("AAPL", &[190.0, 200.0])
            .with_closes("SPY", &[400.0, 404.0]);
        let holdings = vec![make_holding("AAPL", 10.0, 150.0)];
        let params = AnalyzeParams {
            name: "Export Test".to_string(),
            currency: Currency::Usd,
            benchmark: "SPY".to_string(),
            risk_free_rate: 0.0,
            prices_dir: PathBuf::new(),
        };
        let report = cli::analyze_portfolio(&market, holdings, &params).unwrap();

        let dir = TempDir::new().unwrap();
        let prefix = dir.path().join("out");
        CsvReportAdapter.write_analysis(&report, &prefix).unwrap();

        let summary = fs::read_to_string(dir.path().join("out_summary.csv")).unwrap();
        assert!(summary.contains("portfolio_name,Export Test"));
        assert!(summary.contains("total_value,2000"));

        let holdings_csv = fs::read_to_string(dir.path().join("out_holdings.csv")).unwrap();
        assert!(holdings_csv.contains("AAPL"));
    }
}
