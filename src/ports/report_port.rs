//! Report export port trait.

use std::path::Path;

use crate::domain::error::FolioError;
use crate::domain::metrics::MetricsReport;
use crate::domain::rebalance::RebalanceReport;

/// Port for writing analysis and rebalance reports. Receives plain structured
/// records; formatting, currency symbols, and locale belong to the adapter.
pub trait ReportPort {
    fn write_analysis(&self, report: &MetricsReport, prefix: &Path) -> Result<(), FolioError>;

    fn write_rebalance(&self, report: &RebalanceReport, prefix: &Path) -> Result<(), FolioError>;
}
