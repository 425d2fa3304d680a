//! INI settings file with defaults for CLI flags.
//!
//! Every value is optional; flags given on the command line win. Layout:
//!
//! ```ini
//! [portfolio]
//! name = My Portfolio
//! currency = USD
//! benchmark = SPY
//! risk_free_rate = 0.02
//!
//! [data]
//! prices_dir = ./prices
//!
//! [rebalance]
//! tolerance = 0.02
//! tax_rate = 0.22
//! ```

use configparser::ini::Ini;
use std::path::{Path, PathBuf};

use crate::domain::error::FolioError;
use crate::domain::holding::Currency;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub name: Option<String>,
    pub currency: Option<Currency>,
    pub benchmark: Option<String>,
    pub risk_free_rate: Option<f64>,
    pub prices_dir: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub tax_rate: Option<f64>,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FolioError> {
        let mut ini = Ini::new();
        ini.load(&path).map_err(|reason| FolioError::ConfigParse {
            file: path.as_ref().display().to_string(),
            reason,
        })?;
        Self::from_ini(&ini)
    }

    pub fn from_string(content: &str) -> Result<Self, FolioError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| FolioError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, FolioError> {
        let currency = match ini.get("portfolio", "currency") {
            Some(raw) => Some(raw.parse::<Currency>().map_err(|reason| {
                FolioError::ConfigInvalid {
                    key: "[portfolio] currency".to_string(),
                    reason,
                }
            })?),
            None => None,
        };

        Ok(Settings {
            name: ini.get("portfolio", "name"),
            currency,
            benchmark: ini.get("portfolio", "benchmark"),
            risk_free_rate: get_float(ini, "portfolio", "risk_free_rate")?,
            prices_dir: ini.get("data", "prices_dir").map(PathBuf::from),
            tolerance: get_float(ini, "rebalance", "tolerance")?,
            tax_rate: get_float(ini, "rebalance", "tax_rate")?,
        })
    }
}

fn get_float(ini: &Ini, section: &str, key: &str) -> Result<Option<f64>, FolioError> {
    ini.getfloat(section, key)
        .map_err(|reason| FolioError::ConfigInvalid {
            key: format!("[{section}] {key}"),
            reason,
        })
}
