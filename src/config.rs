use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::core::{
    AltRate, AltRateTable, FinancingCalculator, RateSchedule, RateTableError, RateTier,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rates file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rates file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid rate table: {0}")]
    Table(#[from] RateTableError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RatesFile {
    rate_schedule: Vec<RateTier>,
    alternatives: Vec<AltRate>,
}

/// `None` yields the built-in tables.
pub fn load_financing_model(path: Option<&Path>) -> Result<FinancingCalculator, ConfigError> {
    let Some(path) = path else {
        return Ok(FinancingCalculator::default());
    };

    let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RatesFile = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let schedule = RateSchedule::new(file.rate_schedule)?;
    let alternatives = AltRateTable::new(file.alternatives)?;

    info!(
        path = %path.display(),
        tiers = schedule.tiers().len(),
        alternatives = alternatives.entries().len(),
        "loaded financing rate tables"
    );
    Ok(FinancingCalculator::new(schedule, alternatives))
}
