use std::path::Path;

use serde::{Deserialize, Serialize};

use lpl_types::{DEFAULT_CONTRACT_TYPE, POINT_SCALE};

use crate::error::{LedgerError, LedgerResult};

/// How predicate queries reach the world state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Hand the selector to the state database.
    #[default]
    Rich,
    /// Scan the full keyspace and evaluate the selector locally. For state
    /// databases without rich-query support.
    RangeScan,
}

/// Configuration for ledger operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub query_mode: QueryMode,
    /// Reject contracts whose `validFrom` is after `validUpto`.
    pub validate_validity_window: bool,
    /// Only allow `INITIALIZED -> ACCRUED | FAILED` status changes.
    pub enforce_status_transitions: bool,
    /// Decimal places kept on accrued points.
    pub point_scale: u32,
    /// Contract type recorded when a payload omits one.
    pub default_contract_type: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            query_mode: QueryMode::Rich,
            validate_validity_window: true,
            enforce_status_transitions: false,
            point_scale: POINT_SCALE,
            default_contract_type: DEFAULT_CONTRACT_TYPE.into(),
        }
    }
}

impl LedgerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        // rust_decimal carries at most 28 fractional digits.
        if self.point_scale > 28 {
            return Err(LedgerError::Config(format!(
                "point_scale must be at most 28, got {}",
                self.point_scale
            )));
        }
        if self.default_contract_type.trim().is_empty() {
            return Err(LedgerError::Config(
                "default_contract_type must not be empty".into(),
            ));
        }
        Ok(())
    }
}
