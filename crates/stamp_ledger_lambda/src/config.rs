use std::time::Duration;

use crate::runtime::record::DEFAULT_TABLE_NAME;
use crate::telemetry::LogFormat;

pub const TABLE_NAME_ENV: &str = "STAMP_TABLE_NAME";
pub const TABLE_REGION_ENV: &str = "STAMP_TABLE_REGION";
pub const MAX_ATTEMPTS_ENV: &str = "STAMP_STORE_MAX_ATTEMPTS";
pub const OPERATION_TIMEOUT_ENV: &str = "STAMP_STORE_OPERATION_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "STAMP_LEDGER_LOG_FORMAT";

/// Start-up configuration for the ledger binaries. Retry and timeout settings
/// apply to the store client only; unset values leave the SDK defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub table_name: String,
    pub region: Option<String>,
    pub max_attempts: Option<u32>,
    pub operation_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            region: None,
            max_attempts: None,
            operation_timeout: None,
            log_format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let value_of = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let max_attempts = match value_of(MAX_ATTEMPTS_ENV) {
            Some(raw) => Some(parse_positive(MAX_ATTEMPTS_ENV, &raw)? as u32),
            None => None,
        };
        let operation_timeout = match value_of(OPERATION_TIMEOUT_ENV) {
            Some(raw) => Some(Duration::from_millis(parse_positive(
                OPERATION_TIMEOUT_ENV,
                &raw,
            )?)),
            None => None,
        };
        let log_format = match value_of(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|reason| ConfigError::InvalidValue {
                key: LOG_FORMAT_ENV,
                value: raw.clone(),
                reason,
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            table_name: value_of(TABLE_NAME_ENV).unwrap_or(defaults.table_name),
            region: value_of(TABLE_REGION_ENV),
            max_attempts,
            operation_timeout,
            log_format,
        })
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let value = raw
        .parse::<u64>()
        .map_err(|_| invalid("expected a positive integer"))?;
    if value == 0 || value > u64::from(u32::MAX) {
        return Err(invalid("expected a positive integer"));
    }
    Ok(value)
}
