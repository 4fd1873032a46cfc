//! Configuration for the booking flow.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Binaries load an optional `.env` file with `dotenvy` first.

use crate::aggregator::CommitDispatch;
use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Default backend base URL (local development stack)
pub const DEFAULT_LEDGER_URL: &str = "http://localhost:54321";
/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Booking flow configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL (`BOOKING_LEDGER_URL`)
    pub ledger_url: String,
    /// Bearer key sent with every backend request (`BOOKING_LEDGER_API_KEY`)
    pub ledger_api_key: Option<String>,
    /// Per-request timeout (`BOOKING_LEDGER_TIMEOUT_MS`)
    pub ledger_timeout: Duration,
    /// How commits issue reservations (`BOOKING_COMMIT_DISPATCH`)
    pub dispatch: CommitDispatch,
    /// Tracing filter (`RUST_LOG`)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_url: DEFAULT_LEDGER_URL.to_string(),
            ledger_api_key: None,
            ledger_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            dispatch: CommitDispatch::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown dispatch strategy or a value
    /// rejected by [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    ///
    /// Unparseable timeouts fall back to the default, matching how missing
    /// variables are treated.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            ledger_url: lookup("BOOKING_LEDGER_URL")
                .unwrap_or_else(|| DEFAULT_LEDGER_URL.to_string()),
            ledger_api_key: lookup("BOOKING_LEDGER_API_KEY").filter(|key| !key.is_empty()),
            ledger_timeout: Duration::from_millis(
                lookup("BOOKING_LEDGER_TIMEOUT_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            ),
            dispatch: lookup("BOOKING_COMMIT_DISPATCH")
                .map(|s| s.parse::<CommitDispatch>())
                .transpose()?
                .unwrap_or_default(),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that have no usable default
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingLedgerUrl`] for an empty URL
    /// - [`ConfigError::ZeroTimeout`] for a zero timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger_url.trim().is_empty() {
            return Err(ConfigError::MissingLedgerUrl);
        }
        if self.ledger_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
