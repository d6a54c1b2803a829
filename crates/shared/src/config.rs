//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Statement reconciliation tuning.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Voucher sequence formatting.
    #[serde(default)]
    pub sequences: SequenceConfig,
    /// Cheque lifecycle behaviour.
    #[serde(default)]
    pub cheques: ChequeConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info,sqlx=warn,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Statement reconciliation tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Days either side of a statement line's date searched by the amount+date matcher.
    #[serde(default = "default_match_window_days")]
    pub match_window_days: u32,
    /// Confidence recorded for reference-token matches.
    #[serde(default = "default_reference_confidence")]
    pub reference_confidence: Decimal,
    /// Confidence recorded for amount+date matches.
    #[serde(default = "default_amount_date_confidence")]
    pub amount_date_confidence: Decimal,
}

fn default_match_window_days() -> u32 {
    3
}

fn default_reference_confidence() -> Decimal {
    Decimal::new(95, 2)
}

fn default_amount_date_confidence() -> Decimal {
    Decimal::new(75, 2)
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            match_window_days: default_match_window_days(),
            reference_confidence: default_reference_confidence(),
            amount_date_confidence: default_amount_date_confidence(),
        }
    }
}

/// Voucher sequence formatting.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    /// Minimum digits in a formatted voucher number.
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
}

fn default_pad_width() -> usize {
    5
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            pad_width: default_pad_width(),
        }
    }
}

/// Cheque lifecycle behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ChequeConfig {
    /// Create the cheques-in-hand, PDC clearing and bank charges accounts on first use.
    #[serde(default = "default_auto_provision")]
    pub auto_provision_clearing: bool,
}

fn default_auto_provision() -> bool {
    true
}

impl Default for ChequeConfig {
    fn default() -> Self {
        Self {
            auto_provision_clearing: default_auto_provision(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `LEDGERLINE__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
