//! Engine configuration management.

use serde::Deserialize;

use crate::error::AppError;
use crate::types::Currency;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Document defaults.
    #[serde(default)]
    pub documents: DocumentConfig,
    /// Document numbering configuration.
    #[serde(default)]
    pub numbering: NumberingConfig,
}

/// Defaults applied when creating documents.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Default ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Days after the issue date before an estimate expires.
    #[serde(default = "default_estimate_expiry_days")]
    pub estimate_expiry_days: i64,
    /// Net payment terms in days, used to default a bill's due date.
    #[serde(default = "default_net_terms_days")]
    pub net_terms_days: i64,
}

impl DocumentConfig {
    /// The configured default currency.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the configured code is not a
    /// supported ISO 4217 currency.
    pub fn default_currency(&self) -> Result<Currency, AppError> {
        self.currency.parse().map_err(AppError::Validation)
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_estimate_expiry_days() -> i64 {
    30
}

fn default_net_terms_days() -> i64 {
    30
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            estimate_expiry_days: default_estimate_expiry_days(),
            net_terms_days: default_net_terms_days(),
        }
    }
}

/// Document numbering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NumberingConfig {
    /// Prefix for bill numbers.
    #[serde(default = "default_bill_prefix")]
    pub bill_prefix: String,
    /// Prefix for credit note numbers.
    #[serde(default = "default_credit_note_prefix")]
    pub credit_note_prefix: String,
    /// Prefix for estimate numbers.
    #[serde(default = "default_estimate_prefix")]
    pub estimate_prefix: String,
    /// Prefix for expense numbers.
    #[serde(default = "default_expense_prefix")]
    pub expense_prefix: String,
    /// Zero-padded width of the sequence component.
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
}

fn default_bill_prefix() -> String {
    "BILL-".to_string()
}

fn default_credit_note_prefix() -> String {
    "CN-".to_string()
}

fn default_estimate_prefix() -> String {
    "EST-".to_string()
}

fn default_expense_prefix() -> String {
    "EXP-".to_string()
}

fn default_pad_width() -> usize {
    4
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            bill_prefix: default_bill_prefix(),
            credit_note_prefix: default_credit_note_prefix(),
            estimate_prefix: default_estimate_prefix(),
            expense_prefix: default_expense_prefix(),
            pad_width: default_pad_width(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FINCH").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            documents: DocumentConfig::default(),
            numbering: NumberingConfig::default(),
        }
    }
}
