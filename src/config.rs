//! TOML-based application configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::appliances::{ApplianceCatalog, BUILTIN_RATINGS};
use crate::auth::{DEFAULT_MIN_PASSWORD_LEN, PasswordPolicy};
use crate::report::{
    DEFAULT_CURRENCY, DEFAULT_HIGH_USAGE_THRESHOLD, DEFAULT_RATE_PER_KWH, ReportSettings,
};
use crate::store::{JsonFileStore, MemoryStore, RecordStore, StoreError};

/// Top-level configuration parsed from TOML.
///
/// Every section has defaults, so an empty file is a valid configuration.
/// Load with [`AppConfig::from_toml_file`] or start from
/// [`AppConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Electricity tariff for cost estimates.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Energy-saving advice thresholds.
    #[serde(default)]
    pub advice: AdviceConfig,
    /// Account rules.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Record store backend.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Appliance wattage table.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Price per kWh.
    pub rate_per_kwh: f64,
    /// Currency symbol prefixed to costs.
    pub currency: String,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            rate_per_kwh: DEFAULT_RATE_PER_KWH,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdviceConfig {
    /// Allocated share above which a saving tip is shown.
    pub high_usage_threshold: f64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            high_usage_threshold: DEFAULT_HIGH_USAGE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Minimum password length in characters.
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// `"memory"` or `"json"`.
    pub backend: String,
    /// Document path for the `json` backend.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: PathBuf::from("smart_power.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Start from the builtin appliance table.
    pub use_builtin: bool,
    /// Extra or overriding ratings, in watts.
    pub wattages: BTreeMap<String, u32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            use_builtin: true,
            wattages: BTreeMap::new(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"tariff.rate_per_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl AppConfig {
    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push(ConfigError::new("server.host", "must not be empty"));
        }

        let t = &self.tariff;
        if !t.rate_per_kwh.is_finite() || t.rate_per_kwh < 0.0 {
            errors.push(ConfigError::new(
                "tariff.rate_per_kwh",
                "must be a finite number >= 0",
            ));
        }

        if !self.advice.high_usage_threshold.is_finite() {
            errors.push(ConfigError::new(
                "advice.high_usage_threshold",
                "must be finite",
            ));
        }

        if self.auth.min_password_len == 0 {
            errors.push(ConfigError::new("auth.min_password_len", "must be > 0"));
        }

        let st = &self.storage;
        if st.backend != "memory" && st.backend != "json" {
            errors.push(ConfigError::new(
                "storage.backend",
                format!("must be \"memory\" or \"json\", got \"{}\"", st.backend),
            ));
        }
        if st.backend == "json" && st.path.as_os_str().is_empty() {
            errors.push(ConfigError::new(
                "storage.path",
                "must be set for the json backend",
            ));
        }

        let c = &self.catalog;
        for (name, &watts) in &c.wattages {
            if name.trim().is_empty() {
                errors.push(ConfigError::new(
                    "catalog.wattages",
                    "appliance names must not be empty",
                ));
            }
            if watts == 0 {
                errors.push(ConfigError::new(
                    format!("catalog.wattages.{name}"),
                    "must be > 0",
                ));
            }
        }
        if !c.use_builtin && c.wattages.is_empty() {
            errors.push(ConfigError::new(
                "catalog.wattages",
                "must list appliances when catalog.use_builtin is false",
            ));
        }

        errors
    }

    /// Builds the appliance catalog: builtin entries first (when enabled),
    /// then configured wattages, which override builtin ones by name.
    pub fn catalog(&self) -> ApplianceCatalog {
        let builtin = BUILTIN_RATINGS
            .iter()
            .filter(|_| self.catalog.use_builtin)
            .map(|&(name, watts)| (name.to_string(), watts));
        let extra = self
            .catalog
            .wattages
            .iter()
            .map(|(name, &watts)| (name.clone(), watts));
        ApplianceCatalog::from_ratings(builtin.chain(extra))
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            rate_per_kwh: self.tariff.rate_per_kwh,
            currency: self.tariff.currency.clone(),
            high_usage_threshold: self.advice.high_usage_threshold,
        }
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_len: self.auth.min_password_len,
        }
    }

    /// Opens the configured record store.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the json document exists but is unreadable.
    pub fn open_store(&self) -> Result<Arc<dyn RecordStore>, StoreError> {
        if self.storage.backend == "json" {
            Ok(Arc::new(JsonFileStore::open(&self.storage.path)?))
        } else {
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
