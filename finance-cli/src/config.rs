use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use finance_core::StorageConfig;
use finance_core::submit::DEFAULT_MAX_UPLOAD_BYTES;
use finance_core::wizard::WizardConfig;
use finance_http::ApiConfig;

/// Contents of `finance.toml`. Every section is optional.
///
/// ```toml
/// [api]
/// base_url = "https://driftech.tech/dashboard/public/api"
///
/// [storage]
/// backend = "sqlite"
/// connection_string = "finance.db"
///
/// [wizard]
/// reset_delay_ms = 3000
///
/// [logging]
/// level = "debug"
/// file = "finance.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub wizard: WizardSettings,
    pub uploads: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardSettings {
    pub reset_delay_ms: u64,
    pub auth_wait_ms: u64,
}

impl Default for WizardSettings {
    fn default() -> Self {
        let defaults = WizardConfig::default();
        Self {
            reset_delay_ms: duration_ms(defaults.reset_delay),
            auth_wait_ms: duration_ms(defaults.auth_wait_timeout),
        }
    }
}

impl WizardSettings {
    pub fn to_wizard_config(&self) -> WizardConfig {
        WizardConfig {
            reset_delay: Duration::from_millis(self.reset_delay_ms),
            auth_wait_timeout: Duration::from_millis(self.auth_wait_ms),
            ..WizardConfig::default()
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_upload_bytes: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Bare level or full `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in '{}'", path.display()))
    }
}
