//! Configuration management for fleetboard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "fleetboard";

/// Trucks marked available when the board is first built.
///
/// Every other truck in the fleet file starts out unavailable.
pub const DEFAULT_INITIALLY_AVAILABLE: &[&str] = &[
    "ALPHA 5", "ALPHA 8", "MED-0", "MED-2", "MED-3", "MED-4", "MED-5", "MED-6", "MED-7", "MED-8",
    "MED-9", "MED-13", "MED-14", "MED-15", "MED-16", "MED-17",
];

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `ADMIN_PASSWORD` and `PORT` environment variables
/// 2. Environment variables prefixed with `FLEETBOARD_` (`__` separates
///    the section from the key, e.g. `FLEETBOARD_SERVER__HOST`)
/// 3. TOML config file at `~/.config/fleetboard/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// File locations.
    pub storage: StorageConfig,
    /// Admin page configuration.
    pub admin: AdminConfig,
    /// Dispatch board configuration.
    pub dispatch: DispatchConfig,
    /// Activity log configuration.
    pub activity: ActivityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON fleet file (trucks and fallback rules).
    pub fleet_path: PathBuf,
    /// Path to the plain-text activity log.
    pub activity_log_path: PathBuf,
}

/// Admin page configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared admin password, compared in plaintext.
    pub password: String,
}

/// Dispatch board configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Truck ids that start out available.
    pub initially_available: Vec<String>,
    /// Only trucks whose id starts with this prefix count towards the
    /// low-availability alert.
    pub alert_prefix: String,
    /// Alert when this many or fewer prefixed trucks are available.
    pub alert_threshold: usize,
    /// Minutes at a logistics stop before a truck is flagged overdue.
    pub logistics_overdue_minutes: u32,
    /// Minutes at a destination stop before a truck is flagged overdue.
    pub destination_overdue_minutes: u32,
}

/// Activity log configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Entries older than this are dropped on the next write.
    pub retention_hours: u32,
    /// IANA time zone used when rendering and parsing log timestamps.
    pub timezone: String,
    /// Maximum entries shown on the dashboard. Set to 0 for unlimited.
    pub display_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            fleet_path: PathBuf::from("data/truck_config.json"),
            activity_log_path: PathBuf::from("logs/activity.log"),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: "ADMIN123".to_string(),
        }
    }
}

// Keep the password out of debug output and logs.
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            initially_available: DEFAULT_INITIALLY_AVAILABLE
                .iter()
                .map(ToString::to_string)
                .collect(),
            alert_prefix: "MED".to_string(),
            alert_threshold: 3,
            logistics_overdue_minutes: 10,
            destination_overdue_minutes: 20,
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            retention_hours: 72,
            timezone: "America/New_York".to_string(),
            display_limit: 0,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the layered figment for the given config file.
    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("FLEETBOARD_").split("__"))
            .merge(
                Env::raw()
                    .only(&["ADMIN_PASSWORD"])
                    .map(|_| "admin.password".into()),
            )
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.admin.password.is_empty() {
            return Err(Error::ConfigValidation {
                message: "admin.password must not be empty".to_string(),
            });
        }

        if self.activity.retention_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "activity.retention_hours must be greater than 0".to_string(),
            });
        }

        self.log_timezone()?;

        if self.dispatch.logistics_overdue_minutes == 0
            || self.dispatch.destination_overdue_minutes == 0
        {
            return Err(Error::ConfigValidation {
                message: "overdue windows must be greater than 0 minutes".to_string(),
            });
        }

        Ok(())
    }

    /// Get the socket address string the server listens on.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the activity log retention window.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::hours(i64::from(self.activity.retention_hours))
    }

    /// Get the time zone used for activity log timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if `activity.timezone` is not a known IANA name.
    pub fn log_timezone(&self) -> Result<Tz> {
        self.activity
            .timezone
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!(
                    "activity.timezone '{}' is not a known time zone",
                    self.activity.timezone
                ),
            })
    }

    /// Get the logistics overdue window.
    #[must_use]
    pub fn logistics_overdue(&self) -> Duration {
        Duration::minutes(i64::from(self.dispatch.logistics_overdue_minutes))
    }

    /// Get the destination overdue window.
    #[must_use]
    pub fn destination_overdue(&self) -> Duration {
        Duration::minutes(i64::from(self.dispatch.destination_overdue_minutes))
    }
}
