//! Configuration management for Tycoon
//!
//! Game URLs, browser window, retry bounds, render delays and the default
//! aircraft. Loaded from `tycoon.toml` and passed explicitly into each flow.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::{Aircraft, Result, TycoonError};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tycoon.toml";

/// Tool-wide configuration
///
/// Loaded from `tycoon.toml`; every section falls back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TycoonConfig {
    /// Root of the scraped-data cache
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub configurator: ConfiguratorConfig,

    #[serde(default)]
    pub browser: BrowserDefaults,

    #[serde(default)]
    pub retry: RetryDefaults,

    #[serde(default)]
    pub delays: DelayDefaults,

    #[serde(default)]
    pub defaults: AircraftDefaults,
}

/// Game site and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the login e-mail
    #[serde(default = "default_email_env")]
    pub email_env: String,

    /// Environment variable holding the password
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

/// Third-party seat configurator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    #[serde(default = "default_configurator_url")]
    pub url: String,

    /// Highest wave number scanned
    #[serde(default = "default_max_waves")]
    pub max_waves: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserDefaults {
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Element wait timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Overrides Chrome's user agent when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Retry bounds for page lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryDefaults {
    #[serde(default = "default_lookup_attempts")]
    pub lookup_attempts: usize,

    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,

    /// Planning board lookups back off linearly
    #[serde(default = "default_planning_attempts")]
    pub planning_attempts: usize,

    #[serde(default = "default_planning_delay_ms")]
    pub planning_delay_ms: u64,

    #[serde(default = "default_planning_step_ms")]
    pub planning_step_ms: u64,
}

/// Fixed waits letting pages finish rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayDefaults {
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Wait before pressing "calculate" in the configurator
    #[serde(default = "default_calculate_ms")]
    pub calculate_ms: u64,
}

/// Defaults for command-line options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftDefaults {
    #[serde(default = "default_maker")]
    pub maker: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_nth_best")]
    pub nth_best: usize,

    #[serde(default = "default_buy_count")]
    pub buy_count: u32,
}

/// Game login read from the environment
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn from_env(game: &GameConfig) -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| {
                TycoonError::Config(format!("environment variable {} is not set", name))
            })
        };
        Ok(Self {
            email: read(&game.email_env)?,
            password: read(&game.password_env)?,
        })
    }
}

// Default value providers
fn default_data_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_base_url() -> String {
    "https://tycoon.airlines-manager.com".to_string()
}

fn default_email_env() -> String {
    "TYCOON_EMAIL".to_string()
}

fn default_password_env() -> String {
    "TYCOON_PASSWORD".to_string()
}

fn default_configurator_url() -> String {
    "https://destinations.noway.info/en/seatconfigurator/index.html".to_string()
}

fn default_max_waves() -> u32 {
    9
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_lookup_attempts() -> usize {
    6
}

fn default_lookup_delay_ms() -> u64 {
    5_000
}

fn default_planning_attempts() -> usize {
    10
}

fn default_planning_delay_ms() -> u64 {
    1_000
}

fn default_planning_step_ms() -> u64 {
    1_000
}

fn default_settle_ms() -> u64 {
    2_000
}

fn default_calculate_ms() -> u64 {
    5_000
}

fn default_maker() -> String {
    "Boeing".to_string()
}

fn default_model() -> String {
    "747-400".to_string()
}

fn default_nth_best() -> usize {
    2
}

fn default_buy_count() -> u32 {
    30
}

impl TycoonConfig {
    /// Load configuration from `path` or use defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                TycoonError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `path`
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| TycoonError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Aircraft used when the command line names none
    pub fn default_aircraft(&self) -> Aircraft {
        Aircraft::new(&self.defaults.maker, &self.defaults.model)
    }
}

impl RetryDefaults {
    /// Element lookups on regular pages
    pub fn lookup_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.lookup_attempts, Duration::from_millis(self.lookup_delay_ms))
    }

    /// Lookups on the planning board, which fills in slowly
    pub fn planning_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(
            self.planning_attempts,
            Duration::from_millis(self.planning_delay_ms),
            Duration::from_millis(self.planning_step_ms),
        )
    }
}

impl DelayDefaults {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn calculate(&self) -> Duration {
        Duration::from_millis(self.calculate_ms)
    }
}

impl Default for TycoonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            game: GameConfig::default(),
            configurator: ConfiguratorConfig::default(),
            browser: BrowserDefaults::default(),
            retry: RetryDefaults::default(),
            delays: DelayDefaults::default(),
            defaults: AircraftDefaults::default(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            email_env: default_email_env(),
            password_env: default_password_env(),
        }
    }
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            url: default_configurator_url(),
            max_waves: default_max_waves(),
        }
    }
}

impl Default for BrowserDefaults {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
        }
    }
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self {
            lookup_attempts: default_lookup_attempts(),
            lookup_delay_ms: default_lookup_delay_ms(),
            planning_attempts: default_planning_attempts(),
            planning_delay_ms: default_planning_delay_ms(),
            planning_step_ms: default_planning_step_ms(),
        }
    }
}

impl Default for DelayDefaults {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            calculate_ms: default_calculate_ms(),
        }
    }
}

impl Default for AircraftDefaults {
    fn default() -> Self {
        Self {
            maker: default_maker(),
            model: default_model(),
            nth_best: default_nth_best(),
            buy_count: default_buy_count(),
        }
    }
}
