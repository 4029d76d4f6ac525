//! Configuration types for the dynv6 update agent
//!
//! The configuration is built once at startup (usually from `DYNV6_*`
//! environment variables) and passed by value into the components that need
//! it. Nothing in the core reads the environment after construction.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::traits::AddressFamily;

/// Prefix recognized on environment keys (matched case-insensitively)
pub const ENV_PREFIX: &str = "dynv6_";

/// Main agent configuration
#[derive(Clone)]
pub struct Dynv6Config {
    /// Hostname registered at dynv6 (e.g. "myhost.dynv6.net")
    pub hostname: String,

    /// HTTP token of the zone
    /// ⚠️ NEVER log this value
    pub token: String,

    /// Seconds to sleep between two cycles
    pub interval_secs: f64,

    /// Skip the IPv4 family entirely
    pub no_ipv4: bool,

    /// Skip the IPv6 family entirely
    pub no_ipv6: bool,

    /// Interface whose IPv6 address is published
    pub interface: String,

    /// Log verbosity
    pub log_level: LogLevel,

    /// Directory holding the last-sent address files
    pub data_dir: PathBuf,

    /// Which dynv6 endpoint to call
    pub api: ApiKind,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for Dynv6Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynv6Config")
            .field("hostname", &self.hostname)
            .field("token", &"<REDACTED>")
            .field("interval_secs", &self.interval_secs)
            .field("no_ipv4", &self.no_ipv4)
            .field("no_ipv6", &self.no_ipv6)
            .field("interface", &self.interface)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("api", &self.api)
            .finish()
    }
}

impl Dynv6Config {
    /// Create a configuration with defaults for every optional setting
    pub fn new(hostname: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            token: token.into(),
            interval_secs: default_interval_secs(),
            no_ipv4: false,
            no_ipv6: false,
            interface: default_interface(),
            log_level: LogLevel::default(),
            data_dir: default_data_dir(),
            api: ApiKind::default(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from key/value pairs
    ///
    /// Only keys starting with [`ENV_PREFIX`] (any case) are considered.
    /// Unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings: HashMap<String, String> = HashMap::new();
        for (key, value) in vars {
            let key = key.as_ref().to_ascii_lowercase();
            if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                settings.insert(name.to_string(), value.into());
            }
        }

        let hostname = settings
            .remove("hostname")
            .ok_or_else(|| Error::config_missing("hostname"))?;
        let token = settings
            .remove("token")
            .ok_or_else(|| Error::config_missing("token"))?;

        let mut config = Self::new(hostname, token);

        if let Some(raw) = settings.remove("interval") {
            config.interval_secs = raw.trim().parse().map_err(|_| {
                Error::config(format!("interval must be a number of seconds, got '{}'", raw))
            })?;
        }
        if let Some(raw) = settings.remove("no_ipv4") {
            config.no_ipv4 = parse_bool("no_ipv4", &raw)?;
        }
        if let Some(raw) = settings.remove("no_ipv6") {
            config.no_ipv6 = parse_bool("no_ipv6", &raw)?;
        }
        if let Some(interface) = settings.remove("interface") {
            config.interface = interface;
        }
        if let Some(raw) = settings.remove("log_level") {
            config.log_level = raw.parse()?;
        }
        if let Some(dir) = settings.remove("data_dir") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = settings.remove("api") {
            config.api = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(Error::config("hostname cannot be empty"));
        }
        if self.token.is_empty() {
            return Err(Error::config("token cannot be empty"));
        }
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(Error::config(format!(
                "interval must be > 0, got {}",
                self.interval_secs
            )));
        }
        if self.no_ipv4 && self.no_ipv6 {
            return Err(Error::config("no_ipv4 and no_ipv6 can't both be true"));
        }
        if !self.no_ipv6 && self.interface.is_empty() {
            return Err(Error::config("interface cannot be empty when IPv6 is enabled"));
        }
        Ok(())
    }

    /// Sleep between two cycles
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_interval_secs()))
    }

    /// Families checked every cycle, in check order
    pub fn enabled_families(&self) -> Vec<AddressFamily> {
        let mut families = Vec::with_capacity(2);
        if !self.no_ipv4 {
            families.push(AddressFamily::Ipv4);
        }
        if !self.no_ipv6 {
            families.push(AddressFamily::Ipv6);
        }
        families
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::config(format!(
            "{} must be a boolean (true/false), got '{}'",
            key, raw
        ))),
    }
}

fn default_interval_secs() -> f64 {
    600.0
}

fn default_interface() -> String {
    "eth0".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Log verbosity
///
/// Accepts the usual level names plus the aliases `SUCCESS` (info),
/// `WARNING` (warn) and `CRITICAL` (error).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Matching `tracing` level
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" | "success" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "critical" => Ok(LogLevel::Error),
            _ => Err(Error::config(format!(
                "log_level '{}' is not valid. \
                Valid levels: TRACE, DEBUG, INFO, SUCCESS, WARNING, ERROR, CRITICAL",
                s
            ))),
        }
    }
}

/// dynv6 endpoint flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiKind {
    /// `GET /api/update` with hostname/token/ipv4/ipv6 query parameters
    #[default]
    Update,
    /// DynDNS-compatible `GET /nic/update` with basic auth
    DynDns,
}

impl std::str::FromStr for ApiKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "update" => Ok(ApiKind::Update),
            "dyndns" => Ok(ApiKind::DynDns),
            _ => Err(Error::config(format!(
                "api '{}' is not supported. Supported: update, dyndns",
                s
            ))),
        }
    }
}
