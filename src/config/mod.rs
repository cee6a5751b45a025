//! Monitor configuration.
//!
//! Layers, lowest first: built-in defaults, a `key=value` file, then
//! whatever the caller overrides (the CLI flags).

mod error;

pub use error::ConfigError;

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dns::DNS_TIMEOUT;
use crate::mx::{DaneQueryName, MxOrder};
use crate::posture::AssessOptions;
use crate::probe::PROBE_TIMEOUT;
use crate::sts::STS_FETCH_TIMEOUT;

pub const DEFAULT_CONFIG_FILE: &str = "monitor.conf";
pub const DEFAULT_INPUT: &str = "domains.csv";
pub const DEFAULT_STORE: &str = "posture.json";
pub const DEFAULT_PROBE: &str = "./getUTF8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub input: PathBuf,
    pub store: PathBuf,
    pub full_test: bool,
    pub probe: PathBuf,
    pub probe_args: Vec<String>,
    pub probe_timeout: Duration,
    /// Keep timed-out probes in the capability cache.
    pub cache_timeouts: bool,
    pub dns_timeout: Duration,
    /// Empty means the system resolver configuration.
    pub nameservers: Vec<IpAddr>,
    pub dnssec: bool,
    /// Domains started per `rate_interval`; 0 disables limiting.
    pub rate: u32,
    pub rate_interval: Duration,
    pub concurrency: usize,
    pub mx_order: MxOrder,
    pub dane_name: DaneQueryName,
    pub sts_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            store: PathBuf::from(DEFAULT_STORE),
            full_test: false,
            probe: PathBuf::from(DEFAULT_PROBE),
            probe_args: Vec::new(),
            probe_timeout: PROBE_TIMEOUT,
            cache_timeouts: true,
            dns_timeout: DNS_TIMEOUT,
            nameservers: Vec::new(),
            dnssec: false,
            rate: 1,
            rate_interval: Duration::from_secs(20),
            concurrency: 1,
            mx_order: MxOrder::Answer,
            dane_name: DaneQueryName::Bare,
            sts_timeout: STS_FETCH_TIMEOUT,
        }
    }
}

impl MonitorConfig {
    /// Load `path`, or `monitor.conf` when none is given. Only a missing
    /// default file falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text)
    }

    pub fn parse_str(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line = index + 1, "config line without '=', skipped");
                continue;
            };
            config.apply(index + 1, key.trim(), value.trim())?;
        }
        Ok(config)
    }

    fn apply(&mut self, line: usize, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "input" => self.input = PathBuf::from(value),
            "db" => self.store = PathBuf::from(value),
            "full" => self.full_test = parse_flag(line, key, value)?,
            "probe" => self.probe = PathBuf::from(value),
            "probe_args" => {
                self.probe_args = value.split_whitespace().map(str::to_string).collect()
            }
            "probe_timeout" => self.probe_timeout = parse_seconds(line, key, value)?,
            "cache_timeouts" => self.cache_timeouts = parse_flag(line, key, value)?,
            "dns_timeout" => self.dns_timeout = parse_seconds(line, key, value)?,
            "nameservers" => self.nameservers = parse_nameservers(line, key, value)?,
            "dnssec" => self.dnssec = parse_flag(line, key, value)?,
            "rate" => {
                self.rate = value
                    .parse()
                    .map_err(|_| ConfigError::invalid(line, key, value, "a whole number"))?
            }
            "rate_interval" => self.rate_interval = parse_seconds(line, key, value)?,
            "concurrency" => {
                self.concurrency = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ConfigError::invalid(line, key, value, "a positive number")),
                }
            }
            "mx_order" => {
                self.mx_order = parse_mx_order(value)
                    .ok_or_else(|| ConfigError::invalid(line, key, value, "answer|preference"))?
            }
            "dane_name" => {
                self.dane_name = parse_dane_name(value)
                    .ok_or_else(|| ConfigError::invalid(line, key, value, "bare|port"))?
            }
            "sts_timeout" => self.sts_timeout = parse_seconds(line, key, value)?,
            // database credentials of the hosted store; the file store has none
            "user" | "url" | "pass" => {}
            other => tracing::warn!(line, key = other, "unknown config key, skipped"),
        }
        Ok(())
    }

    pub fn assess_options(&self) -> AssessOptions {
        AssessOptions {
            full_test: self.full_test,
            dnssec: self.dnssec,
            mx_order: self.mx_order,
            dane_name: self.dane_name,
        }
    }
}

pub fn parse_mx_order(value: &str) -> Option<MxOrder> {
    match value.to_ascii_lowercase().as_str() {
        "answer" => Some(MxOrder::Answer),
        "preference" => Some(MxOrder::Preference),
        _ => None,
    }
}

pub fn parse_dane_name(value: &str) -> Option<DaneQueryName> {
    match value.to_ascii_lowercase().as_str() {
        "bare" => Some(DaneQueryName::Bare),
        "port" | "port25" => Some(DaneQueryName::Port25),
        _ => None,
    }
}

fn parse_flag(line: usize, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(line, key, value, "yes|no")),
    }
}

fn parse_seconds(line: usize, key: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::invalid(line, key, value, "a positive number of seconds")),
    }
}

fn parse_nameservers(line: usize, key: &str, value: &str) -> Result<Vec<IpAddr>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map_err(|_| ConfigError::invalid(line, key, s, "comma separated IP addresses"))
        })
        .collect()
}
