use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mailposture::{DaneQueryName, MonitorConfig, MxOrder};

#[derive(Parser)]
#[command(name = "mailposture-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// key=value configuration file (default: monitor.conf when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// domain list (CSV: domain,_,agency)
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// JSON store file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// probe the primary exchange for STARTTLS/REQUIRETLS
    #[arg(long, global = true)]
    pub full_test: bool,

    /// capability probe command
    #[arg(long, global = true)]
    pub probe: Option<PathBuf>,

    /// probe timeout (seconds)
    #[arg(long, global = true)]
    pub probe_timeout: Option<u64>,

    /// domains started per --rate-interval (0 = unlimited)
    #[arg(long, global = true)]
    pub rate: Option<u32>,

    /// rate interval (seconds)
    #[arg(long, global = true)]
    pub rate_interval: Option<u64>,

    /// domains assessed in parallel
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// which exchange is probed: answer|preference
    #[arg(long, global = true, value_enum)]
    pub mx_order: Option<MxOrderArg>,

    /// TLSA owner name: bare|port
    #[arg(long, global = true, value_enum)]
    pub dane_name: Option<DaneNameArg>,

    /// request DNSSEC validation
    #[arg(long, global = true)]
    pub dnssec: bool,

    /// log filter when MAILPOSTURE_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// output: human|json
    #[arg(long, global = true, value_enum, default_value_t = Format::Human)]
    pub format: Format,
}

#[derive(Subcommand)]
pub enum Commands {
    /// assess every domain of the input list and persist the records (default)
    Run,
    /// assess one domain and print it, without persisting
    Assess {
        domain: String,
        /// agency label shown with the report
        #[arg(long, default_value = "")]
        agency: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MxOrderArg {
    Answer,
    Preference,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DaneNameArg {
    Bare,
    Port,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Flags win over the configuration file.
    pub fn apply_to(&self, config: &mut MonitorConfig) {
        if let Some(input) = &self.input {
            config.input.clone_from(input);
        }
        if let Some(store) = &self.store {
            config.store.clone_from(store);
        }
        if self.full_test {
            config.full_test = true;
        }
        if let Some(probe) = &self.probe {
            config.probe.clone_from(probe);
        }
        if let Some(secs) = self.probe_timeout.filter(|s| *s > 0) {
            config.probe_timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(rate) = self.rate {
            config.rate = rate;
        }
        if let Some(secs) = self.rate_interval.filter(|s| *s > 0) {
            config.rate_interval = std::time::Duration::from_secs(secs);
        }
        if let Some(n) = self.concurrency.filter(|n| *n > 0) {
            config.concurrency = n;
        }
        if let Some(order) = self.mx_order {
            config.mx_order = match order {
                MxOrderArg::Answer => MxOrder::Answer,
                MxOrderArg::Preference => MxOrder::Preference,
            };
        }
        if let Some(name) = self.dane_name {
            config.dane_name = match name {
                DaneNameArg::Bare => DaneQueryName::Bare,
                DaneNameArg::Port => DaneQueryName::Port25,
            };
        }
        if self.dnssec {
            config.dnssec = true;
        }
    }
}
