use std::time::Duration;

use clap::Parser;
use strum_macros::{Display, EnumString};

use crate::{Error, Result};

pub const DEFAULT_ATTEMPTS: u32 = 6;
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(6);

/// How log lines are rendered on stderr
#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
    Pretty,
}

/// Forward every connection accepted on one address to a fixed target
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// incoming connection -> host:port
    #[arg(short, long)]
    pub inbound: String,

    /// output connection forwarded to -> host:port
    #[arg(short, long)]
    pub outbound: String,

    /// maximum dial attempts per incoming connection
    #[arg(short, long, default_value_t = DEFAULT_ATTEMPTS)]
    pub retries: u32,

    /// timeout of a single dial attempt, in seconds
    #[arg(short = 't', long, default_value_t = DEFAULT_DIAL_TIMEOUT.as_secs())]
    pub dial_timeout: u64,

    /// full, compact or pretty
    #[arg(long, default_value_t = LogFormat::Full)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            timeout: DEFAULT_DIAL_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub inbound: String,
    pub outbound: String,
    pub policy: RetryPolicy,
    pub log_format: LogFormat,
}

impl Config {
    pub fn new(inbound: impl Into<String>, outbound: impl Into<String>) -> Self {
        Self {
            inbound: inbound.into(),
            outbound: outbound.into(),
            policy: RetryPolicy::default(),
            log_format: LogFormat::Full,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.inbound.trim().is_empty() {
            return Err(Error::Config("missing inbound address (-i)".into()));
        }
        if args.outbound.trim().is_empty() {
            return Err(Error::Config("missing outbound address (-o)".into()));
        }
        if args.retries == 0 {
            return Err(Error::Config("retries must be at least 1".into()));
        }
        if args.dial_timeout == 0 {
            return Err(Error::Config("dial timeout must be at least 1 second".into()));
        }

        Ok(Self {
            inbound: args.inbound,
            outbound: args.outbound,
            policy: RetryPolicy {
                attempts: args.retries,
                timeout: Duration::from_secs(args.dial_timeout),
            },
            log_format: args.log_format,
        })
    }
}
