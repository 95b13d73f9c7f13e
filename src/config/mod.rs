use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_duration, Validate};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Command line options. Only logging is adjustable; the API itself is fixed.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "phase-diagram-api")]
#[command(about = "Specific volume service for phase-change diagrams")]
pub struct CliConfig {
    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Connections with no request activity for this long are closed.
    pub idle_timeout: Duration,
    /// Deadline for receiving a complete request head.
    pub read_timeout: Duration,
    /// Deadline for producing the response once the head is read.
    pub write_timeout: Duration,
    /// How long in-flight requests may run once shutdown starts.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            idle_timeout: Duration::from_secs(120),
            read_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_duration("idle_timeout", self.idle_timeout)?;
        validate_positive_duration("read_timeout", self.read_timeout)?;
        validate_positive_duration("write_timeout", self.write_timeout)?;
        validate_positive_duration("shutdown_timeout", self.shutdown_timeout)?;
        Ok(())
    }
}
