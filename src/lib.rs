pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{CliConfig, LogFormat, ServerConfig};
pub use crate::core::{formula::get_volumes, server::Server};
pub use crate::domain::model::VolumeResult;
pub use crate::utils::error::{ApiError, Result};
