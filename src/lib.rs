pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::StdoutSink, toml_config::TomlConfig, ClientSettings};
pub use core::{client::ApiClient, runner::ProbeRunner};
pub use domain::endpoint::Endpoint;
pub use domain::script::{Script, Step};
pub use utils::error::{ProbeError, Result};
