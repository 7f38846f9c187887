pub mod cli;
pub mod settings;
pub mod toml_config;

pub use settings::{ClientOverrides, ClientSettings};

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command, FetchArgs};

#[cfg(feature = "cli")]
mod args {
    use super::settings::{ClientOverrides, ClientSettings};
    use super::toml_config::TomlConfig;
    use crate::domain::endpoint::Endpoint;
    use crate::domain::model::QueryValue;
    use crate::domain::paging::PaginationMode;
    use crate::domain::script::{PaginateSpec, Step, StepOutput, LENDER_SEARCH};
    use clap::{Args, Parser, Subcommand};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "kiva-probe")]
    #[command(about = "Fetch and print JSON from the Kiva lending API")]
    pub struct CliConfig {
        /// API base URL
        #[arg(long, global = true)]
        pub base_url: Option<String>,

        /// Application id sent as the app_id query parameter
        #[arg(long, global = true)]
        pub app_id: Option<String>,

        #[arg(long, global = true)]
        pub timeout_secs: Option<u64>,

        /// Retries for connection failures and timeouts
        #[arg(long, global = true)]
        pub retry_attempts: Option<u32>,

        #[arg(long, global = true)]
        pub retry_delay_ms: Option<u64>,

        /// Refuse to follow more pages than this
        #[arg(long, global = true)]
        pub max_pages: Option<u64>,

        /// TOML file with a [client] table and [[scripts]]
        #[arg(short, long, global = true)]
        pub config: Option<String>,

        /// Print bodies on a single line
        #[arg(long, global = true)]
        pub compact: bool,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON")]
        pub log_json: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// List the known endpoints
        Endpoints,
        /// Fetch one endpoint and print the body
        Fetch(FetchArgs),
        /// Run a built-in or configured script
        Run {
            #[arg(long, default_value = LENDER_SEARCH)]
            script: String,
        },
    }

    #[derive(Debug, Clone, Args)]
    pub struct FetchArgs {
        #[arg(value_enum)]
        pub endpoint: Endpoint,

        /// Loan id for templated endpoints; repeat for several loans
        #[arg(long = "id")]
        pub ids: Vec<u64>,

        /// Search term (q)
        #[arg(short, long)]
        pub query: Option<String>,

        #[arg(long)]
        pub page: Option<u64>,

        #[arg(long)]
        pub per_page: Option<u64>,

        /// Do not send the endpoint's default parameters
        #[arg(long)]
        pub no_defaults: bool,

        /// Follow the paging metadata of the response
        #[arg(long, value_enum)]
        pub follow: Option<PaginationMode>,

        /// Stop after the first N pages (0 follows every page)
        #[arg(long = "pages", requires = "follow")]
        pub page_limit: Option<u64>,
    }

    impl FetchArgs {
        pub fn to_step(&self) -> Step {
            let mut params: BTreeMap<String, QueryValue> = BTreeMap::new();
            if !self.no_defaults {
                for (key, value) in self.endpoint.spec().default_params {
                    params.insert(key.to_string(), QueryValue::from(*value));
                }
            }
            if let Some(q) = &self.query {
                params.insert("q".to_string(), QueryValue::from(q.as_str()));
            }
            if let Some(page) = self.page {
                params.insert("page".to_string(), QueryValue::from(page));
            }
            if let Some(per_page) = self.per_page {
                params.insert("per_page".to_string(), QueryValue::from(per_page));
            }

            let mut step = Step::new(self.endpoint).with_params(params);
            step.ids = self.ids.clone();
            step.output = StepOutput::Print;
            step.paginate = self.follow.map(|mode| PaginateSpec {
                mode,
                output: StepOutput::Print,
                limit: self.page_limit,
            });
            step
        }
    }

    impl CliConfig {
        pub fn overrides(&self) -> ClientOverrides {
            ClientOverrides {
                base_url: self.base_url.clone(),
                app_id: self.app_id.clone(),
                timeout_seconds: self.timeout_secs,
                retry_attempts: self.retry_attempts,
                retry_delay_ms: self.retry_delay_ms,
                max_pages: self.max_pages,
            }
        }

        /// 預設值 ← TOML `[client]` ← 命令列
        pub fn resolve_settings(&self, file: Option<&TomlConfig>) -> ClientSettings {
            let mut settings = ClientSettings::default();
            if let Some(file) = file {
                settings.apply(&file.client);
            }
            settings.apply(&self.overrides());
            settings
        }
    }

}
