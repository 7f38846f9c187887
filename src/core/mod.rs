pub mod client;
pub mod runner;

pub use crate::domain::model::{RequestDescriptor, RunSummary};
pub use crate::domain::ports::{ConfigProvider, OutputSink};
pub use crate::utils::error::Result;
