pub mod types;
pub mod config;
pub mod fetcher;
pub mod stats;
pub mod registry;
pub mod filters;
pub mod outputs;
pub mod filter_chain;
pub mod output_manager;
pub mod plugin;
pub mod pipeline;
pub mod source;

pub use types::*;
pub use config::PipelineConfig;
pub use fetcher::Fetcher;
pub use registry::PluginRegistry;
pub use filter_chain::FilterChain;
pub use output_manager::{DispatchFailure, DispatchReport, OutputManager};
pub use pipeline::{Pipeline, ProcessStats};
pub use source::parse_articles;
