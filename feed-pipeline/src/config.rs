use crate::types::{FetchConfig, Result, StageRequest};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Startup configuration of a pipeline, read from TOML:
///
/// ```toml
/// plugins = "/etc/feed-pipeline/plugins.toml"
///
/// [fetch]
/// timeout_seconds = 10
///
/// [[filters]]
/// name = "title"
/// enabled = true
/// tags = "news,tech"
/// props = { prefix = "[news] " }
///
/// [[outputs]]
/// name = "stdout"
/// enabled = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Plugin manifest to discover before the stages are created.
    #[serde(default)]
    pub plugins: Option<PathBuf>,
    #[serde(default)]
    pub filters: Vec<StageRequest>,
    #[serde(default)]
    pub outputs: Vec<StageRequest>,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
