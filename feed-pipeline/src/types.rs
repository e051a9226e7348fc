use serde::{Deserialize, Serialize};
use std::fmt;

pub use interfaces::{
    Article, Filter, FilterDef, FilterPlugin, OutputDef, OutputPlugin, OutputProvider, PropKind,
    PropSpec, Props, Spec, StageDef, StageRequest,
};

/// Which collection a stage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Filter,
    Output,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Filter => write!(f, "filter"),
            StageKind::Output => write!(f, "output"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub min_host_interval_ms: u64,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Feed-Pipeline/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 1,
            min_host_interval_ms: 1000,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unsupported {kind}: {name}")]
    Unsupported { kind: StageKind, name: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: StageKind, id: u32 },

    #[error("unable to create {kind} {name}: {source}")]
    Construction {
        kind: StageKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("error while applying filter #{position} ({name}, id {id}): {source}")]
    FilterFailed {
        position: usize,
        id: u32,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{failed} of {total} outputs failed")]
    DispatchFailed { failed: usize, total: usize },

    #[error("{kind} plugin already registered: {name}")]
    DuplicatePlugin { kind: StageKind, name: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("General error: {0}")]
    General(String),
}

impl PipelineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::NotFound { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, PipelineError::Unsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
