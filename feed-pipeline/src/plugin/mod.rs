//! Out-of-process stage plugins.
//!
//! Plugins are external executables declared in a TOML manifest, by default
//! `~/.config/feed-pipeline/plugins.toml`:
//!
//! ```toml
//! [[filters]]
//! name = "sentiment"
//! desc = "Scores article sentiment"
//! binary = "/usr/local/bin/feed-filter-sentiment"
//! props = [{ name = "threshold", desc = "Minimum score", type = "number" }]
//!
//! [[outputs]]
//! name = "archive"
//! binary = "/usr/local/bin/feed-output-archive"
//! ```
//!
//! # Protocol
//!
//! The binary receives the article as JSON on stdin and the stage definition
//! as JSON in the `FEED_PIPELINE_DEF` environment variable. A filter prints the
//! resulting article as JSON on stdout; an output only has to exit with
//! status 0.

pub mod config;
pub mod runner;

pub use config::{default_manifest_path, load_manifest, PluginConfig, PluginManifest};
pub use runner::{ExecFilterPlugin, ExecOutputPlugin, DEF_ENV_VAR};

use crate::registry::PluginRegistry;
use crate::types::Result;
use std::sync::Arc;
use tracing::info;

/// Register every plugin of the manifest. Returns how many were registered.
pub async fn discover(registry: &PluginRegistry, manifest: &PluginManifest) -> Result<usize> {
    let mut count = 0;
    for config in &manifest.filters {
        registry
            .register_filter_plugin(Arc::new(ExecFilterPlugin::new(config.clone())))
            .await?;
        count += 1;
    }
    for config in &manifest.outputs {
        registry
            .register_output_plugin(Arc::new(ExecOutputPlugin::new(config.clone())))
            .await?;
        count += 1;
    }
    info!("Discovered {} plugins", count);
    Ok(count)
}
