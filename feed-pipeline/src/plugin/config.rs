//! Plugin manifest loaded from `~/.config/feed-pipeline/plugins.toml`.

use crate::types::{PropSpec, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One external stage executable.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    /// Stage name used in add requests.
    pub name: String,
    #[serde(default)]
    pub desc: String,
    /// Path to the plugin binary.
    pub binary: PathBuf,
    /// Properties the stage accepts, for discovery only.
    #[serde(default)]
    pub props: Vec<PropSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub filters: Vec<PluginConfig>,
    #[serde(default)]
    pub outputs: Vec<PluginConfig>,
}

/// Load a plugin manifest.
///
/// A missing file yields an empty manifest since plugins are optional.
pub fn load_manifest(path: &Path) -> Result<PluginManifest> {
    if !path.exists() {
        return Ok(PluginManifest::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

pub fn default_manifest_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feed-pipeline")
        .join("plugins.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PropKind;

    #[test]
    fn parse_empty_manifest() {
        let manifest: PluginManifest = toml::from_str("").unwrap();
        assert!(manifest.filters.is_empty());
        assert!(manifest.outputs.is_empty());
    }

    #[test]
    fn parse_filters_and_outputs() {
        let toml_str = r#"
[[filters]]
name = "sentiment"
desc = "Scores article sentiment"
binary = "/usr/local/bin/feed-filter-sentiment"
props = [{ name = "threshold", desc = "Minimum score", type = "number" }]

[[outputs]]
name = "archive"
binary = "/usr/local/bin/feed-output-archive"
"#;
        let manifest: PluginManifest = toml::from_str(toml_str).unwrap();
        assert_eq!(manifest.filters.len(), 1);
        assert_eq!(manifest.filters[0].props[0].kind, PropKind::Number);
        assert_eq!(manifest.outputs[0].name, "archive");
        assert!(manifest.outputs[0].desc.is_empty());
    }

    #[test]
    fn missing_file_is_empty() {
        let manifest = load_manifest(Path::new("/nonexistent/plugins.toml")).unwrap();
        assert!(manifest.filters.is_empty());
    }
}
