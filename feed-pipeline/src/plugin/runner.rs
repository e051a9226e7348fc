//! Plugin factories and stages backed by external binaries.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;

use super::config::PluginConfig;
use crate::stats::StageStats;
use crate::types::{
    Article, Filter, FilterDef, FilterPlugin, OutputDef, OutputPlugin, OutputProvider, Spec,
    StageDef,
};

/// Environment variable carrying the JSON stage definition.
pub const DEF_ENV_VAR: &str = "FEED_PIPELINE_DEF";

fn plugin_spec(config: &PluginConfig) -> Spec {
    Spec {
        name: config.name.clone(),
        desc: config.desc.clone(),
        props: config.props.clone(),
    }
}

fn instance_def(config: &PluginConfig, def: &StageDef) -> Result<StageDef> {
    if !config.binary.exists() {
        bail!(
            "plugin '{}' binary not found at {}",
            config.name,
            config.binary.display()
        );
    }
    let mut def = def.clone();
    def.desc = config.desc.clone();
    Ok(def)
}

/// Run the binary with the article on stdin and return its stdout.
async fn run_binary(binary: &Path, def: &StageDef, article: &Article) -> Result<Vec<u8>> {
    let input = serde_json::to_vec(article)?;
    let def_json = serde_json::to_string(def)?;
    let binary = binary.to_path_buf();
    let plugin_name = def.name.clone();
    let plugin_name_outer = plugin_name.clone();

    // Process I/O is blocking, keep it off the async workers.
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let mut child = Command::new(&binary)
            .env(DEF_ENV_VAR, def_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn plugin '{plugin_name}'"))?;

        // Both pipes are bounded: stdin must be written while stdout drains.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || match stdin.write_all(&input) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            })
        });

        let result = child
            .wait_with_output()
            .with_context(|| format!("plugin '{plugin_name}' failed"))?;

        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| anyhow!("plugin '{plugin_name}' stdin writer panicked"))?
                .with_context(|| format!("failed to write to plugin '{plugin_name}' stdin"))?;
        }

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!(
                "plugin '{plugin_name}' exited with {}: {}",
                result.status,
                stderr.trim()
            );
        }
        Ok(result.stdout)
    })
    .await
    .with_context(|| format!("plugin '{plugin_name_outer}' task panicked"))?
}

/// Longest prefix of `s` with at most `max` characters.
fn truncate_chars(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(end, _)| &s[..end])
}

/// Filter factory for an external binary.
pub struct ExecFilterPlugin {
    config: PluginConfig,
}

impl ExecFilterPlugin {
    pub fn new(config: PluginConfig) -> Self {
        Self { config }
    }
}

impl FilterPlugin for ExecFilterPlugin {
    fn spec(&self) -> Spec {
        plugin_spec(&self.config)
    }

    fn build(&self, def: &FilterDef) -> Result<Arc<dyn Filter>> {
        Ok(Arc::new(ExecFilter {
            def: instance_def(&self.config, def)?,
            binary: self.config.binary.clone(),
            stats: StageStats::new(),
        }))
    }
}

/// Filter replacing the article with what the binary prints.
pub struct ExecFilter {
    def: FilterDef,
    binary: PathBuf,
    stats: StageStats,
}

impl ExecFilter {
    async fn run(&self, article: &mut Article) -> Result<()> {
        let stdout = run_binary(&self.binary, &self.def, article).await?;
        let stdout = String::from_utf8(stdout)
            .with_context(|| format!("plugin '{}' output is not valid UTF-8", self.def.name))?;
        *article = serde_json::from_str(&stdout).with_context(|| {
            format!(
                "plugin '{}' returned invalid JSON: {}",
                self.def.name,
                truncate_chars(&stdout, 200)
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl Filter for ExecFilter {
    fn def(&self) -> FilterDef {
        self.stats.decorate(&self.def)
    }

    async fn apply(&self, article: &mut Article) -> Result<()> {
        let result = self.run(article).await;
        self.stats.record(&result);
        result
    }
}

/// Output factory for an external binary.
pub struct ExecOutputPlugin {
    config: PluginConfig,
}

impl ExecOutputPlugin {
    pub fn new(config: PluginConfig) -> Self {
        Self { config }
    }
}

impl OutputPlugin for ExecOutputPlugin {
    fn spec(&self) -> Spec {
        plugin_spec(&self.config)
    }

    fn build(&self, def: &OutputDef) -> Result<Arc<dyn OutputProvider>> {
        Ok(Arc::new(ExecOutput {
            def: instance_def(&self.config, def)?,
            binary: self.config.binary.clone(),
            stats: StageStats::new(),
        }))
    }
}

pub struct ExecOutput {
    def: OutputDef,
    binary: PathBuf,
    stats: StageStats,
}

#[async_trait]
impl OutputProvider for ExecOutput {
    fn def(&self) -> OutputDef {
        self.stats.decorate(&self.def)
    }

    async fn send(&self, article: &Article) -> Result<()> {
        let result = run_binary(&self.binary, &self.def, article).await.map(|_| ());
        self.stats.record(&result);
        result
    }
}
