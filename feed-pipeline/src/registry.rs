use crate::filters;
use crate::outputs;
use crate::types::{FilterPlugin, OutputPlugin, PipelineError, Result, StageKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Name to factory table extending the built-in stage catalog.
///
/// Populated by plugin discovery before traffic starts and read by every
/// filter chain and output manager it is handed to.
#[derive(Default)]
pub struct PluginRegistry {
    filters: RwLock<BTreeMap<String, Arc<dyn FilterPlugin>>>,
    outputs: RwLock<BTreeMap<String, Arc<dyn OutputPlugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter plugin under the name of its spec.
    ///
    /// Names already registered or taken by a built-in filter are rejected,
    /// since a shadowed plugin could never be reached.
    pub async fn register_filter_plugin(&self, plugin: Arc<dyn FilterPlugin>) -> Result<()> {
        let name = plugin.spec().name;
        let mut filters = self.filters.write().await;
        if filters::is_builtin(&name) || filters.contains_key(&name) {
            return Err(PipelineError::DuplicatePlugin {
                kind: StageKind::Filter,
                name,
            });
        }
        info!("Registered filter plugin: {}", name);
        filters.insert(name, plugin);
        Ok(())
    }

    pub async fn register_output_plugin(&self, plugin: Arc<dyn OutputPlugin>) -> Result<()> {
        let name = plugin.spec().name;
        let mut outputs = self.outputs.write().await;
        if outputs::is_builtin(&name) || outputs.contains_key(&name) {
            return Err(PipelineError::DuplicatePlugin {
                kind: StageKind::Output,
                name,
            });
        }
        info!("Registered output plugin: {}", name);
        outputs.insert(name, plugin);
        Ok(())
    }

    pub async fn lookup_filter_plugin(&self, name: &str) -> Option<Arc<dyn FilterPlugin>> {
        self.filters.read().await.get(name).cloned()
    }

    pub async fn lookup_output_plugin(&self, name: &str) -> Option<Arc<dyn OutputPlugin>> {
        self.outputs.read().await.get(name).cloned()
    }

    /// Visit every filter plugin in name order. The first visitor error stops
    /// the walk and is returned.
    pub async fn for_each_filter_plugin<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&dyn FilterPlugin) -> Result<()>,
    {
        let filters = self.filters.read().await;
        for plugin in filters.values() {
            visitor(plugin.as_ref())?;
        }
        Ok(())
    }

    pub async fn for_each_output_plugin<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&dyn OutputPlugin) -> Result<()>,
    {
        let outputs = self.outputs.read().await;
        for plugin in outputs.values() {
            visitor(plugin.as_ref())?;
        }
        Ok(())
    }

    pub async fn filter_plugin_count(&self) -> usize {
        self.filters.read().await.len()
    }

    pub async fn output_plugin_count(&self) -> usize {
        self.outputs.read().await.len()
    }
}
