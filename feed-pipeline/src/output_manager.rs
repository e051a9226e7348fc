use crate::fetcher::Fetcher;
use crate::outputs;
use crate::registry::PluginRegistry;
use crate::types::{
    Article, OutputDef, OutputProvider, PipelineError, Result, Spec, StageKind, StageRequest,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

struct ProviderEntry {
    id: u32,
    name: String,
    enabled: bool,
    tags: Vec<String>,
    provider: Arc<dyn OutputProvider>,
}

impl ProviderEntry {
    fn new(def: &OutputDef, provider: Arc<dyn OutputProvider>) -> Self {
        Self {
            id: def.id,
            name: def.name.clone(),
            enabled: def.enabled,
            tags: def.tags.clone(),
            provider,
        }
    }
}

/// A provider that failed to deliver an article.
#[derive(Debug)]
pub struct DispatchFailure {
    pub id: u32,
    pub name: String,
    pub error: anyhow::Error,
}

/// Outcome of fanning one article out to the outputs.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Ids of the providers that accepted the article, in dispatch order.
    pub delivered: Vec<u32>,
    /// Providers skipped because they are disabled or their tags do not match.
    pub skipped: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<u32>> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(PipelineError::DispatchFailed {
                failed: self.failures.len(),
                total: self.attempted(),
            })
        }
    }
}

/// Mutable collection of active output providers.
///
/// Locking mirrors [`crate::FilterChain`]: exclusive for mutations, shared and
/// held for the whole fan-out during `dispatch`.
pub struct OutputManager {
    providers: RwLock<Vec<ProviderEntry>>,
    registry: Arc<PluginRegistry>,
    fetcher: Arc<Fetcher>,
}

impl OutputManager {
    pub fn new(registry: Arc<PluginRegistry>, fetcher: Arc<Fetcher>) -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
            registry,
            fetcher,
        }
    }

    pub async fn available_outputs(&self) -> Vec<Spec> {
        outputs::available_outputs(&self.registry).await
    }

    pub async fn add(&self, request: StageRequest) -> Result<Arc<dyn OutputProvider>> {
        let mut providers = self.providers.write().await;

        debug!("Adding output: {}", request.name);
        let next_id = providers.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        let def = request.into_def(next_id);
        let provider = self.build(&def).await?;

        providers.push(ProviderEntry::new(&def, provider.clone()));
        info!("Output added: {} (ID: {})", def.name, def.id);
        Ok(provider)
    }

    pub async fn update(&self, id: u32, request: StageRequest) -> Result<Arc<dyn OutputProvider>> {
        let mut providers = self.providers.write().await;

        let position = providers
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(PipelineError::NotFound {
                kind: StageKind::Output,
                id,
            })?;

        debug!("Updating output: {}", id);
        let mut def = request.into_def(id);
        def.name = providers[position].name.clone();
        let provider = self.build(&def).await?;

        providers[position] = ProviderEntry::new(&def, provider.clone());
        info!("Output updated: {} (ID: {})", def.name, id);
        Ok(provider)
    }

    pub async fn remove(&self, id: u32) -> Result<()> {
        let mut providers = self.providers.write().await;

        let position = providers
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(PipelineError::NotFound {
                kind: StageKind::Output,
                id,
            })?;

        let entry = providers.remove(position);
        info!("Output removed: {} (ID: {})", entry.name, id);
        Ok(())
    }

    pub async fn get(&self, id: u32) -> Result<Arc<dyn OutputProvider>> {
        let providers = self.providers.read().await;
        providers
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.provider.clone())
            .ok_or(PipelineError::NotFound {
                kind: StageKind::Output,
                id,
            })
    }

    pub async fn list_defs(&self) -> Vec<OutputDef> {
        let providers = self.providers.read().await;
        providers.iter().map(|entry| entry.provider.def()).collect()
    }

    pub async fn len(&self) -> usize {
        self.providers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.providers.read().await.is_empty()
    }

    /// Send the article to every enabled provider whose tags match it.
    ///
    /// Providers are independent sinks: a failure is recorded in the report
    /// and dispatch carries on with the next provider.
    pub async fn dispatch(&self, article: &Article) -> DispatchReport {
        let providers = self.providers.read().await;
        let mut report = DispatchReport::default();

        for entry in providers.iter() {
            if !entry.enabled || !article.matches(&entry.tags) {
                report.skipped += 1;
                continue;
            }
            match entry.provider.send(article).await {
                Ok(()) => report.delivered.push(entry.id),
                Err(error) => {
                    warn!(
                        "Output {} (ID: {}) failed for article {}: {}",
                        entry.name, entry.id, article.id, error
                    );
                    report.failures.push(DispatchFailure {
                        id: entry.id,
                        name: entry.name.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    async fn build(&self, def: &OutputDef) -> Result<Arc<dyn OutputProvider>> {
        let built = match outputs::build_builtin(def, &self.fetcher) {
            Some(built) => built,
            None => {
                let plugin = self
                    .registry
                    .lookup_output_plugin(&def.name)
                    .await
                    .ok_or_else(|| PipelineError::Unsupported {
                        kind: StageKind::Output,
                        name: def.name.clone(),
                    })?;
                plugin.build(def)
            }
        };

        built.map_err(|source| PipelineError::Construction {
            kind: StageKind::Output,
            name: def.name.clone(),
            source,
        })
    }
}
