use crate::fetcher::Fetcher;
use crate::filters;
use crate::registry::PluginRegistry;
use crate::types::{
    Article, Filter, FilterDef, PipelineError, Result, Spec, StageKind, StageRequest,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// One live filter with the scoping data it was built from.
struct ChainEntry {
    id: u32,
    name: String,
    enabled: bool,
    tags: Vec<String>,
    filter: Arc<dyn Filter>,
}

impl ChainEntry {
    fn new(def: &FilterDef, filter: Arc<dyn Filter>) -> Self {
        Self {
            id: def.id,
            name: def.name.clone(),
            enabled: def.enabled,
            tags: def.tags.clone(),
            filter,
        }
    }
}

/// Ordered, mutable collection of active filters.
///
/// Every access goes through one reader/writer lock: mutations hold it
/// exclusively from id assignment to insertion, and `apply` holds it shared
/// for the whole pass, so a pass always sees one consistent chain. A filter
/// that never returns therefore also blocks reconfiguration.
pub struct FilterChain {
    filters: RwLock<Vec<ChainEntry>>,
    registry: Arc<PluginRegistry>,
    fetcher: Arc<Fetcher>,
}

impl FilterChain {
    pub fn new(registry: Arc<PluginRegistry>, fetcher: Arc<Fetcher>) -> Self {
        Self {
            filters: RwLock::new(Vec::new()),
            registry,
            fetcher,
        }
    }

    /// Built-in filter specs followed by the registered filter plugins.
    pub async fn available_filters(&self) -> Vec<Spec> {
        filters::available_filters(&self.registry).await
    }

    /// Create a filter and append it to the end of the chain.
    pub async fn add(&self, request: StageRequest) -> Result<Arc<dyn Filter>> {
        let mut filters = self.filters.write().await;

        debug!("Creating filter: {}", request.name);
        let next_id = filters.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        let def = request.into_def(next_id);
        let filter = self.build(&def).await?;

        filters.push(ChainEntry::new(&def, filter.clone()));
        info!("Filter created: {} (ID: {})", def.name, def.id);
        Ok(filter)
    }

    /// Rebuild the filter `id` from the request, keeping its name and position.
    pub async fn update(&self, id: u32, request: StageRequest) -> Result<Arc<dyn Filter>> {
        let mut filters = self.filters.write().await;

        let position = filters
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(PipelineError::NotFound {
                kind: StageKind::Filter,
                id,
            })?;

        debug!("Updating filter: {}", id);
        let mut def = request.into_def(id);
        def.name = filters[position].name.clone();
        let filter = self.build(&def).await?;

        filters[position] = ChainEntry::new(&def, filter.clone());
        info!("Filter updated: {} (ID: {})", def.name, id);
        Ok(filter)
    }

    pub async fn remove(&self, id: u32) -> Result<()> {
        let mut filters = self.filters.write().await;

        let position = filters
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(PipelineError::NotFound {
                kind: StageKind::Filter,
                id,
            })?;

        let entry = filters.remove(position);
        info!("Filter removed: {} (ID: {})", entry.name, id);
        Ok(())
    }

    pub async fn get(&self, id: u32) -> Result<Arc<dyn Filter>> {
        let filters = self.filters.read().await;
        filters
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.filter.clone())
            .ok_or(PipelineError::NotFound {
                kind: StageKind::Filter,
                id,
            })
    }

    /// Definitions of every filter, in chain order.
    pub async fn list_defs(&self) -> Vec<FilterDef> {
        let filters = self.filters.read().await;
        filters.iter().map(|entry| entry.filter.def()).collect()
    }

    pub async fn len(&self) -> usize {
        self.filters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.filters.read().await.is_empty()
    }

    /// Run the article through every enabled filter whose tags match it, in
    /// chain order.
    ///
    /// The first failing filter aborts the pass. Filters applied before it are
    /// not rolled back, so the article keeps their changes.
    pub async fn apply(&self, article: &mut Article) -> Result<()> {
        let filters = self.filters.read().await;

        for (position, entry) in filters.iter().enumerate() {
            if !entry.enabled || !article.matches(&entry.tags) {
                continue;
            }
            entry
                .filter
                .apply(article)
                .await
                .map_err(|source| PipelineError::FilterFailed {
                    position,
                    id: entry.id,
                    name: entry.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    async fn build(&self, def: &FilterDef) -> Result<Arc<dyn Filter>> {
        let built = match filters::build_builtin(def, &self.fetcher) {
            Some(built) => built,
            None => {
                let plugin = self
                    .registry
                    .lookup_filter_plugin(&def.name)
                    .await
                    .ok_or_else(|| PipelineError::Unsupported {
                        kind: StageKind::Filter,
                        name: def.name.clone(),
                    })?;
                plugin.build(def)
            }
        };

        built.map_err(|source| PipelineError::Construction {
            kind: StageKind::Filter,
            name: def.name.clone(),
            source,
        })
    }
}
