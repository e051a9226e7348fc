use crate::config::PipelineConfig;
use crate::fetcher::Fetcher;
use crate::filter_chain::FilterChain;
use crate::output_manager::{DispatchReport, OutputManager};
use crate::plugin;
use crate::registry::PluginRegistry;
use crate::types::{Article, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters for a batch of processed articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub processed: usize,
    /// Articles dropped because a filter failed.
    pub dropped: usize,
    /// Articles for which at least one output failed.
    pub partially_delivered: usize,
}

/// Wires a filter chain to an output manager: articles are filtered, then
/// fanned out.
pub struct Pipeline {
    registry: Arc<PluginRegistry>,
    filters: FilterChain,
    outputs: OutputManager,
}

impl Pipeline {
    pub fn new(registry: Arc<PluginRegistry>, fetcher: Arc<Fetcher>) -> Self {
        Self {
            filters: FilterChain::new(registry.clone(), fetcher.clone()),
            outputs: OutputManager::new(registry.clone(), fetcher),
            registry,
        }
    }

    /// Discover the configured plugins, then create the configured stages in
    /// file order.
    pub async fn from_config(config: &PipelineConfig) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);
        let registry = Arc::new(PluginRegistry::new());

        if let Some(path) = &config.plugins {
            let manifest = plugin::load_manifest(path)?;
            plugin::discover(&registry, &manifest).await?;
        }

        let pipeline = Self::new(registry, fetcher);
        for request in &config.filters {
            pipeline.filters.add(request.clone()).await?;
        }
        for request in &config.outputs {
            pipeline.outputs.add(request.clone()).await?;
        }

        info!(
            "Pipeline ready with {} filters and {} outputs",
            pipeline.filters.len().await,
            pipeline.outputs.len().await
        );
        Ok(pipeline)
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn outputs(&self) -> &OutputManager {
        &self.outputs
    }

    /// Filter one article and dispatch the result.
    ///
    /// A filter failure drops the article before any output sees it.
    pub async fn process(&self, mut article: Article) -> Result<(Article, DispatchReport)> {
        self.filters.apply(&mut article).await?;
        let report = self.outputs.dispatch(&article).await;
        debug!(
            "Article {} delivered to {} outputs ({} failed)",
            article.id,
            report.delivered.len(),
            report.failures.len()
        );
        Ok((article, report))
    }

    pub async fn process_all(&self, articles: Vec<Article>) -> ProcessStats {
        let mut stats = ProcessStats::default();
        for article in articles {
            let id = article.id.clone();
            stats.processed += 1;
            match self.process(article).await {
                Ok((_, report)) if !report.is_success() => stats.partially_delivered += 1,
                Ok(_) => {}
                Err(e) => {
                    warn!("Dropping article {}: {}", id, e);
                    stats.dropped += 1;
                }
            }
        }
        info!(
            "Processed {} articles ({} dropped, {} partially delivered)",
            stats.processed, stats.dropped, stats.partially_delivered
        );
        stats
    }
}
