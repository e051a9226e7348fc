#![allow(dead_code)]

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use feed_pipeline::{
    Article, FetchConfig, Fetcher, Filter, FilterChain, FilterDef, FilterPlugin, OutputDef,
    OutputManager, OutputPlugin, OutputProvider, PluginRegistry, Spec,
};
use std::sync::{Arc, Mutex};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_fetcher() -> Arc<Fetcher> {
    let config = FetchConfig {
        user_agent: "Feed-Pipeline-Test/1.0".to_string(),
        timeout_seconds: 5,
        max_retries: 0,
        retry_delay_seconds: 0,
        min_host_interval_ms: 0,
        max_redirects: 2,
    };
    Arc::new(Fetcher::new(config).expect("test fetcher"))
}

pub fn new_chain(registry: &Arc<PluginRegistry>) -> FilterChain {
    FilterChain::new(registry.clone(), test_fetcher())
}

pub fn new_manager(registry: &Arc<PluginRegistry>) -> OutputManager {
    OutputManager::new(registry.clone(), test_fetcher())
}

fn spec(name: &str) -> Spec {
    Spec {
        name: name.to_string(),
        desc: format!("{} test stage", name),
        props: Vec::new(),
    }
}

/// Filter plugin appending its `suffix` prop to the title.
pub struct SuffixPlugin;

struct SuffixFilter {
    def: FilterDef,
}

impl FilterPlugin for SuffixPlugin {
    fn spec(&self) -> Spec {
        spec("suffix")
    }

    fn build(&self, def: &FilterDef) -> anyhow::Result<Arc<dyn Filter>> {
        if def.prop_str("suffix").is_none() {
            bail!("missing suffix property");
        }
        Ok(Arc::new(SuffixFilter { def: def.clone() }))
    }
}

#[async_trait]
impl Filter for SuffixFilter {
    fn def(&self) -> FilterDef {
        self.def.clone()
    }

    async fn apply(&self, article: &mut Article) -> anyhow::Result<()> {
        let suffix = self.def.prop_str("suffix").unwrap_or_default();
        article.title.push_str(suffix);
        Ok(())
    }
}

/// Filter plugin whose instances always fail.
pub struct BrokenPlugin;

struct BrokenFilter {
    def: FilterDef,
}

impl FilterPlugin for BrokenPlugin {
    fn spec(&self) -> Spec {
        spec("broken")
    }

    fn build(&self, def: &FilterDef) -> anyhow::Result<Arc<dyn Filter>> {
        Ok(Arc::new(BrokenFilter { def: def.clone() }))
    }
}

#[async_trait]
impl Filter for BrokenFilter {
    fn def(&self) -> FilterDef {
        self.def.clone()
    }

    async fn apply(&self, _article: &mut Article) -> anyhow::Result<()> {
        Err(anyhow!("broken on purpose"))
    }
}

/// Shared log of `(output name, article title)` deliveries.
pub type DeliveryLog = Arc<Mutex<Vec<(String, String)>>>;

/// Output plugin recording deliveries; `fail` makes every send fail after
/// recording the attempt.
pub struct RecordingPlugin {
    pub name: &'static str,
    pub fail: bool,
    pub log: DeliveryLog,
}

struct RecordingOutput {
    def: OutputDef,
    fail: bool,
    log: DeliveryLog,
}

impl OutputPlugin for RecordingPlugin {
    fn spec(&self) -> Spec {
        spec(self.name)
    }

    fn build(&self, def: &OutputDef) -> anyhow::Result<Arc<dyn OutputProvider>> {
        Ok(Arc::new(RecordingOutput {
            def: def.clone(),
            fail: self.fail,
            log: self.log.clone(),
        }))
    }
}

#[async_trait]
impl OutputProvider for RecordingOutput {
    fn def(&self) -> OutputDef {
        self.def.clone()
    }

    async fn send(&self, article: &Article) -> anyhow::Result<()> {
        self.log
            .lock()
            .map_err(|_| anyhow!("poisoned log"))?
            .push((self.def.name.clone(), article.title.clone()));
        if self.fail {
            bail!("{} is down", self.def.name);
        }
        Ok(())
    }
}

pub fn deliveries(log: &DeliveryLog) -> Vec<(String, String)> {
    log.lock().unwrap().clone()
}
