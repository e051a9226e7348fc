use crate::fetcher::Fetcher;
use crate::stats::StageStats;
use crate::types::{Article, OutputDef, OutputProvider, PropKind, PropSpec, Spec};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub fn spec() -> Spec {
    Spec {
        name: "http".to_string(),
        desc: "New articles are sent as JSON document to an HTTP endpoint (POST).".to_string(),
        props: vec![
            PropSpec::new("url", "Target URL", PropKind::Url),
            PropSpec::new(
                "contentType",
                "Content type of the request (default: application/json)",
                PropKind::String,
            ),
        ],
    }
}

/// Webhook sink posting each article as JSON.
pub struct HttpOutput {
    def: OutputDef,
    target: Url,
    content_type: String,
    fetcher: Arc<Fetcher>,
    stats: StageStats,
}

impl HttpOutput {
    pub fn new(def: &OutputDef, fetcher: Arc<Fetcher>) -> Result<Self> {
        let raw = def.prop_str("url").ok_or_else(|| anyhow!("missing url property"))?;
        let target = Url::parse(raw).map_err(|e| anyhow!("invalid url {}: {}", raw, e))?;
        if !matches!(target.scheme(), "http" | "https") {
            bail!("unsupported url scheme: {}", target.scheme());
        }
        let content_type = def.prop_str("contentType").unwrap_or("application/json").to_string();

        let mut def = def.clone();
        def.desc = spec().desc;
        Ok(Self {
            def,
            target,
            content_type,
            fetcher,
            stats: StageStats::new(),
        })
    }

    async fn post(&self, article: &Article) -> Result<()> {
        let body = serde_json::to_vec(article)?;
        let status = self.fetcher.post(self.target.as_str(), &self.content_type, body).await?;
        debug!("Article {} posted to {} ({})", article.id, self.target, status);
        Ok(())
    }
}

#[async_trait]
impl OutputProvider for HttpOutput {
    fn def(&self) -> OutputDef {
        self.stats.decorate(&self.def)
    }

    async fn send(&self, article: &Article) -> Result<()> {
        let result = self.post(article).await;
        self.stats.record(&result);
        result
    }
}
