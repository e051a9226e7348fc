use crate::fetcher::Fetcher;
use crate::stats::StageStats;
use crate::types::{Article, Filter, FilterDef, Spec};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Elements holding the main content of a page, most specific first.
const CONTENT_SELECTORS: [&str; 3] = ["article", "main", "body"];

pub fn spec() -> Spec {
    Spec {
        name: "fetch".to_string(),
        desc: "This filter will attempt to extract the content of the article from the source URL."
            .to_string(),
        props: Vec::new(),
    }
}

/// Replaces the article content with the main HTML of the linked page.
pub struct FetchFilter {
    def: FilterDef,
    fetcher: Arc<Fetcher>,
    stats: StageStats,
}

impl FetchFilter {
    pub fn new(def: &FilterDef, fetcher: Arc<Fetcher>) -> Self {
        let mut def = def.clone();
        def.desc = spec().desc;
        Self {
            def,
            fetcher,
            stats: StageStats::new(),
        }
    }

    async fn fetch(&self, article: &mut Article) -> Result<()> {
        if article.link.is_empty() {
            bail!("article {} has no link to fetch", article.id);
        }
        let page = self.fetcher.fetch_page(&article.link).await?;
        article.content = extract_main_content(&page)?;
        article.meta.insert("fetched_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        debug!("Fetched {} bytes of content for {}", article.content.len(), article.link);
        Ok(())
    }
}

#[async_trait]
impl Filter for FetchFilter {
    fn def(&self) -> FilterDef {
        self.stats.decorate(&self.def)
    }

    async fn apply(&self, article: &mut Article) -> Result<()> {
        let result = self.fetch(article).await;
        self.stats.record(&result);
        result
    }
}

pub fn extract_main_content(page: &str) -> Result<String> {
    let document = Html::parse_document(page);
    for raw in CONTENT_SELECTORS {
        let selector =
            Selector::parse(raw).map_err(|e| anyhow!("invalid selector {}: {:?}", raw, e))?;
        if let Some(element) = document.select(&selector).next() {
            return Ok(element.inner_html().trim().to_string());
        }
    }
    Ok(page.trim().to_string())
}
