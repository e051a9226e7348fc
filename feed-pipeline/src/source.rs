use crate::types::{Article, PipelineError, Result};
use feed_rs::parser;
use std::collections::HashSet;
use tracing::{debug, info};

/// Parse an RSS or Atom document into articles, skipping duplicate entries.
///
/// Entries without a link are dropped. Feed categories become article tags.
pub fn parse_articles(content: &str) -> Result<Vec<Article>> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| PipelineError::Parse(format!("Failed to parse feed: {}", e)))?;

    let mut seen = HashSet::new();
    let mut articles = Vec::new();
    for entry in feed.entries {
        let key = if entry.id.is_empty() {
            entry.links.first().map(|link| link.href.clone())
        } else {
            Some(entry.id.clone())
        };
        if let Some(key) = key {
            if !seen.insert(key.clone()) {
                debug!("Skipping duplicate entry: {}", key);
                continue;
            }
        }
        if let Some(article) = to_article(entry) {
            articles.push(article);
        }
    }

    info!("Parsed feed with {} articles", articles.len());
    Ok(articles)
}

fn to_article(entry: feed_rs::model::Entry) -> Option<Article> {
    let link = entry.links.first()?.href.clone();
    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled".to_string());

    let mut article = Article::new(title, link)
        .with_tags(entry.categories.into_iter().map(|c| c.term));
    article.text = entry.summary.map(|s| s.content).unwrap_or_default();
    article.content = entry
        .content
        .and_then(|c| c.body)
        .unwrap_or_default();
    article.guid = (!entry.id.is_empty()).then_some(entry.id);
    article.published = entry.published;
    article.updated = entry.updated;
    Some(article)
}
