use crate::stats::StageStats;
use crate::types::{Article, Filter, FilterDef, PropKind, PropSpec, Spec};
use anyhow::Result;
use async_trait::async_trait;

pub fn spec() -> Spec {
    Spec {
        name: "title".to_string(),
        desc: "This filter will prefix the title of the article with a given value.".to_string(),
        props: vec![PropSpec::new(
            "prefix",
            "Prefix to add to the article title",
            PropKind::String,
        )],
    }
}

/// Prepends a fixed prefix to the article title.
pub struct TitleFilter {
    def: FilterDef,
    prefix: String,
    stats: StageStats,
}

impl TitleFilter {
    pub fn new(def: &FilterDef) -> Self {
        let mut def = def.clone();
        def.desc = spec().desc;
        let prefix = def.prop_str("prefix").unwrap_or("feedpipeline:").to_string();
        Self {
            def,
            prefix,
            stats: StageStats::new(),
        }
    }
}

#[async_trait]
impl Filter for TitleFilter {
    fn def(&self) -> FilterDef {
        self.stats.decorate(&self.def)
    }

    async fn apply(&self, article: &mut Article) -> Result<()> {
        article.title = format!("{}{}", self.prefix, article.title);
        self.stats.record::<(), ()>(&Ok(()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::NB_SUCCESS;
    use interfaces::StageRequest;

    #[tokio::test]
    async fn prefixes_the_title() {
        let def = StageRequest::new("title").with_prop("prefix", "[test] ").into_def(1);
        let filter = TitleFilter::new(&def);
        let mut article = Article::new("Hello", "https://example.com");

        filter.apply(&mut article).await.unwrap();

        assert_eq!(article.title, "[test] Hello");
        assert_eq!(filter.def().prop_u64(NB_SUCCESS), Some(1));
    }

    #[test]
    fn falls_back_to_default_prefix() {
        let filter = TitleFilter::new(&StageRequest::new("title").into_def(1));
        assert_eq!(filter.prefix, "feedpipeline:");
    }
}
