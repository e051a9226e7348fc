use crate::stats::StageStats;
use crate::types::{Article, Filter, FilterDef, Spec};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

pub fn spec() -> Spec {
    Spec {
        name: "minify".to_string(),
        desc: "This filter will minify the HTML content and text of the article.".to_string(),
        props: Vec::new(),
    }
}

/// Minifies the HTML held by `content` and `text`.
pub struct MinifyFilter {
    def: FilterDef,
    comments: Regex,
    between_tags: Regex,
    whitespace: Regex,
    stats: StageStats,
}

impl MinifyFilter {
    pub fn new(def: &FilterDef) -> Result<Self> {
        let mut def = def.clone();
        def.desc = spec().desc;
        Ok(Self {
            def,
            comments: Regex::new(r"(?s)<!--.*?-->")?,
            between_tags: Regex::new(r">\s+<")?,
            whitespace: Regex::new(r"\s+")?,
            stats: StageStats::new(),
        })
    }

    pub fn minify(&self, html: &str) -> String {
        let html = self.comments.replace_all(html, "");
        let html = self.between_tags.replace_all(&html, "><");
        let html = self.whitespace.replace_all(&html, " ");
        html.trim().to_string()
    }
}

#[async_trait]
impl Filter for MinifyFilter {
    fn def(&self) -> FilterDef {
        self.stats.decorate(&self.def)
    }

    async fn apply(&self, article: &mut Article) -> Result<()> {
        article.content = self.minify(&article.content);
        article.text = self.minify(&article.text);
        self.stats.record::<(), ()>(&Ok(()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::StageRequest;

    fn filter() -> MinifyFilter {
        MinifyFilter::new(&StageRequest::new("minify").into_def(1)).unwrap()
    }

    #[test]
    fn strips_comments_and_whitespace() {
        let html = "<div>\n  <!-- tracking\n pixel -->\n  <p>Hello   <b>world</b></p>\n</div>\n";
        assert_eq!(filter().minify(html), "<div><p>Hello <b>world</b></p></div>");
    }

    #[tokio::test]
    async fn minifies_content_and_text() {
        let mut article = Article::new("t", "l").with_content("<p>\n a </p>  <p>b</p>");
        article.text = "  plain   text ".to_string();

        filter().apply(&mut article).await.unwrap();

        assert_eq!(article.content, "<p> a </p><p>b</p>");
        assert_eq!(article.text, "plain text");
    }
}
