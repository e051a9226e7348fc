use crate::stats::StageStats;
use crate::types::{Article, OutputDef, OutputProvider, PropKind, PropSpec, Spec};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::io::Write;

pub fn spec() -> Spec {
    Spec {
        name: "stdout".to_string(),
        desc: "New articles are sent as JSON document to the standard output of the process."
            .to_string(),
        props: vec![PropSpec::new(
            "format",
            "Output format: json (default) or text",
            PropKind::String,
        )],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

/// Console sink writing one line per article.
pub struct StdOutput {
    def: OutputDef,
    format: Format,
    stats: StageStats,
}

impl StdOutput {
    pub fn new(def: &OutputDef) -> Result<Self> {
        let format = match def.prop_str("format").unwrap_or("json") {
            "json" => Format::Json,
            "text" => Format::Text,
            other => bail!("unknown format: {}", other),
        };
        let mut def = def.clone();
        def.desc = spec().desc;
        Ok(Self {
            def,
            format,
            stats: StageStats::new(),
        })
    }

    fn render(&self, article: &Article) -> Result<String> {
        Ok(match self.format {
            Format::Json => serde_json::to_string(article)?,
            Format::Text => format!("{} <{}>", article.title, article.link),
        })
    }
}

#[async_trait]
impl OutputProvider for StdOutput {
    fn def(&self) -> OutputDef {
        self.stats.decorate(&self.def)
    }

    async fn send(&self, article: &Article) -> Result<()> {
        let result = self.render(article).and_then(|line| {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", line)?;
            Ok(())
        });
        self.stats.record(&result);
        result
    }
}
