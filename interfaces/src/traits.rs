use crate::defs::{Article, FilterDef, OutputDef, Spec};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A pipeline stage that inspects or mutates an article.
#[async_trait]
pub trait Filter: Send + Sync {
    /// Current definition of this instance, including runtime counters.
    fn def(&self) -> FilterDef;

    /// Apply the filter effect to the article.
    async fn apply(&self, article: &mut Article) -> Result<()>;
}

/// A sink delivering articles outside of the process.
#[async_trait]
pub trait OutputProvider: Send + Sync {
    fn def(&self) -> OutputDef;

    async fn send(&self, article: &Article) -> Result<()>;
}

/// Factory for filters that are not part of the built-in catalog.
///
/// The definition handed to `build` carries the assigned id, enabled flag,
/// tags and props of the instance to construct.
pub trait FilterPlugin: Send + Sync {
    fn spec(&self) -> Spec;

    fn build(&self, def: &FilterDef) -> Result<Arc<dyn Filter>>;
}

/// Factory for output providers that are not part of the built-in catalog.
pub trait OutputPlugin: Send + Sync {
    fn spec(&self) -> Spec;

    fn build(&self, def: &OutputDef) -> Result<Arc<dyn OutputProvider>>;
}

impl fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let def = self.def();
        f.debug_struct("Filter").field("id", &def.id).field("name", &def.name).finish()
    }
}

impl fmt::Debug for dyn OutputProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let def = self.def();
        f.debug_struct("OutputProvider").field("id", &def.id).field("name", &def.name).finish()
    }
}
