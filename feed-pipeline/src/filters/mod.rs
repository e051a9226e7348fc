pub mod fetch;
pub mod minify;
pub mod title;

pub use fetch::FetchFilter;
pub use minify::MinifyFilter;
pub use title::TitleFilter;

use crate::fetcher::Fetcher;
use crate::registry::PluginRegistry;
use crate::types::{Filter, FilterDef, Spec};
use std::sync::Arc;

const BUILTIN_NAMES: [&str; 3] = ["title", "fetch", "minify"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Construct a built-in filter, or `None` when the name is not built in.
pub fn build_builtin(
    def: &FilterDef,
    fetcher: &Arc<Fetcher>,
) -> Option<anyhow::Result<Arc<dyn Filter>>> {
    let filter: anyhow::Result<Arc<dyn Filter>> = match def.name.as_str() {
        "title" => Ok(Arc::new(TitleFilter::new(def))),
        "fetch" => Ok(Arc::new(FetchFilter::new(def, fetcher.clone()))),
        "minify" => MinifyFilter::new(def).map(|f| Arc::new(f) as Arc<dyn Filter>),
        _ => return None,
    };
    Some(filter)
}

pub fn builtin_specs() -> Vec<Spec> {
    vec![title::spec(), fetch::spec(), minify::spec()]
}

/// Built-in filter specs followed by every registered filter plugin.
pub async fn available_filters(registry: &PluginRegistry) -> Vec<Spec> {
    let mut result = builtin_specs();
    // The visitor never fails.
    let _ = registry
        .for_each_filter_plugin(|plugin| {
            result.push(plugin.spec());
            Ok(())
        })
        .await;
    result
}
