pub mod http;
pub mod stdout;

pub use http::HttpOutput;
pub use stdout::StdOutput;

use crate::fetcher::Fetcher;
use crate::registry::PluginRegistry;
use crate::types::{OutputDef, OutputProvider, Spec};
use std::sync::Arc;

const BUILTIN_NAMES: [&str; 2] = ["stdout", "http"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Construct a built-in output provider, or `None` when the name is not built in.
pub fn build_builtin(
    def: &OutputDef,
    fetcher: &Arc<Fetcher>,
) -> Option<anyhow::Result<Arc<dyn OutputProvider>>> {
    let provider: anyhow::Result<Arc<dyn OutputProvider>> = match def.name.as_str() {
        "stdout" => StdOutput::new(def).map(|p| Arc::new(p) as Arc<dyn OutputProvider>),
        "http" => {
            HttpOutput::new(def, fetcher.clone()).map(|p| Arc::new(p) as Arc<dyn OutputProvider>)
        }
        _ => return None,
    };
    Some(provider)
}

pub fn builtin_specs() -> Vec<Spec> {
    vec![stdout::spec(), http::spec()]
}

/// Built-in output specs followed by every registered output plugin.
pub async fn available_outputs(registry: &PluginRegistry) -> Vec<Spec> {
    let mut result = builtin_specs();
    let _ = registry
        .for_each_output_plugin(|plugin| {
            result.push(plugin.spec());
            Ok(())
        })
        .await;
    result
}
