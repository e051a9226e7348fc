use crate::types::StageDef;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

pub const NB_SUCCESS: &str = "nbSuccess";
pub const NB_ERROR: &str = "nbError";

/// Success and error counters of one stage instance.
#[derive(Debug, Default)]
pub struct StageStats {
    success: AtomicU64,
    errors: AtomicU64,
}

impl StageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<T, E>(&self, result: &std::result::Result<T, E>) {
        let counter = if result.is_ok() { &self.success } else { &self.errors };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn success(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Copy of `def` with the counters appended to its props.
    pub fn decorate(&self, def: &StageDef) -> StageDef {
        let mut def = def.clone();
        def.props.insert(NB_SUCCESS.to_string(), Value::from(self.success()));
        def.props.insert(NB_ERROR.to_string(), Value::from(self.errors()));
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::StageRequest;

    #[test]
    fn counters_show_up_in_props() {
        let stats = StageStats::new();
        stats.record::<(), ()>(&Ok(()));
        stats.record::<(), ()>(&Ok(()));
        stats.record::<(), &str>(&Err("boom"));

        let def = stats.decorate(&StageRequest::new("title").with_prop("prefix", "x").into_def(1));
        assert_eq!(def.prop_u64(NB_SUCCESS), Some(2));
        assert_eq!(def.prop_u64(NB_ERROR), Some(1));
        assert_eq!(def.prop_str("prefix"), Some("x"));
    }
}
