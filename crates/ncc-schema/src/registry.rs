//! Concurrent cache of built models

use crate::model::{ModelOptions, SchemaModel};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe registry of built models, keyed by file set and options
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: DashMap<String, Arc<SchemaModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a set of schema files and build options; file order
    /// does not matter.
    pub fn cache_key(files: &[String], options: &ModelOptions) -> String {
        let mut files = files.to_vec();
        files.sort();
        format!(
            "{}|{}|{}",
            options.root_element,
            options.namespace_filter.as_deref().unwrap_or_default(),
            files.join(";")
        )
    }

    pub fn get(&self, key: &str) -> Option<Arc<SchemaModel>> {
        self.models.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn register(&self, key: impl Into<String>, model: Arc<SchemaModel>) {
        self.models.insert(key.into(), model);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.models.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&self) {
        self.models.clear();
    }
}
