//! Schema loader
//!
//! Discovers YIN files under a set of search paths, reads them, and builds
//! a [`SchemaModel`], caching the result in a [`ModelRegistry`].

use crate::model::{ModelOptions, SchemaModel, SchemaSource};
use crate::registry::ModelRegistry;
use crate::{Result, SchemaError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

const SCHEMA_EXTENSION: &str = "yin";

/// Loads schema models from the file system
pub struct SchemaLoader {
    registry: Arc<ModelRegistry>,
    schema_paths: Vec<PathBuf>,
    options: ModelOptions,
    recursive: bool,
}

impl SchemaLoader {
    /// Create a loader over the given search paths (directories or files)
    pub fn new(schema_paths: Vec<PathBuf>) -> Self {
        Self::with_registry(Arc::new(ModelRegistry::new()), schema_paths)
    }

    /// Create a loader sharing an existing registry
    pub fn with_registry(registry: Arc<ModelRegistry>, schema_paths: Vec<PathBuf>) -> Self {
        Self {
            registry,
            schema_paths,
            options: ModelOptions::default(),
            recursive: false,
        }
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Also descend into subdirectories of the search paths
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn add_path(&mut self, path: PathBuf) {
        self.schema_paths.push(path);
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// All schema files under the search paths, sorted and deduplicated.
    /// A search path naming a file is taken as is.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for root in &self.schema_paths {
            if root.is_file() {
                files.push(root.clone());
                continue;
            }
            for entry in WalkDir::new(root).max_depth(max_depth) {
                let entry =
                    entry.map_err(|e| SchemaError::io(root.display().to_string(), e.into()))?;
                let path = entry.path();
                if entry.file_type().is_file() && has_schema_extension(path) {
                    trace!(path = %path.display(), "found schema file");
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        debug!(count = files.len(), "discovered schema files");
        Ok(files)
    }

    /// Load the model for all discovered files
    pub fn load(&self) -> Result<Arc<SchemaModel>> {
        let files = self.discover()?;
        if files.is_empty() {
            return Err(SchemaError::NoSchemaFiles {
                paths: self
                    .schema_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        self.load_files(&files)
    }

    /// Load the model for an explicit file list. Checks the registry first.
    pub fn load_files(&self, files: &[PathBuf]) -> Result<Arc<SchemaModel>> {
        let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        let key = ModelRegistry::cache_key(&names, &self.options);

        if let Some(cached) = self.registry.get(&key) {
            debug!(files = names.len(), "cache hit for schema model");
            return Ok(cached);
        }
        trace!(files = names.len(), "cache miss for schema model");

        let mut sources = Vec::with_capacity(files.len());
        for (path, name) in files.iter().zip(names) {
            let content =
                std::fs::read_to_string(path).map_err(|e| SchemaError::io(name.clone(), e))?;
            sources.push(SchemaSource::new(name, content));
        }

        let model = Arc::new(SchemaModel::build(&sources, &self.options)?);
        info!(files = sources.len(), root = %model.root_element(), "loaded schema model");
        self.registry.register(key, Arc::clone(&model));
        Ok(model)
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

fn has_schema_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BASE: &str = r#"<module name="acme" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
  <namespace uri="http://example.com/acme"/>
  <prefix value="acme"/>
  <container name="config"><leaf name="hostname"/></container>
</module>"#;

    fn schema_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.yin"), BASE).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("other.yin"), "<broken").unwrap();
        dir
    }

    #[test]
    fn test_discover_is_not_recursive_by_default() {
        let dir = schema_dir();
        let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);
        let files = loader.discover().unwrap();
        assert_eq!(files, vec![dir.path().join("base.yin")]);

        let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]).recursive(true);
        assert_eq!(loader.discover().unwrap().len(), 2);
    }

    #[test]
    fn test_load_and_cache() {
        let dir = schema_dir();
        let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);

        let first = loader.load().unwrap();
        assert!(first.is_leaf(&["config", "hostname"]));
        assert_eq!(loader.registry().len(), 1);

        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_options_change_cache_key() {
        let dir = schema_dir();
        let registry = Arc::new(ModelRegistry::new());
        let plain = SchemaLoader::with_registry(Arc::clone(&registry), vec![dir.path().to_path_buf()]);
        let filtered = SchemaLoader::with_registry(Arc::clone(&registry), vec![dir.path().to_path_buf()])
            .with_options(ModelOptions::new().with_namespace_filter("acme"));

        plain.load().unwrap();
        filtered.load().unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_no_schema_files() {
        let dir = tempfile::tempdir().unwrap();
        let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);
        match loader.load().unwrap_err() {
            SchemaError::NoSchemaFiles { paths } => {
                assert!(paths.contains(&dir.path().display().to_string()));
            }
            e => panic!("Expected NoSchemaFiles, got {:?}", e),
        }
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let loader = SchemaLoader::new(vec![PathBuf::from("/definitely/not/here")]);
        assert!(matches!(loader.discover(), Err(SchemaError::Io { .. })));
    }

    #[test]
    fn test_broken_file_reports_name() {
        let dir = schema_dir();
        let loader = SchemaLoader::new(vec![dir.path().join("nested").join("other.yin")]);
        match loader.load().unwrap_err() {
            SchemaError::Xml { file, .. } => assert!(file.ends_with("other.yin")),
            e => panic!("Expected Xml, got {:?}", e),
        }
    }
}
