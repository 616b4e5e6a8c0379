//! # ncc-schema
//!
//! YIN schema loading and resolution for the config compiler.
//!
//! A set of YIN files (YANG modules serialized as XML) is parsed into a
//! node arena, `uses` statements are replaced by copies of their groupings,
//! `augment` subtrees are merged into the tree they extend, and the merged
//! tree is walked once into path tables:
//! namespace per path, container keys, leaf kinds, and identity prefixes.
//! The resulting [`SchemaModel`] is immutable and can be shared across
//! threads.

pub mod augment;
pub mod grouping;
pub mod identity;
pub mod loader;
pub mod model;
pub mod registry;
pub mod table;
pub mod yin;

pub use loader::SchemaLoader;
pub use model::{ModelEntry, ModelOptions, ModelStats, Namespace, SchemaModel, SchemaSource};
pub use registry::ModelRegistry;
pub use table::{LeafKind, PathEntry, PathTable};

use thiserror::Error;

/// Errors that can occur while loading or resolving schemas
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Could not find global namespace value in schema file '{file}'")]
    MissingNamespace { file: String },

    #[error("Could not find global namespace prefix in schema file '{file}'")]
    MissingPrefix { file: String },

    #[error("Could not find root container '{root}' in any schema file")]
    MissingRoot { root: String },

    #[error("Grouping '{name}' used in '{file}' is not defined")]
    UnresolvedGrouping { file: String, name: String },

    #[error("Grouping '{name}' is used recursively: {cycle}")]
    GroupingCycle { name: String, cycle: String },

    #[error("No namespace defined along path '{path}'")]
    NoNamespace { path: String },

    #[error("Malformed YIN in '{file}': {message}")]
    Xml { file: String, message: String },

    #[error("IO error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No schema files found in: {paths}")]
    NoSchemaFiles { paths: String },
}

impl SchemaError {
    /// Build a malformed-YIN error for a schema file
    pub fn xml(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Xml {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Build an I/O error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Strip a YANG module prefix (`authy:security-type` → `security-type`).
pub(crate) fn strip_prefix(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}
