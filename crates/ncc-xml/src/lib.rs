#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # ncc-xml
//!
//! Namespace-qualified XML element tree used as the output of the config
//! compiler.
//!
//! This crate provides a small owned element model, an lxml-style
//! `TreeBuilder` driven by start/data/end calls, cursor and visitor helpers
//! for navigating the result, and a serializer that writes the tree with
//! `quick-xml` while keeping namespace declarations minimal.

/// Tree builder driven by start/data/end events.
pub mod builder;
/// Document wrapper and compile metadata.
pub mod document;
/// Element, qualified-name and attribute primitives.
pub mod node;
/// Cursor-based traversal helpers for navigating element trees.
pub mod traversal;
/// Serialization of element trees to XML text.
pub mod writer;

/// Event-driven element tree builder.
pub use builder::TreeBuilder;
/// Primary document type.
pub use document::{Document, DocumentMetadata};
/// Element primitives.
pub use node::{Attribute, NamespaceBinding, QName, XmlElement};
/// Traversal entry points for iterative tree navigation.
pub use traversal::{Cursor, Traversal, walk};
/// Serializer options and entry points.
pub use writer::{WriteOptions, to_string, to_string_with};

use thiserror::Error;

/// The NETCONF base namespace used for the payload root and the
/// `operation` attribute.
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Prefix bound to [`NETCONF_BASE_NS`] in emitted documents.
pub const NETCONF_PREFIX: &str = "nc";

/// Errors that can occur when building or writing element trees
#[derive(Error, Debug)]
pub enum Error {
    #[error("Element not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Unbalanced end tag: expected '{expected}', found '{found}'")]
    UnbalancedEnd { expected: String, found: String },

    #[error("End tag '{0}' without an open element")]
    NoOpenElement(String),

    #[error("Elements still open at close: {0}")]
    UnclosedElements(String),

    #[error("Tree builder closed without a root element")]
    NoRoot,

    #[error("Second root element '{0}' after the document root was closed")]
    MultipleRoots(String),

    #[error("Write error: {0}")]
    Write(String),
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for XML operations.
pub type Result<T> = std::result::Result<T, Error>;
