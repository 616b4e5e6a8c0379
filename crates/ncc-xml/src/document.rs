//! Compiled document and its metadata
#![allow(clippy::must_use_candidate)] // Builder/constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::Result;
use crate::node::XmlElement;
use crate::writer::{WriteOptions, to_string_with};
use serde::{Deserialize, Serialize};

/// A compiled payload: the root element plus what went into it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Root element (the synthesized NETCONF `config`/`filter` element)
    pub root: XmlElement,

    /// Document-level metadata
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source identifier (file path, `<stdin>`, ...)
    pub source: Option<String>,

    /// Number of input lines consumed
    pub lines: usize,

    /// Container/list elements opened from config lines
    pub containers: usize,

    /// Leaf elements written, key leaves included
    pub leaves: usize,
}

impl Document {
    /// Create a new document with the given root element
    pub fn new(root: XmlElement) -> Self {
        Self {
            root,
            metadata: DocumentMetadata::default(),
        }
    }

    /// Create a new document with metadata
    pub fn with_metadata(root: XmlElement, metadata: DocumentMetadata) -> Self {
        Self { root, metadata }
    }

    /// Set the source identifier
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    /// Serialize the root element
    pub fn to_xml(&self, options: &WriteOptions) -> Result<String> {
        to_string_with(&self.root, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::QName;

    #[test]
    fn test_document_creation() {
        let doc = Document::new(XmlElement::new(QName::local("config")));
        assert_eq!(doc.root.name.local, "config");
        assert_eq!(doc.metadata, DocumentMetadata::default());
    }

    #[test]
    fn test_document_with_source() {
        let doc = Document::new(XmlElement::new(QName::local("config"))).with_source("router.cfg");
        assert_eq!(doc.metadata.source.as_deref(), Some("router.cfg"));
    }

    #[test]
    fn test_document_to_xml() {
        let metadata = DocumentMetadata {
            source: None,
            lines: 2,
            containers: 1,
            leaves: 0,
        };
        let doc = Document::with_metadata(XmlElement::new(QName::local("config")), metadata);
        assert_eq!(doc.to_xml(&WriteOptions::compact()).unwrap(), "<config/>");
        assert_eq!(doc.metadata.containers, 1);
    }
}
