//! Event-driven construction of element trees
//!
//! `TreeBuilder` mirrors the familiar start/data/end builder API: elements
//! are opened on a stack, text is appended to the innermost open element,
//! and `end` attaches the finished element to its parent.

use crate::node::{QName, XmlElement};
use crate::{Error, Result};
use tracing::trace;

/// Builds a single-rooted element tree from start/data/end calls
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<XmlElement>,
    root: Option<XmlElement>,
}

impl TreeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `element`; returns it so attributes can be set before it is closed.
    pub fn start(&mut self, element: XmlElement) -> &mut XmlElement {
        trace!(depth = self.stack.len(), name = %element.name, "start element");
        self.stack.push(element);
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    /// Append text to the innermost open element.
    pub fn data(&mut self, text: &str) -> Result<()> {
        let top = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::NoOpenElement("#text".to_string()))?;
        match &mut top.text {
            Some(existing) => existing.push_str(text),
            None => top.text = Some(text.to_string()),
        }
        Ok(())
    }

    /// Close the innermost open element, which must be named `name`.
    pub fn end(&mut self, name: &QName) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| Error::NoOpenElement(name.to_string()))?;

        if element.name != *name {
            return Err(Error::UnbalancedEnd {
                expected: element.name.to_string(),
                found: name.to_string(),
            });
        }

        trace!(depth = self.stack.len(), name = %element.name, "end element");

        match self.stack.last_mut() {
            Some(parent) => {
                parent.add_child(element);
            }
            None => {
                if self.root.is_some() {
                    return Err(Error::MultipleRoots(element.name.to_string()));
                }
                self.root = Some(element);
            }
        }
        Ok(())
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Finish building and return the root element.
    pub fn close(mut self) -> Result<XmlElement> {
        if !self.stack.is_empty() {
            let open: Vec<String> = self
                .stack
                .iter()
                .map(|e| e.name.qualified_name())
                .collect();
            return Err(Error::UnclosedElements(open.join("/")));
        }
        self.root.take().ok_or(Error::NoRoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(local: &str) -> QName {
        QName::qualified("t", "urn:test", local)
    }

    #[test]
    fn test_build_nested_tree() {
        let mut builder = TreeBuilder::new();
        builder.start(XmlElement::new(name("config")));
        builder.start(XmlElement::new(name("authority")));
        builder.start(XmlElement::new(name("name")));
        builder.data("Authority128").unwrap();
        builder.end(&name("name")).unwrap();
        assert_eq!(builder.depth(), 2);
        builder.end(&name("authority")).unwrap();
        builder.end(&name("config")).unwrap();

        let root = builder.close().unwrap();
        assert_eq!(root.name.local, "config");
        let authority = root.find_child("authority").unwrap();
        let leaf = authority.find_child("name").unwrap();
        assert_eq!(leaf.text.as_deref(), Some("Authority128"));
    }

    #[test]
    fn test_start_returns_element_for_attributes() {
        let mut builder = TreeBuilder::new();
        builder
            .start(XmlElement::new(name("description")))
            .set_attribute(QName::local("operation"), "delete");
        builder.end(&name("description")).unwrap();

        let root = builder.close().unwrap();
        assert_eq!(root.attribute("operation"), Some("delete"));
    }

    #[test]
    fn test_mismatched_end_is_rejected() {
        let mut builder = TreeBuilder::new();
        builder.start(XmlElement::new(name("authority")));
        let err = builder.end(&name("router")).unwrap_err();
        assert!(matches!(err, Error::UnbalancedEnd { .. }));
    }

    #[test]
    fn test_end_without_open_element() {
        let mut builder = TreeBuilder::new();
        let err = builder.end(&name("config")).unwrap_err();
        assert!(matches!(err, Error::NoOpenElement(_)));
    }

    #[test]
    fn test_close_with_open_elements() {
        let mut builder = TreeBuilder::new();
        builder.start(XmlElement::new(name("config")));
        builder.start(XmlElement::new(name("authority")));
        builder.end(&name("authority")).unwrap();

        match builder.close().unwrap_err() {
            Error::UnclosedElements(open) => assert_eq!(open, "t:config"),
            e => panic!("Expected UnclosedElements, got {:?}", e),
        }
    }

    #[test]
    fn test_close_without_root() {
        let builder = TreeBuilder::new();
        assert!(matches!(builder.close().unwrap_err(), Error::NoRoot));
    }

    #[test]
    fn test_second_root_is_rejected() {
        let mut builder = TreeBuilder::new();
        builder.start(XmlElement::new(name("config")));
        builder.end(&name("config")).unwrap();
        builder.start(XmlElement::new(name("filter")));
        assert!(matches!(
            builder.end(&name("filter")).unwrap_err(),
            Error::MultipleRoots(_)
        ));
    }

    #[test]
    fn test_data_appends() {
        let mut builder = TreeBuilder::new();
        builder.start(XmlElement::new(name("address")));
        builder.data("force").unwrap();
        builder.data(" 1.1.1.1/16").unwrap();
        builder.end(&name("address")).unwrap();
        let root = builder.close().unwrap();
        assert_eq!(root.text.as_deref(), Some("force 1.1.1.1/16"));
    }
}
