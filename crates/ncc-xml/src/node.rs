//! Element types for the output tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespace-qualified element or attribute name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    /// Prefix used when writing the name (e.g. `authy`)
    pub prefix: Option<String>,

    /// Namespace URI the prefix is bound to
    pub namespace: Option<String>,

    /// Local part of the name
    pub local: String,
}

/// A prefix → namespace URI binding declared on an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
}

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// An element in the output tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Qualified element name
    pub name: QName,

    /// Attributes in insertion order
    pub attributes: Vec<Attribute>,

    /// Namespace bindings requested on this element
    pub namespaces: Vec<NamespaceBinding>,

    /// Text content (leaf value)
    pub text: Option<String>,

    /// Child elements
    pub children: Vec<XmlElement>,
}

impl QName {
    /// A name with no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            namespace: None,
            local: local.into(),
        }
    }

    /// A name qualified by `prefix`, bound to `namespace`.
    pub fn qualified(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Name as written in markup, `prefix:local` or `local`.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, self.local),
            _ => self.local.clone(),
        }
    }
}

/// Clark notation, `{namespace}local`.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

impl NamespaceBinding {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

impl XmlElement {
    /// Create a new empty element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Add a child element
    pub fn add_child(&mut self, child: XmlElement) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
        self
    }

    /// Declare a namespace binding on this element (ignored if already declared here)
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> &mut Self {
        let binding = NamespaceBinding::new(prefix, uri);
        if !self.namespaces.contains(&binding) {
            self.namespaces.push(binding);
        }
        self
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    /// Look up an attribute by local name
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Find the first child with the given local name
    pub fn find_child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name.local == local)
    }

    /// Find all children with the given local name
    pub fn find_children(&self, local: &str) -> Vec<&XmlElement> {
        self.children.iter().filter(|c| c.name.local == local).collect()
    }

    /// Number of elements in this subtree, including self
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(XmlElement::element_count).sum::<usize>()
    }
}
