//! Element tree serializer
//!
//! Writes an [`XmlElement`] tree with `quick-xml`. Each element declares
//! only the namespace bindings that are not already in scope with the same
//! URI, so a subtree living in one namespace carries a single declaration on
//! its top element.

use crate::node::{NamespaceBinding, QName, XmlElement};
use crate::{Error, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Serializer options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Indent width in spaces; `None` writes compact output
    pub indent: Option<usize>,
    /// Emit an `<?xml version="1.0" encoding="UTF-8"?>` declaration
    pub xml_declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: Some(4),
            xml_declaration: false,
        }
    }
}

impl WriteOptions {
    /// Compact output without indentation
    pub fn compact() -> Self {
        Self {
            indent: None,
            ..Self::default()
        }
    }

    /// Set the indent width
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Toggle the XML declaration
    pub fn xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }
}

/// Serialize with default (indented) options
pub fn to_string(element: &XmlElement) -> Result<String> {
    to_string_with(element, &WriteOptions::default())
}

/// Serialize with explicit options
pub fn to_string_with(element: &XmlElement, options: &WriteOptions) -> Result<String> {
    let mut writer = match options.indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };

    if options.xml_declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
    }

    let mut scope: Vec<NamespaceBinding> = Vec::new();
    write_element(&mut writer, element, &mut scope)?;

    String::from_utf8(writer.into_inner()).map_err(|e| Error::Write(e.to_string()))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &XmlElement,
    scope: &mut Vec<NamespaceBinding>,
) -> Result<()> {
    let scope_len = scope.len();
    let declarations = pending_declarations(element, scope);

    let tag = element.name.qualified_name();
    let mut start = BytesStart::new(tag.as_str());
    for binding in &declarations {
        let key = if binding.prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", binding.prefix)
        };
        start.push_attribute((key.as_str(), binding.uri.as_str()));
    }
    for attribute in &element.attributes {
        let key = attribute.name.qualified_name();
        start.push_attribute((key.as_str(), attribute.value.as_str()));
    }
    scope.extend(declarations);

    let text = element.text.as_deref().filter(|t| !t.is_empty());
    if text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_error)?;
    } else {
        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if let Some(text) = text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
        }
        for child in &element.children {
            write_element(writer, child, scope)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag.as_str())))
            .map_err(write_error)?;
    }

    scope.truncate(scope_len);
    Ok(())
}

/// Bindings this element must declare: the bindings its own name and
/// attribute names need, then its requested bindings, minus those already in
/// scope. A requested binding reusing a prefix taken by a needed one is
/// dropped.
fn pending_declarations(element: &XmlElement, scope: &[NamespaceBinding]) -> Vec<NamespaceBinding> {
    let mut pending: Vec<NamespaceBinding> = Vec::new();

    let required = std::iter::once(&element.name)
        .chain(element.attributes.iter().map(|a| &a.name))
        .filter_map(binding_for);

    for binding in required.chain(element.namespaces.iter().cloned()) {
        if in_scope(scope, &binding) || pending.iter().any(|p| p.prefix == binding.prefix) {
            continue;
        }
        pending.push(binding);
    }
    pending
}

fn binding_for(name: &QName) -> Option<NamespaceBinding> {
    match (&name.prefix, &name.namespace) {
        (Some(prefix), Some(uri)) if !prefix.is_empty() => {
            Some(NamespaceBinding::new(prefix.clone(), uri.clone()))
        }
        _ => None,
    }
}

fn in_scope(scope: &[NamespaceBinding], binding: &NamespaceBinding) -> bool {
    scope
        .iter()
        .rev()
        .find(|b| b.prefix == binding.prefix)
        .is_some_and(|b| b.uri == binding.uri)
}

fn write_error(e: impl std::fmt::Display) -> Error {
    Error::Write(e.to_string())
}
