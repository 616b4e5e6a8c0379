//! Line-by-line compilation into an element tree
//!
//! The compiler keeps a stack of open element names. The path of a line is
//! that stack plus the line's first token; the schema model decides whether
//! the path is a container (opened and pushed), a leaf (written and closed
//! in place) or unknown (rejected). The synthesized NETCONF root wraps the
//! whole tree and is closed only once every container has seen its `exit`.

use crate::input::{ConfigInput, is_blank_or_comment};
use crate::statement::{Operation, Statement};
use crate::{ConfigParseError, ParseCause, Result};
use ncc_schema::{Namespace, SchemaModel};
use ncc_xml::{Document, DocumentMetadata, NETCONF_BASE_NS, NETCONF_PREFIX, QName, TreeBuilder, XmlElement};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Compile options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Local name of the synthesized root (`config`, `filter`, ...)
    pub root_tag: String,

    /// Extra attributes on the root, in output order
    pub root_attributes: Vec<(String, String)>,

    /// Write list keys given on a container line as key leaves, and reject
    /// lines whose key count does not match the schema
    pub write_keys: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            root_tag: "config".to_string(),
            root_attributes: Vec::new(),
            write_keys: false,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_tag(mut self, root_tag: impl Into<String>) -> Self {
        self.root_tag = root_tag.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.root_attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_write_keys(mut self, write_keys: bool) -> Self {
        self.write_keys = write_keys;
        self
    }
}

/// Compiles configuration text against one schema model
#[derive(Debug, Clone)]
pub struct ConfigCompiler<'m> {
    model: &'m SchemaModel,
    options: CompileOptions,
}

impl<'m> ConfigCompiler<'m> {
    pub fn new(model: &'m SchemaModel) -> Self {
        Self {
            model,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile to the root element
    pub fn compile(&self, input: &ConfigInput) -> Result<XmlElement> {
        self.compile_document(input).map(|document| document.root)
    }

    /// Compile to a document carrying counts of what was written
    pub fn compile_document(&self, input: &ConfigInput) -> Result<Document> {
        let lines = input.lines();
        let mut session = Session::new(self.model, &self.options);

        for (index, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if is_blank_or_comment(line) {
                continue;
            }
            let line_number = index + 1;
            trace!(line_number, line, depth = session.stack.len(), "processing line");
            session
                .line(line)
                .map_err(|cause| ConfigParseError::new(line_number, line, cause))?;
        }

        // Errors at end of input cite the last line with content
        let (last_line, last_text) = lines
            .iter()
            .enumerate()
            .rev()
            .map(|(index, raw)| (index + 1, raw.trim()))
            .find(|(_, line)| !is_blank_or_comment(line))
            .unwrap_or((lines.len(), ""));
        let (root, metadata) = session
            .finish(lines.len())
            .map_err(|cause| ConfigParseError::new(last_line, last_text, cause))?;

        debug!(
            lines = metadata.lines,
            containers = metadata.containers,
            leaves = metadata.leaves,
            "compiled configuration"
        );
        Ok(Document::with_metadata(root, metadata))
    }
}

/// Compile `input` with default options apart from the root tag and its
/// attributes.
pub fn compile(
    model: &SchemaModel,
    input: &ConfigInput,
    root_tag: &str,
    root_attributes: &[(String, String)],
) -> Result<XmlElement> {
    let options = CompileOptions {
        root_tag: root_tag.to_string(),
        root_attributes: root_attributes.to_vec(),
        write_keys: false,
    };
    ConfigCompiler::new(model).with_options(options).compile(input)
}

/// State of one compile
struct Session<'a> {
    model: &'a SchemaModel,
    options: &'a CompileOptions,
    builder: TreeBuilder,
    root: QName,
    /// Schema path of the open containers
    stack: Vec<String>,
    /// Element names of the open containers, parallel to `stack`
    open: Vec<QName>,
    containers: usize,
    leaves: usize,
}

impl<'a> Session<'a> {
    fn new(model: &'a SchemaModel, options: &'a CompileOptions) -> Self {
        let root = QName::qualified(NETCONF_PREFIX, NETCONF_BASE_NS, options.root_tag.as_str());
        let mut element = XmlElement::new(root.clone());
        element.declare_namespace(NETCONF_PREFIX, NETCONF_BASE_NS);
        for (name, value) in &options.root_attributes {
            element.set_attribute(QName::local(name.as_str()), value.as_str());
        }

        let mut builder = TreeBuilder::new();
        builder.start(element);

        Self {
            model,
            options,
            builder,
            root,
            stack: Vec::new(),
            open: Vec::new(),
            containers: 0,
            leaves: 0,
        }
    }

    fn line(&mut self, line: &str) -> std::result::Result<(), ParseCause> {
        let statement = Statement::parse(line)?;
        let Statement::Node {
            operation,
            name,
            ref value,
            ..
        } = statement
        else {
            return self.exit();
        };

        let mut path = self.stack.clone();
        path.push(name.to_string());

        if self.model.is_container(&path[..]) {
            self.open_container(path, operation, statement.arguments())
        } else if self.model.is_leaf(&path[..]) {
            self.write_leaf(&path, operation, value.as_deref())
        } else {
            Err(ParseCause::UnknownElement {
                element: name.to_string(),
                parent: if self.stack.is_empty() {
                    "/".to_string()
                } else {
                    self.stack.join("/")
                },
            })
        }
    }

    fn exit(&mut self) -> std::result::Result<(), ParseCause> {
        let name = self.open.pop().ok_or(ParseCause::UnmatchedExit)?;
        self.stack.pop();
        self.builder.end(&name)?;
        Ok(())
    }

    fn open_container(
        &mut self,
        path: Vec<String>,
        operation: Option<Operation>,
        arguments: &[&str],
    ) -> std::result::Result<(), ParseCause> {
        let name = self.element_name(&path)?;
        self.builder.start(element(name.clone(), operation));
        self.containers += 1;

        if self.options.write_keys {
            self.write_keys(&path, arguments)?;
        }

        self.stack = path;
        self.open.push(name);
        Ok(())
    }

    fn write_keys(&mut self, path: &[String], arguments: &[&str]) -> std::result::Result<(), ParseCause> {
        let model = self.model;
        let keys = model.container_keys(path);
        if keys.len() != arguments.len() {
            return Err(ParseCause::KeyMismatch {
                path: path.join("/"),
                expected: keys.to_vec(),
                found: arguments.iter().map(|a| a.to_string()).collect(),
            });
        }

        for (key, argument) in keys.iter().zip(arguments) {
            let mut key_path = path.to_vec();
            key_path.push(key.clone());
            self.write_leaf(&key_path, None, Some(*argument))?;
        }
        Ok(())
    }

    fn write_leaf(
        &mut self,
        path: &[String],
        operation: Option<Operation>,
        value: Option<&str>,
    ) -> std::result::Result<(), ParseCause> {
        let name = self.element_name(path)?;
        let mut leaf = element(name.clone(), operation);
        let model = self.model;
        let identity = value
            .and_then(|v| model.identity_namespace(path, v))
            .map(|namespace| identity_binding(&name, namespace));
        if let Some((prefix, uri)) = &identity {
            leaf.declare_namespace(prefix.as_str(), *uri);
        }
        self.builder.start(leaf);

        if let Some(value) = value {
            let text = match &identity {
                Some((prefix, _)) => format!("{prefix}:{value}"),
                None => value.to_string(),
            };
            self.builder.data(&text)?;
        }
        self.builder.end(&name)?;
        self.leaves += 1;
        Ok(())
    }

    fn element_name(&self, path: &[String]) -> std::result::Result<QName, ParseCause> {
        let namespace = self.model.resolve_namespace(path)?;
        let local = path.last().map(String::as_str).unwrap_or_default();
        Ok(QName::qualified(namespace.prefix.as_str(), namespace.uri.as_str(), local))
    }

    fn finish(mut self, lines: usize) -> std::result::Result<(XmlElement, DocumentMetadata), ParseCause> {
        if !self.stack.is_empty() {
            return Err(ParseCause::MissingExit {
                open: self.stack.join("/"),
            });
        }
        self.builder.end(&self.root)?;
        let root = self.builder.close()?;
        let metadata = DocumentMetadata {
            source: None,
            lines,
            containers: self.containers,
            leaves: self.leaves,
        };
        Ok((root, metadata))
    }
}

/// Prefix and URI qualifying an identity value written inside `leaf`. The
/// identity module's prefix is kept unless the leaf's own name or the
/// NETCONF operation attribute binds it to another URI, in which case a
/// numbered variant is used.
fn identity_binding<'n>(leaf: &QName, identity: &'n Namespace) -> (String, &'n str) {
    let clashes = |prefix: &str| {
        let leaf_clash = leaf.prefix.as_deref() == Some(prefix)
            && leaf.namespace.as_deref() != Some(identity.uri.as_str());
        let netconf_clash = prefix == NETCONF_PREFIX && identity.uri != NETCONF_BASE_NS;
        leaf_clash || netconf_clash
    };

    let mut prefix = identity.prefix.clone();
    let mut suffix = 1;
    while clashes(&prefix) {
        prefix = format!("{}{}", identity.prefix, suffix);
        suffix += 1;
    }
    (prefix, identity.uri.as_str())
}

/// A schema element declaring its own namespace binding; the serializer
/// drops declarations already in scope.
fn element(name: QName, operation: Option<Operation>) -> XmlElement {
    let mut element = XmlElement::new(name.clone());
    if let (Some(prefix), Some(uri)) = (name.prefix, name.namespace) {
        element.declare_namespace(prefix, uri);
    }
    if let Some(operation) = operation {
        element.set_attribute(
            QName::qualified(NETCONF_PREFIX, NETCONF_BASE_NS, "operation"),
            operation.as_str(),
        );
    }
    element
}
