//! YIN node arena
//!
//! Every parsed YIN file is appended to one arena of [`SchemaNode`]s and
//! referenced by [`NodeId`]. Grouping inlining and augment merging splice
//! node ids between child lists instead of moving owned subtrees, so a
//! node can never end up shared between two parents.

use crate::model::Namespace;
use crate::{Result, SchemaError};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace as XmlNamespace, ResolveResult};
use tracing::trace;

/// Namespace of YIN statements
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";

/// Compact node identifier (index into the arena)
pub type NodeId = u32;

/// The YANG statements the resolver cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Module,
    Submodule,
    Namespace,
    Prefix,
    Grouping,
    Uses,
    Identity,
    Base,
    Augment,
    Choice,
    Case,
    Container,
    List,
    Key,
    Leaf,
    LeafList,
    Type,
    /// Any other YIN statement, or an element outside the YIN namespace
    Other,
}

impl Keyword {
    fn from_local_name(local: &[u8]) -> Self {
        match local {
            b"module" => Self::Module,
            b"submodule" => Self::Submodule,
            b"namespace" => Self::Namespace,
            b"prefix" => Self::Prefix,
            b"grouping" => Self::Grouping,
            b"uses" => Self::Uses,
            b"identity" => Self::Identity,
            b"base" => Self::Base,
            b"augment" => Self::Augment,
            b"choice" => Self::Choice,
            b"case" => Self::Case,
            b"container" => Self::Container,
            b"list" => Self::List,
            b"key" => Self::Key,
            b"leaf" => Self::Leaf,
            b"leaf-list" => Self::LeafList,
            b"type" => Self::Type,
            _ => Self::Other,
        }
    }

    /// Statements that wrap data nodes without adding a path segment
    pub fn is_wrapper(self) -> bool {
        matches!(self, Self::Augment | Self::Choice | Self::Case)
    }

    /// Statements that add an interior path segment
    pub fn is_container(self) -> bool {
        matches!(self, Self::Container | Self::List)
    }

    /// Statements that add a terminal path segment
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Leaf | Self::LeafList)
    }
}

/// A statement in the arena
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub keyword: Keyword,

    /// Statement arguments (`name`, `value`, `uri`, `target-node`, ...)
    pub attributes: Vec<(String, String)>,

    pub children: Vec<NodeId>,

    /// Declaring module, set on staged augments
    pub module: Option<Namespace>,
}

impl SchemaNode {
    fn new(keyword: Keyword) -> Self {
        Self {
            keyword,
            attributes: Vec::new(),
            children: Vec::new(),
            module: None,
        }
    }

    /// Look up a statement argument
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `name` argument
    pub fn name(&self) -> Option<&str> {
        self.attribute("name")
    }
}

/// Arena of parsed YIN statements
#[derive(Debug, Default)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, node: SchemaNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id as usize]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// First direct child with the given keyword
    pub fn find_child(&self, id: NodeId, keyword: Keyword) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.get(*c).keyword == keyword)
    }

    /// Direct children with the given keyword
    pub fn children_with(&self, id: NodeId, keyword: Keyword) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.get(*c).keyword == keyword)
            .collect()
    }

    /// Descendants with the given keyword in document order, not descending
    /// into statements whose keyword is in `skip`.
    pub fn descendants(&self, id: NodeId, keyword: Keyword, skip: &[Keyword]) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = pending.pop() {
            let node = self.get(current);
            if node.keyword == keyword {
                found.push(current);
            }
            if !skip.contains(&node.keyword) {
                pending.extend(node.children.iter().rev().copied());
            }
        }
        found
    }

    /// Structural copy of a subtree; returns the id of the copied root.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.get(id).clone();
        let originals = std::mem::take(&mut copy.children);
        copy.children = originals.into_iter().map(|c| self.deep_copy(c)).collect();
        self.alloc(copy)
    }

    /// Parse a YIN document into the arena; returns the module statement.
    pub fn parse(&mut self, file: &str, content: &str) -> Result<NodeId> {
        let mut reader = NsReader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let (resolved, event) = match reader.read_resolved_event() {
                Ok(pair) => pair,
                Err(e) => return Err(SchemaError::xml(file, e.to_string())),
            };
            let in_yin = matches!(
                resolved,
                ResolveResult::Bound(XmlNamespace(ns)) if ns == YIN_NAMESPACE.as_bytes()
            );

            match event {
                Event::Start(start) => {
                    let id = self.open(file, &start, in_yin)?;
                    self.attach(&stack, &mut root, id, file)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let id = self.open(file, &start, in_yin)?;
                    self.attach(&stack, &mut root, id, file)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| SchemaError::xml(file, "document has no root element"))?;
        match self.get(root).keyword {
            Keyword::Module | Keyword::Submodule => {
                trace!(file, nodes = self.len(), "parsed YIN module");
                Ok(root)
            }
            _ => Err(SchemaError::xml(file, "root element is not a YIN module")),
        }
    }

    fn open(&mut self, file: &str, start: &BytesStart<'_>, in_yin: bool) -> Result<NodeId> {
        let keyword = if in_yin {
            Keyword::from_local_name(start.local_name().as_ref())
        } else {
            Keyword::Other
        };

        let mut node = SchemaNode::new(keyword);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| SchemaError::xml(file, e.to_string()))?;
            let key = attribute.key.as_ref();
            if key.starts_with(b"xmlns") {
                continue;
            }
            let value = attribute
                .unescape_value()
                .map_err(|e| SchemaError::xml(file, e.to_string()))?;
            node.attributes
                .push((String::from_utf8_lossy(key).into_owned(), value.into_owned()));
        }
        Ok(self.alloc(node))
    }

    fn attach(
        &mut self,
        stack: &[NodeId],
        root: &mut Option<NodeId>,
        id: NodeId,
        file: &str,
    ) -> Result<()> {
        match stack.last() {
            Some(parent) => self.get_mut(*parent).children.push(id),
            None if root.is_none() => *root = Some(id),
            None => return Err(SchemaError::xml(file, "multiple root elements")),
        }
        Ok(())
    }
}
