//! Path tables
//!
//! One trie keyed by element name, one [`PathEntry`] per recorded path.

use crate::model::Namespace;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Terminal node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeafKind {
    Leaf,
    LeafList,
}

/// Everything recorded for one path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    /// Namespace declared at this path (inherited by descendants)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,

    /// Present for containers and lists; list keys in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf: Option<LeafKind>,

    /// Identity value → declaring module, for identityref leaves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identities: Option<BTreeMap<String, Namespace>>,
}

impl PathEntry {
    pub fn is_container(&self) -> bool {
        self.keys.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    entry: PathEntry,
    children: HashMap<String, TrieNode>,
}

/// Trie of [`PathEntry`] records
#[derive(Debug, Default)]
pub struct PathTable {
    root: TrieNode,
    len: usize,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&PathEntry> {
        if path.is_empty() {
            return None;
        }
        let mut node = &self.root;
        for segment in path {
            node = node.children.get(segment.as_ref())?;
        }
        Some(&node.entry)
    }

    /// Entry for `path`, created empty if missing
    pub fn entry_mut<S: AsRef<str>>(&mut self, path: &[S]) -> &mut PathEntry {
        let Self { root, len } = self;
        let mut node = root;
        for segment in path {
            node = node
                .children
                .entry(segment.as_ref().to_string())
                .or_insert_with(|| {
                    *len += 1;
                    TrieNode::default()
                });
        }
        &mut node.entry
    }

    /// Deepest namespace declared on `path` or any of its ancestors
    pub fn resolve_namespace<S: AsRef<str>>(&self, path: &[S]) -> Option<&Namespace> {
        let mut node = &self.root;
        let mut deepest = None;
        for segment in path {
            match node.children.get(segment.as_ref()) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(namespace) = &node.entry.namespace {
                deepest = Some(namespace);
            }
        }
        deepest
    }

    /// Number of trie nodes (paths, recorded or intermediate)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All paths with their entries, sorted by path
    pub fn entries(&self) -> Vec<(Vec<String>, &PathEntry)> {
        let mut out = Vec::with_capacity(self.len);
        let mut path = Vec::new();
        collect(&self.root, &mut path, &mut out);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

fn collect<'a>(node: &'a TrieNode, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, &'a PathEntry)>) {
    for (name, child) in &node.children {
        path.push(name.clone());
        out.push((path.clone(), &child.entry));
        collect(child, path, out);
        path.pop();
    }
}
