//! Schema model
//!
//! [`SchemaModel::build`] runs the whole resolution pipeline over a set of
//! YIN sources and keeps only the resulting [`PathTable`]. Paths are
//! element names from the root container down, without prefixes; choice,
//! case and augment statements add no segment.

use crate::augment::AugmentSet;
use crate::grouping::{GroupingIndex, ModuleRoot, inline_groupings};
use crate::identity::IdentityIndex;
use crate::table::{LeafKind, PathEntry, PathTable};
use crate::yin::{Keyword, NodeId, SchemaArena};
use crate::{Result, SchemaError, strip_prefix};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, trace};

/// A module namespace binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.prefix, self.uri)
    }
}

/// One YIN document to build from
#[derive(Debug, Clone)]
pub struct SchemaSource {
    /// File name or other identifier; sources are layered by name
    pub name: String,
    pub content: String,
}

impl SchemaSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Model build options
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelOptions {
    /// Name of the top-level container that roots the configuration tree
    pub root_element: String,

    /// Only modules whose namespace URI contains this are layered in
    pub namespace_filter: Option<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            root_element: "config".to_string(),
            namespace_filter: None,
        }
    }
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_element(mut self, root_element: impl Into<String>) -> Self {
        self.root_element = root_element.into();
        self
    }

    pub fn with_namespace_filter(mut self, filter: impl Into<String>) -> Self {
        self.namespace_filter = Some(filter.into());
        self
    }

    fn accepts(&self, namespace: &Namespace) -> bool {
        self.namespace_filter
            .as_deref()
            .is_none_or(|filter| namespace.uri.contains(filter))
    }
}

/// Counters collected while building
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub files: usize,
    pub modules: usize,
    pub groupings_inlined: usize,
    pub augments_staged: usize,
    pub augments_merged: usize,
    pub containers: usize,
    pub leaves: usize,
    pub identity_leaves: usize,
}

/// A recorded path, for dumps
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    pub path: String,
    #[serde(flatten)]
    pub entry: PathEntry,
}

/// Resolved configuration schema
#[derive(Debug)]
pub struct SchemaModel {
    table: PathTable,
    root_element: String,
    root_namespace: Namespace,
    stats: ModelStats,
}

struct ParsedModule {
    file: String,
    root: NodeId,
    namespace: Namespace,
}

impl SchemaModel {
    /// Build a model from YIN sources.
    pub fn build(sources: &[SchemaSource], options: &ModelOptions) -> Result<Self> {
        let mut ordered: Vec<&SchemaSource> = sources.iter().collect();
        ordered.sort_by(|a, b| b.name.cmp(&a.name));

        let mut arena = SchemaArena::new();
        let mut parsed = Vec::with_capacity(ordered.len());
        for source in ordered {
            let root = arena.parse(&source.name, &source.content)?;
            let namespace = module_namespace(&arena, root, &source.name)?;
            parsed.push(ParsedModule {
                file: source.name.clone(),
                root,
                namespace,
            });
        }

        let all: Vec<ModuleRoot> = parsed
            .iter()
            .map(|m| ModuleRoot {
                file: m.file.clone(),
                root: m.root,
            })
            .collect();
        let index = GroupingIndex::collect(&arena, &all);

        let layered: Vec<&ParsedModule> = parsed
            .iter()
            .filter(|m| {
                let accepted = options.accepts(&m.namespace);
                if !accepted {
                    debug!(file = %m.file, namespace = %m.namespace.uri, "module skipped by namespace filter");
                }
                accepted
            })
            .collect();
        let layered_roots: Vec<ModuleRoot> = layered
            .iter()
            .map(|m| ModuleRoot {
                file: m.file.clone(),
                root: m.root,
            })
            .collect();
        let groupings_inlined = inline_groupings(&mut arena, &index, &layered_roots)?;

        let mut config_root = None;
        for module in &layered {
            for container in arena.children_with(module.root, Keyword::Container) {
                if arena.get(container).name() == Some(options.root_element.as_str()) {
                    trace!(file = %module.file, "found root container");
                    config_root = Some((container, module.namespace.clone()));
                }
            }
        }
        let (root, root_namespace) = config_root.ok_or_else(|| SchemaError::MissingRoot {
            root: options.root_element.clone(),
        })?;

        let mut augments = AugmentSet::new();
        let mut identities = IdentityIndex::new();
        for module in &layered {
            augments.stage(&mut arena, module.root, &module.namespace);
            identities.stage(&arena, module.root, &module.namespace);
        }
        augments.merge(&mut arena, root, &options.root_element, &root_namespace.prefix);

        let mut table = PathTable::new();
        let root_path = vec![options.root_element.clone()];
        {
            let entry = table.entry_mut(&root_path);
            entry.namespace = Some(root_namespace.clone());
            entry.keys = Some(Vec::new());
        }

        let mut walker = PathWalker {
            arena: &arena,
            identities: &identities,
            table: &mut table,
            stats: ModelStats {
                files: sources.len(),
                modules: layered.len(),
                groupings_inlined,
                augments_staged: augments.len(),
                augments_merged: augments.attached(),
                containers: 1,
                ..ModelStats::default()
            },
        };
        let mut path = root_path;
        walker.walk(root, &mut path, &root_namespace, &root_namespace);
        let stats = walker.stats;

        info!(
            files = stats.files,
            modules = stats.modules,
            containers = stats.containers,
            leaves = stats.leaves,
            root = %root_namespace,
            "built schema model"
        );

        Ok(Self {
            table,
            root_element: options.root_element.clone(),
            root_namespace,
            stats,
        })
    }

    /// Deepest namespace declared on `path` or an ancestor
    pub fn resolve_namespace<S: AsRef<str>>(&self, path: &[S]) -> Result<&Namespace> {
        self.table
            .resolve_namespace(path)
            .ok_or_else(|| SchemaError::NoNamespace {
                path: join(path),
            })
    }

    /// Namespace declared exactly at `path`
    pub fn namespace_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Namespace> {
        self.table.find(path).and_then(|e| e.namespace.as_ref())
    }

    pub fn is_container<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.table.find(path).is_some_and(PathEntry::is_container)
    }

    pub fn is_leaf<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.table.find(path).is_some_and(PathEntry::is_leaf)
    }

    /// List keys in declaration order; empty for unkeyed paths
    pub fn container_keys<S: AsRef<str>>(&self, path: &[S]) -> &[String] {
        self.table
            .find(path)
            .and_then(|e| e.keys.as_deref())
            .unwrap_or(&[])
    }

    pub fn is_identity<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.table
            .find(path)
            .is_some_and(|e| e.identities.is_some())
    }

    /// Prefix qualifying `value` at an identityref leaf
    pub fn identity_prefix<S: AsRef<str>>(&self, path: &[S], value: &str) -> Option<&str> {
        self.identity_namespace(path, value)
            .map(|namespace| namespace.prefix.as_str())
    }

    /// Module declaring identity `value` at an identityref leaf
    pub fn identity_namespace<S: AsRef<str>>(&self, path: &[S], value: &str) -> Option<&Namespace> {
        self.table.find(path)?.identities.as_ref()?.get(value)
    }

    pub fn root_element(&self) -> &str {
        &self.root_element
    }

    pub fn root_namespace(&self) -> &Namespace {
        &self.root_namespace
    }

    pub fn stats(&self) -> &ModelStats {
        &self.stats
    }

    /// Every recorded path, sorted
    pub fn entries(&self) -> Vec<ModelEntry> {
        self.table
            .entries()
            .into_iter()
            .filter(|(_, entry)| **entry != PathEntry::default())
            .map(|(path, entry)| ModelEntry {
                path: path.join("/"),
                entry: entry.clone(),
            })
            .collect()
    }
}

fn join<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("/")
}

fn module_namespace(arena: &SchemaArena, root: NodeId, file: &str) -> Result<Namespace> {
    let uri = arena
        .find_child(root, Keyword::Namespace)
        .and_then(|ns| arena.get(ns).attribute("uri"))
        .ok_or_else(|| SchemaError::MissingNamespace {
            file: file.to_string(),
        })?;
    let prefix = arena
        .find_child(root, Keyword::Prefix)
        .and_then(|p| arena.get(p).attribute("value"))
        .ok_or_else(|| SchemaError::MissingPrefix {
            file: file.to_string(),
        })?;
    Ok(Namespace::new(prefix, uri))
}

struct PathWalker<'a> {
    arena: &'a SchemaArena,
    identities: &'a IdentityIndex,
    table: &'a mut PathTable,
    stats: ModelStats,
}

impl PathWalker<'_> {
    /// `effective` is the module data nodes below `node` belong to;
    /// `enclosing` is the effective module of the nearest container.
    fn walk(&mut self, node: NodeId, path: &mut Vec<String>, effective: &Namespace, enclosing: &Namespace) {
        let arena = self.arena;
        for &child in arena.children(node) {
            let statement = arena.get(child);
            match statement.keyword {
                Keyword::Augment => {
                    let module = statement.module.as_ref().unwrap_or(effective);
                    self.walk(child, path, module, enclosing);
                }
                Keyword::Choice | Keyword::Case => self.walk(child, path, effective, enclosing),
                Keyword::Container | Keyword::List => {
                    let Some(name) = statement.name() else {
                        continue;
                    };
                    path.push(name.to_string());
                    let keys = self.keys(child);
                    let entry = self.table.entry_mut(path.as_slice());
                    entry.keys = Some(keys);
                    if effective != enclosing {
                        entry.namespace = Some(effective.clone());
                    }
                    self.stats.containers += 1;
                    self.walk(child, path, effective, effective);
                    path.pop();
                }
                Keyword::Leaf | Keyword::LeafList => {
                    let Some(name) = statement.name() else {
                        continue;
                    };
                    path.push(name.to_string());
                    let identities = self.identity_base(child).map(|base| self.identities.resolve(base));
                    let entry = self.table.entry_mut(path.as_slice());
                    entry.leaf = Some(if statement.keyword == Keyword::Leaf {
                        LeafKind::Leaf
                    } else {
                        LeafKind::LeafList
                    });
                    if effective != enclosing {
                        entry.namespace = Some(effective.clone());
                    }
                    if let Some(values) = identities {
                        trace!(path = %path.join("/"), values = values.len(), "identityref leaf");
                        entry.identities = Some(values);
                        self.stats.identity_leaves += 1;
                    }
                    self.stats.leaves += 1;
                    path.pop();
                }
                _ => {}
            }
        }
    }

    fn keys(&self, node: NodeId) -> Vec<String> {
        self.arena
            .children_with(node, Keyword::Key)
            .into_iter()
            .filter_map(|k| self.arena.get(k).attribute("value"))
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect()
    }

    fn identity_base(&self, leaf: NodeId) -> Option<&str> {
        let ty = self.arena.find_child(leaf, Keyword::Type)?;
        if strip_prefix(self.arena.get(ty).name()?) != "identityref" {
            return None;
        }
        let base = self.arena.find_child(ty, Keyword::Base)?;
        self.arena.get(base).name()
    }
}
