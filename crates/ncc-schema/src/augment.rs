//! Augment staging and merging
//!
//! Augments are collected from every module keyed by their `target-node`
//! (`/prefix:name/prefix:name` notation) and tagged with the declaring
//! module. Merging walks the tree from the root container, building the
//! same notation as it descends; wherever the accumulated path equals a
//! staged target, the augment statement is appended under that node.
//! Target paths skip `choice`/`case`, so the walk searches through those
//! wrappers (and through already attached augments) for containers and
//! lists.

use crate::model::Namespace;
use crate::yin::{Keyword, NodeId, SchemaArena};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Augments waiting to be merged, by target path
#[derive(Debug, Default)]
pub struct AugmentSet {
    staged: HashMap<String, Vec<NodeId>>,
    order: Vec<NodeId>,
    attached: HashSet<NodeId>,
}

impl AugmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage every augment below `module_root`, tagging each with `module`.
    /// Augments inside grouping definitions are skipped; their inlined
    /// copies are staged from where they were used.
    pub fn stage(&mut self, arena: &mut SchemaArena, module_root: NodeId, module: &Namespace) {
        for augment in arena.descendants(module_root, Keyword::Augment, &[Keyword::Grouping]) {
            let Some(target) = arena.get(augment).attribute("target-node") else {
                continue;
            };
            let target = normalize_target(target);
            trace!(target = %target, module = %module.prefix, "staging augment");
            arena.get_mut(augment).module = Some(module.clone());
            self.staged.entry(target).or_default().push(augment);
            self.order.push(augment);
        }
    }

    /// Number of staged augments
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of augments attached by [`AugmentSet::merge`]
    pub fn attached(&self) -> usize {
        self.attached.len()
    }

    /// Merge staged augments into the tree below `root`, a container named
    /// `root_name` in the module with prefix `root_prefix`. Each augment is
    /// attached at most once.
    pub fn merge(&mut self, arena: &mut SchemaArena, root: NodeId, root_name: &str, root_prefix: &str) {
        let target = format!("/{}:{}", root_prefix, root_name);
        self.combine(arena, root, &target, root_prefix);

        let unattached: Vec<&str> = self
            .staged
            .iter()
            .filter(|(_, ids)| ids.iter().any(|id| !self.attached.contains(id)))
            .map(|(target, _)| target.as_str())
            .collect();
        if !unattached.is_empty() {
            debug!(
                count = unattached.len(),
                targets = ?unattached,
                "augments outside the configuration tree were not merged"
            );
        }
    }

    fn combine(&mut self, arena: &mut SchemaArena, node: NodeId, target: &str, prefix: &str) {
        if let Some(augments) = self.staged.get(target) {
            for augment in augments.clone() {
                if self.attached.insert(augment) {
                    trace!(target, "merging augment");
                    arena.get_mut(node).children.push(augment);
                }
            }
        }
        self.search(arena, node, target, prefix);
    }

    fn search(&mut self, arena: &mut SchemaArena, node: NodeId, target: &str, prefix: &str) {
        let children = arena.children(node).to_vec();
        for child in children {
            let statement = arena.get(child);
            let child_prefix = statement
                .module
                .as_ref()
                .map_or_else(|| prefix.to_string(), |m| m.prefix.clone());

            if statement.keyword.is_wrapper() {
                self.search(arena, child, target, &child_prefix);
            } else if statement.keyword.is_container() {
                let name = statement.name().unwrap_or_default();
                let child_target = format!("{}/{}:{}", target, child_prefix, name);
                self.combine(arena, child, &child_target, &child_prefix);
            }
        }
    }
}

fn normalize_target(target: &str) -> String {
    let trimmed = target.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
