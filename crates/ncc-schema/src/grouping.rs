//! Grouping inlining
//!
//! Every `uses` statement is replaced, in place, by structural copies of
//! the referenced grouping's children. Groupings are expanded before they
//! are copied, so nested `uses` inside a grouping are resolved once and
//! every copy is already flat. A grouping reached again while it is being
//! expanded is a cycle and fails the build.

use crate::yin::{Keyword, NodeId, SchemaArena};
use crate::{Result, SchemaError, strip_prefix};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// A parsed module taking part in inlining
#[derive(Debug, Clone)]
pub struct ModuleRoot {
    pub file: String,
    pub root: NodeId,
}

/// Top-level groupings by name, per file and across all files
#[derive(Debug, Default)]
pub struct GroupingIndex {
    by_file: HashMap<String, HashMap<String, NodeId>>,
    global: HashMap<String, NodeId>,
    owner: HashMap<NodeId, String>,
}

impl GroupingIndex {
    /// Index the top-level groupings of `modules`; later modules win on
    /// name clashes in the global table.
    pub fn collect(arena: &SchemaArena, modules: &[ModuleRoot]) -> Self {
        let mut index = Self::default();
        for module in modules {
            for grouping in arena.children_with(module.root, Keyword::Grouping) {
                let Some(name) = arena.get(grouping).name() else {
                    continue;
                };
                index
                    .by_file
                    .entry(module.file.clone())
                    .or_default()
                    .insert(name.to_string(), grouping);
                index.global.insert(name.to_string(), grouping);
                index.owner.insert(grouping, module.file.clone());
            }
        }
        index
    }

    /// Resolve a `uses` argument from `file`: file-local first, then global.
    pub fn lookup(&self, file: &str, name: &str) -> Option<NodeId> {
        let local = strip_prefix(name);
        self.by_file
            .get(file)
            .and_then(|groupings| groupings.get(local))
            .or_else(|| self.global.get(local))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }
}

/// Inline all `uses` statements below the given modules.
///
/// `index` may cover more modules than `modules` (groupings from modules
/// that are not layered into the model can still be used).
pub fn inline_groupings(
    arena: &mut SchemaArena,
    index: &GroupingIndex,
    modules: &[ModuleRoot],
) -> Result<usize> {
    let mut expander = Expander {
        index,
        expanded: HashSet::new(),
        in_progress: Vec::new(),
        inlined: 0,
    };
    for module in modules {
        expander.expand_children(arena, module.root, &module.file)?;
    }
    debug!(
        groupings = index.len(),
        inlined = expander.inlined,
        "inlined grouping references"
    );
    Ok(expander.inlined)
}

struct Expander<'a> {
    index: &'a GroupingIndex,
    expanded: HashSet<NodeId>,
    in_progress: Vec<(NodeId, String)>,
    inlined: usize,
}

impl Expander<'_> {
    fn expand_children(&mut self, arena: &mut SchemaArena, parent: NodeId, file: &str) -> Result<()> {
        let mut position = 0;
        while position < arena.children(parent).len() {
            let child = arena.children(parent)[position];
            match arena.get(child).keyword {
                Keyword::Uses => {
                    let name = arena.get(child).name().unwrap_or_default().to_string();
                    let grouping = self.index.lookup(file, &name).ok_or_else(|| {
                        SchemaError::UnresolvedGrouping {
                            file: file.to_string(),
                            name: name.clone(),
                        }
                    })?;
                    self.ensure_expanded(arena, grouping, &name)?;

                    let originals = arena.children(grouping).to_vec();
                    let copies: Vec<NodeId> =
                        originals.into_iter().map(|c| arena.deep_copy(c)).collect();
                    trace!(file, grouping = %name, nodes = copies.len(), "inlining uses");

                    let count = copies.len();
                    arena
                        .get_mut(parent)
                        .children
                        .splice(position..=position, copies);
                    position += count;
                    self.inlined += 1;
                }
                Keyword::Grouping => {
                    let name = arena.get(child).name().unwrap_or_default().to_string();
                    self.ensure_expanded(arena, child, &name)?;
                    position += 1;
                }
                _ => {
                    self.expand_children(arena, child, file)?;
                    position += 1;
                }
            }
        }
        Ok(())
    }

    fn ensure_expanded(&mut self, arena: &mut SchemaArena, grouping: NodeId, name: &str) -> Result<()> {
        if self.expanded.contains(&grouping) {
            return Ok(());
        }

        if self.in_progress.iter().any(|(id, _)| *id == grouping) {
            let mut cycle: Vec<&str> = self.in_progress.iter().map(|(_, n)| n.as_str()).collect();
            cycle.push(name);
            return Err(SchemaError::GroupingCycle {
                name: strip_prefix(name).to_string(),
                cycle: cycle.join(" -> "),
            });
        }

        let owner = self
            .index
            .owner
            .get(&grouping)
            .cloned()
            .unwrap_or_default();
        self.in_progress.push((grouping, name.to_string()));
        self.expand_children(arena, grouping, &owner)?;
        self.in_progress.pop();
        self.expanded.insert(grouping);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(arena: &mut SchemaArena, file: &str, body: &str) -> ModuleRoot {
        let content = format!(
            r#"<module name="{file}" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
  <namespace uri="urn:{file}"/>
  <prefix value="{file}"/>
  {body}
</module>"#
        );
        let root = arena.parse(file, &content).unwrap();
        ModuleRoot {
            file: file.to_string(),
            root,
        }
    }

    fn leaf_names(arena: &SchemaArena, id: NodeId) -> Vec<String> {
        arena
            .descendants(id, Keyword::Leaf, &[Keyword::Grouping])
            .into_iter()
            .filter_map(|l| arena.get(l).name().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_inline_grouping_defined_after_use() {
        let mut arena = SchemaArena::new();
        let module = parse(
            &mut arena,
            "a",
            r#"<container name="config">
    <leaf name="first"/>
    <uses name="named"/>
    <leaf name="last"/>
  </container>
  <grouping name="named"><leaf name="name"/><leaf name="description"/></grouping>"#,
        );
        let modules = vec![module.clone()];
        let index = GroupingIndex::collect(&arena, &modules);
        let inlined = inline_groupings(&mut arena, &index, &modules).unwrap();
        assert_eq!(inlined, 1);

        let config = arena.find_child(module.root, Keyword::Container).unwrap();
        assert_eq!(
            leaf_names(&arena, config),
            vec!["first", "name", "description", "last"]
        );
        assert!(arena.find_child(config, Keyword::Uses).is_none());
    }

    #[test]
    fn test_nested_uses_and_prefixed_names() {
        let mut arena = SchemaArena::new();
        let module = parse(
            &mut arena,
            "a",
            r#"<grouping name="outer"><uses name="a:inner"/><leaf name="outer-leaf"/></grouping>
  <grouping name="inner"><leaf name="inner-leaf"/></grouping>
  <container name="config"><uses name="outer"/><uses name="outer"/></container>"#,
        );
        let modules = vec![module.clone()];
        let index = GroupingIndex::collect(&arena, &modules);
        inline_groupings(&mut arena, &index, &modules).unwrap();

        let config = arena.find_child(module.root, Keyword::Container).unwrap();
        assert_eq!(
            leaf_names(&arena, config),
            vec!["inner-leaf", "outer-leaf", "inner-leaf", "outer-leaf"]
        );
        // Two uses sites get distinct copies.
        let children = arena.children(config).to_vec();
        assert_eq!(children.len(), 4);
        assert_ne!(children[0], children[2]);
    }

    #[test]
    fn test_cross_module_grouping() {
        let mut arena = SchemaArena::new();
        let common = parse(&mut arena, "common", r#"<grouping name="named"><leaf name="name"/></grouping>"#);
        let user = parse(
            &mut arena,
            "user",
            r#"<container name="config"><uses name="common:named"/></container>"#,
        );
        let index = GroupingIndex::collect(&arena, &[common, user.clone()]);
        inline_groupings(&mut arena, &index, &[user.clone()]).unwrap();

        let config = arena.find_child(user.root, Keyword::Container).unwrap();
        assert_eq!(leaf_names(&arena, config), vec!["name"]);
    }

    #[test]
    fn test_grouping_cycle_is_an_error() {
        let mut arena = SchemaArena::new();
        let module = parse(
            &mut arena,
            "a",
            r#"<grouping name="ping"><container name="c"><uses name="pong"/></container></grouping>
  <grouping name="pong"><uses name="ping"/></grouping>
  <container name="config"><uses name="ping"/></container>"#,
        );
        let modules = vec![module];
        let index = GroupingIndex::collect(&arena, &modules);
        match inline_groupings(&mut arena, &index, &modules).unwrap_err() {
            SchemaError::GroupingCycle { name, cycle } => {
                assert_eq!(name, "ping");
                assert_eq!(cycle, "ping -> pong -> ping");
            }
            e => panic!("Expected GroupingCycle, got {:?}", e),
        }
    }

    #[test]
    fn test_unresolved_grouping() {
        let mut arena = SchemaArena::new();
        let module = parse(&mut arena, "a", r#"<container name="config"><uses name="missing"/></container>"#);
        let modules = vec![module];
        let index = GroupingIndex::collect(&arena, &modules);
        match inline_groupings(&mut arena, &index, &modules).unwrap_err() {
            SchemaError::UnresolvedGrouping { file, name } => {
                assert_eq!(file, "a");
                assert_eq!(name, "missing");
            }
            e => panic!("Expected UnresolvedGrouping, got {:?}", e),
        }
    }
}
