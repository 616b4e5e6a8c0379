//! Identity staging
//!
//! Top-level `identity` statements are recorded against each of their
//! `base` names (prefix stripped) together with the declaring module. The
//! legal values of an `identityref` leaf are every identity derived from
//! its base, directly or through intermediate identities.

use crate::model::Namespace;
use crate::strip_prefix;
use crate::yin::{Keyword, NodeId, SchemaArena};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

#[derive(Debug, Clone)]
struct DerivedIdentity {
    name: String,
    module: Namespace,
}

/// Identities by base name
#[derive(Debug, Default)]
pub struct IdentityIndex {
    by_base: HashMap<String, Vec<DerivedIdentity>>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the top-level identities of one module
    pub fn stage(&mut self, arena: &SchemaArena, module_root: NodeId, module: &Namespace) {
        for identity in arena.children_with(module_root, Keyword::Identity) {
            let Some(name) = arena.get(identity).name() else {
                continue;
            };
            for base in arena.children_with(identity, Keyword::Base) {
                let Some(base_name) = arena.get(base).name() else {
                    continue;
                };
                trace!(identity = name, base = base_name, module = %module.prefix, "staging identity");
                self.by_base
                    .entry(strip_prefix(base_name).to_string())
                    .or_default()
                    .push(DerivedIdentity {
                        name: name.to_string(),
                        module: module.clone(),
                    });
            }
        }
    }

    /// Number of distinct bases with at least one derived identity
    pub fn bases(&self) -> usize {
        self.by_base.len()
    }

    /// All identities derived from `base`, mapped to their declaring
    /// module. Later staging wins when a name is declared twice.
    pub fn resolve(&self, base: &str) -> BTreeMap<String, Namespace> {
        let mut values = BTreeMap::new();
        let mut visited = HashSet::new();
        let mut pending = vec![strip_prefix(base).to_string()];

        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(derived) = self.by_base.get(&current) else {
                continue;
            };
            for identity in derived {
                values.insert(identity.name.clone(), identity.module.clone());
                pending.push(identity.name.clone());
            }
        }
        values
    }
}
