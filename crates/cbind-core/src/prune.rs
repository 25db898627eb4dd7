//! Reachability pruning.
//!
//! Drops every container, enum, and alias that the public interface (global
//! fields and functions) does not transitively need. Edges are only known
//! once a declaration is kept, so this iterates to a fixpoint rather than
//! walking a precomputed graph.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::module::{Container, Module, TypeAlias};
use crate::types::Type;

/// Remove declarations not reachable from the module's fields and methods.
///
/// Names in `externally_known` (primitives and other types resolved
/// outside the module) are never looked up. Fails with
/// [`CoreError::CleanupStalled`] if some needed name has no declaration.
pub fn prune(module: &Module, externally_known: &BTreeSet<String>) -> Result<Module> {
    let mut needed: BTreeSet<String> = BTreeSet::new();
    for ty in module.interface_types() {
        needed.extend(ty.referenced_names());
    }
    needed.retain(|name| !externally_known.contains(name));

    let mut known: BTreeSet<String> = BTreeSet::new();
    let mut previous: Option<BTreeSet<String>> = None;
    let mut iteration = 0usize;

    while !needed.is_empty() {
        if previous.as_ref() == Some(&needed) {
            return Err(CoreError::CleanupStalled {
                unresolved: needed.into_iter().collect(),
            });
        }
        previous = Some(needed.clone());
        iteration += 1;

        let new_containers: Vec<&Container> = module
            .containers
            .iter()
            .filter(|c| c.name.as_ref().is_some_and(|n| needed.contains(n)))
            .collect();
        let new_aliases: Vec<&TypeAlias> = module
            .aliases
            .iter()
            .filter(|a| needed.contains(&a.name))
            .collect();

        let mut found: BTreeSet<String> = BTreeSet::new();
        found.extend(new_containers.iter().filter_map(|c| c.name.clone()));
        found.extend(
            module
                .enums
                .iter()
                .filter_map(|e| e.name.clone())
                .filter(|n| needed.contains(n)),
        );
        found.extend(new_aliases.iter().map(|a| a.name.clone()));
        known.extend(found.iter().cloned());

        let mut referenced: BTreeSet<String> = BTreeSet::new();
        for container in &new_containers {
            collect_container_references(container, &mut referenced);
        }
        for alias in &new_aliases {
            referenced.extend(alias.target.referenced_names());
        }

        debug!(
            iteration,
            found = found.len(),
            referenced = referenced.len(),
            "pruning pass"
        );

        needed = needed
            .difference(&found)
            .cloned()
            .chain(referenced)
            .filter(|name| !known.contains(name) && !externally_known.contains(name))
            .collect();
    }

    let kept = Module {
        containers: module
            .containers
            .iter()
            .filter(|c| c.name.as_ref().is_some_and(|n| known.contains(n)))
            .cloned()
            .collect(),
        enums: module
            .enums
            .iter()
            .filter(|e| e.name.as_ref().is_some_and(|n| known.contains(n)))
            .cloned()
            .collect(),
        aliases: module
            .aliases
            .iter()
            .filter(|a| known.contains(&a.name))
            .cloned()
            .collect(),
        fields: module.fields.clone(),
        methods: module.methods.clone(),
    };

    info!(
        before = module.declaration_count(),
        after = kept.declaration_count(),
        iterations = iteration,
        "pruned module"
    );
    Ok(kept)
}

/// Collect names referenced by a container's properties and, recursively,
/// by its inline containers.
///
/// A property referring to one of the container's own inline containers is
/// skipped: that name is satisfied locally once flattened.
fn collect_container_references(container: &Container, out: &mut BTreeSet<String>) {
    let inner_names = container.inner_names();
    for property in &container.properties {
        if let Type::Inline {
            name: Some(name), ..
        } = property.ty.base()
        {
            if inner_names.contains(name.as_str()) {
                continue;
            }
        }
        out.extend(property.ty.referenced_names());
    }
    for inner in &container.inner {
        collect_container_references(inner, out);
    }
}
