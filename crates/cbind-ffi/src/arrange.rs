//! Cycle-breaking emission order.
//!
//! Elements are sorted in layers. When a pass gets stuck on a cycle, the
//! first fused container among the stuck elements is split into a forward
//! declaration and a layout definition, the graph is rebuilt over what is
//! left, and sorting resumes.

use std::collections::BTreeSet;

use cbind_core::graph::sort_layers;
use tracing::{debug, info};

use crate::dependency::{DependencyGraphBuilder, DependencyKey};
use crate::element::Element;
use crate::error::{FfiError, Result};

/// Elements in emission order.
#[derive(Debug, Clone)]
pub struct Arrangement {
    pub elements: Vec<Element>,
    /// Number of containers split to break cycles.
    pub splits: usize,
}

/// Order `elements` so each one only refers to names provided by earlier
/// elements or by `external`.
pub fn arrange(elements: Vec<Element>, external: &BTreeSet<String>) -> Result<Arrangement> {
    let original = elements.len();
    let catalogue = elements.clone();
    let mut resolved: BTreeSet<DependencyKey> = external
        .iter()
        .flat_map(|name| DependencyKey::resolved_external(name))
        .collect();

    let mut ordered = Vec::with_capacity(original);
    let mut pending = elements;
    let mut splits = 0;

    loop {
        let nodes = DependencyGraphBuilder::new(&catalogue, &resolved).build(pending)?;
        let (layers, remaining) = sort_layers(nodes, &resolved)?.into_parts();
        for node in layers.into_iter().flatten() {
            resolved.extend(node.keys);
            ordered.push(node.data);
        }
        if remaining.is_empty() {
            break;
        }

        pending = remaining.into_iter().map(|node| node.data).collect();
        let Some(index) = pending.iter().position(Element::is_splittable) else {
            return Err(FfiError::UnresolvableCycle {
                remaining: pending.iter().map(|e| e.name().to_string()).collect(),
            });
        };
        let (declaration, definition) =
            pending
                .remove(index)
                .split()
                .map_err(|element| FfiError::Inconsistent {
                    detail: format!("'{}' is splittable but did not split", element.name()),
                })?;
        debug!(container = declaration.name(), stuck = pending.len() + 1, "splitting container");
        pending.splice(index..index, [declaration, definition]);
        splits += 1;
    }

    if ordered.len() != original + splits {
        return Err(FfiError::Inconsistent {
            detail: format!(
                "arranged {} elements from {original} with {splits} splits",
                ordered.len()
            ),
        });
    }

    info!(elements = ordered.len(), splits, "arranged elements");
    Ok(Arrangement {
        elements: ordered,
        splits,
    })
}
