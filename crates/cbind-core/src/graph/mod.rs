//! Layered topological sorting over name-keyed dependency nodes.
//!
//! Nodes do not point at each other directly. Each node *provides* a set of
//! keys once emitted and *requires* a set of keys to be resolved before it
//! can be emitted. A sort pass repeatedly peels off every node whose
//! requirements are already resolved (one layer), until the graph is empty
//! or no node can make progress.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::trace;

/// Errors raised by the sorter's internal consistency checks.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("sorting lost nodes: expected {expected}, found {found}")]
    LostNodes { expected: usize, found: usize },
}

/// A sortable unit carrying arbitrary payload data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, T> {
    /// Keys this node provides once emitted.
    pub keys: BTreeSet<K>,
    /// Keys that must be resolved before this node can be emitted.
    pub dependencies: BTreeSet<K>,
    pub data: T,
}

impl<K: Ord, T> Node<K, T> {
    pub fn new(keys: BTreeSet<K>, dependencies: BTreeSet<K>, data: T) -> Self {
        Self {
            keys,
            dependencies,
            data,
        }
    }

    /// Whether every dependency is in `resolved`.
    pub fn is_ready(&self, resolved: &BTreeSet<K>) -> bool {
        self.dependencies.is_subset(resolved)
    }
}

/// Result of one sort pass.
#[derive(Debug)]
pub enum SortOutcome<K, T> {
    /// Every node was placed.
    Sorted { layers: Vec<Vec<Node<K, T>>> },
    /// Some nodes form (or depend on) a cycle and could not be placed.
    CircularDependency {
        layers: Vec<Vec<Node<K, T>>>,
        remaining: Vec<Node<K, T>>,
    },
}

impl<K, T> SortOutcome<K, T> {
    /// Layers placed by this pass, in emission order.
    pub fn layers(&self) -> &[Vec<Node<K, T>>] {
        match self {
            SortOutcome::Sorted { layers } | SortOutcome::CircularDependency { layers, .. } => {
                layers
            }
        }
    }

    pub fn is_sorted(&self) -> bool {
        matches!(self, SortOutcome::Sorted { .. })
    }

    /// Split into placed layers and unplaced nodes (empty when sorted).
    pub fn into_parts(self) -> (Vec<Vec<Node<K, T>>>, Vec<Node<K, T>>) {
        match self {
            SortOutcome::Sorted { layers } => (layers, Vec::new()),
            SortOutcome::CircularDependency { layers, remaining } => (layers, remaining),
        }
    }
}

/// Run one layered Kahn pass.
///
/// `resolved` holds keys that are available before any node is emitted.
/// Within a layer, nodes keep their relative input order.
pub fn sort_layers<K, T>(
    nodes: Vec<Node<K, T>>,
    resolved: &BTreeSet<K>,
) -> Result<SortOutcome<K, T>, GraphError>
where
    K: Ord + Clone,
{
    let expected = nodes.len();
    let mut resolved = resolved.clone();
    let mut remaining = nodes;
    let mut layers: Vec<Vec<Node<K, T>>> = Vec::new();

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<_>, Vec<_>) =
            remaining.into_iter().partition(|node| node.is_ready(&resolved));

        if ready.is_empty() {
            check_count(expected, &layers, blocked.len())?;
            trace!(
                layers = layers.len(),
                blocked = blocked.len(),
                "sort pass stuck on a cycle"
            );
            return Ok(SortOutcome::CircularDependency {
                layers,
                remaining: blocked,
            });
        }

        for node in &ready {
            resolved.extend(node.keys.iter().cloned());
        }
        trace!(layer = layers.len(), size = ready.len(), "layer resolved");
        layers.push(ready);
        remaining = blocked;
    }

    check_count(expected, &layers, 0)?;
    Ok(SortOutcome::Sorted { layers })
}

fn check_count<K, T>(
    expected: usize,
    layers: &[Vec<Node<K, T>>],
    remaining: usize,
) -> Result<(), GraphError> {
    let found = layers.iter().map(Vec::len).sum::<usize>() + remaining;
    if found != expected {
        return Err(GraphError::LostNodes { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(keys: &[&'static str], deps: &[&'static str]) -> Node<&'static str, &'static str> {
        Node::new(
            keys.iter().copied().collect(),
            deps.iter().copied().collect(),
            keys[0],
        )
    }

    fn order(outcome: &SortOutcome<&'static str, &'static str>) -> Vec<Vec<&'static str>> {
        outcome
            .layers()
            .iter()
            .map(|layer| layer.iter().map(|n| n.data).collect())
            .collect()
    }

    #[test]
    fn empty_graph_is_sorted() {
        let outcome = sort_layers::<&str, &str>(Vec::new(), &BTreeSet::new()).unwrap();
        assert!(outcome.is_sorted());
        assert!(outcome.layers().is_empty());
    }

    #[test]
    fn chain_sorts_into_layers() {
        let nodes = vec![node(&["c"], &["b"]), node(&["b"], &["a"]), node(&["a"], &[])];
        let outcome = sort_layers(nodes, &BTreeSet::new()).unwrap();
        assert!(outcome.is_sorted());
        assert_eq!(order(&outcome), vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn independent_nodes_share_a_layer_in_input_order() {
        let nodes = vec![node(&["y"], &[]), node(&["x"], &[]), node(&["z"], &["x", "y"])];
        let outcome = sort_layers(nodes, &BTreeSet::new()).unwrap();
        assert_eq!(order(&outcome), vec![vec!["y", "x"], vec!["z"]]);
    }

    #[test]
    fn pre_resolved_keys_satisfy_dependencies() {
        let nodes = vec![node(&["a"], &["int"])];
        let resolved: BTreeSet<&str> = ["int"].into_iter().collect();
        let outcome = sort_layers(nodes, &resolved).unwrap();
        assert!(outcome.is_sorted());
    }

    #[test]
    fn cycle_reports_remaining_nodes() {
        let nodes = vec![
            node(&["root"], &[]),
            node(&["a"], &["b"]),
            node(&["b"], &["a"]),
        ];
        let outcome = sort_layers(nodes, &BTreeSet::new()).unwrap();
        assert!(!outcome.is_sorted());
        assert_eq!(order(&outcome), vec![vec!["root"]]);
        let (_, remaining) = outcome.into_parts();
        let names: Vec<_> = remaining.iter().map(|n| n.data).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn multi_key_node_resolves_all_keys() {
        let nodes = vec![node(&["s", "__s"], &[]), node(&["t"], &["__s"])];
        let outcome = sort_layers(nodes, &BTreeSet::new()).unwrap();
        assert_eq!(order(&outcome), vec![vec!["s"], vec!["t"]]);
    }
}
