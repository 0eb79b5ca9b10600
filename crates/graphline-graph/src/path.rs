//! Single-source shortest path.
//!
//! Binary-heap Dijkstra over the store's petgraph representation. Decrease-key
//! is handled by lazy deletion: an improved distance pushes a duplicate heap
//! entry and stale pops are skipped against the distance map.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Outcome of a shortest-path query between two nodes that both exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// Total weight of the cheapest directed path.
    Finite(u64),
    /// No directed path connects the pair.
    Unreachable,
}

impl Distance {
    /// Returns the finite cost, if any.
    pub fn finite(self) -> Option<u64> {
        match self {
            Distance::Finite(cost) => Some(cost),
            Distance::Unreachable => None,
        }
    }
}

/// Runs Dijkstra from `from`, relaxing only forward edges.
///
/// Weights are non-negative by construction, which is what makes the
/// algorithm correct here. The search runs until the queue drains rather
/// than stopping at `to`, so the distance map is complete for the
/// reachable component.
pub(crate) fn dijkstra(
    graph: &StableDiGraph<String, u64>,
    from: NodeIndex,
    to: NodeIndex,
) -> Distance {
    let mut dist: HashMap<NodeIndex, u64> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u64, NodeIndex)>> = BinaryHeap::new();

    dist.insert(from, 0);
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Stale entry from a superseded tentative distance.
        if cost > dist.get(&node).copied().unwrap_or(u64::MAX) {
            continue;
        }
        for edge in graph.edges(node) {
            let next = edge.target();
            let candidate = cost.saturating_add(*edge.weight());
            if candidate < dist.get(&next).copied().unwrap_or(u64::MAX) {
                dist.insert(next, candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }

    match dist.get(&to) {
        Some(&cost) => Distance::Finite(cost),
        None => Distance::Unreachable,
    }
}
