//! Core graph store.
//!
//! The GraphStore wraps petgraph and adds a name index plus the cached
//! all-pairs distance matrix. It's the central data structure every
//! session works against.

use crate::matrix::DistanceMatrix;
use crate::path::{self, Distance};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;

/// The shared weighted digraph.
///
/// Node identity is the name alone; an edge is identified by its ordered
/// `(from, to)` pair, so at most one edge exists per pair. Stable indices
/// keep lookups valid across removals.
#[derive(Debug, Default)]
pub struct GraphStore {
    /// The underlying petgraph graph; node weights are the names.
    graph: StableDiGraph<String, u64>,

    /// Maps names to graph node indexes.
    names: HashMap<String, NodeIndex>,

    /// All-pairs distance matrix, absent until first proximity query.
    cache: Option<DistanceMatrix>,

    /// Set by every structural mutation; cleared on rebuild.
    cache_dirty: bool,
}

impl GraphStore {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            names: HashMap::new(),
            cache: None,
            cache_dirty: false,
        }
    }

    /// Inserts a node. Returns false if the name is already taken.
    pub fn add_node(&mut self, name: &str) -> bool {
        if self.names.contains_key(name) {
            return false;
        }
        let index = self.graph.add_node(name.to_string());
        self.names.insert(name.to_string(), index);
        self.cache_dirty = true;
        true
    }

    /// Inserts or improves the edge `(from, to)`.
    ///
    /// Returns false iff either endpoint is missing. An existing edge keeps
    /// the minimum observed weight: a strictly lower `weight` replaces it,
    /// anything else is an idempotent success with no state change.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: u64) -> bool {
        let (Some(&a), Some(&b)) = (self.names.get(from), self.names.get(to)) else {
            return false;
        };
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if let Some(current) = self.graph.edge_weight_mut(edge) {
                    if weight < *current {
                        *current = weight;
                        self.cache_dirty = true;
                    }
                }
            }
            None => {
                self.graph.add_edge(a, b, weight);
                self.cache_dirty = true;
            }
        }
        true
    }

    /// Removes a node and every edge touching it, inbound included.
    /// Returns false if the name is unknown.
    pub fn remove_node(&mut self, name: &str) -> bool {
        match self.names.remove(name) {
            Some(index) => {
                self.graph.remove_node(index);
                self.cache_dirty = true;
                true
            }
            None => false,
        }
    }

    /// Removes the edge `(from, to)` if present.
    ///
    /// Returns false iff either endpoint is missing; removing an edge that
    /// does not exist between two known nodes is a success.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.names.get(from), self.names.get(to)) else {
            return false;
        };
        if let Some(edge) = self.graph.find_edge(a, b) {
            self.graph.remove_edge(edge);
        }
        self.cache_dirty = true;
        true
    }

    /// Cheapest directed path cost from `from` to `to`.
    ///
    /// `None` iff either endpoint is missing; otherwise the Dijkstra
    /// answer, with [`Distance::Unreachable`] for a disconnected pair.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Distance> {
        let (Some(&a), Some(&b)) = (self.names.get(from), self.names.get(to)) else {
            return None;
        };
        Some(path::dijkstra(&self.graph, a, b))
    }

    /// Names of all nodes strictly closer than `limit` to `from`, walking
    /// outgoing paths, excluding `from` itself, sorted ascending.
    ///
    /// `None` iff `from` is missing; an empty vec means the node exists but
    /// nothing is in range. Rebuilds the distance matrix when stale.
    pub fn closer_than(&mut self, limit: u64, from: &str) -> Option<Vec<String>> {
        self.ensure_cache();
        self.closer_than_cached(limit, from)
    }

    /// Read-only variant of [`closer_than`](Self::closer_than) for callers
    /// that checked [`cache_ready`](Self::cache_ready) first; answers from
    /// the cached matrix without rebuilding.
    pub fn closer_than_cached(&self, limit: u64, from: &str) -> Option<Vec<String>> {
        debug_assert!(self.cache_ready(), "closer_than_cached needs a warm cache");
        let &start = self.names.get(from)?;
        let cache = self.cache.as_ref()?;

        let mut result: Vec<String> = cache
            .nodes()
            .iter()
            .filter(|&&node| node != start && cache.distance(start, node) < limit)
            .filter_map(|&node| self.graph.node_weight(node).cloned())
            .collect();
        result.sort();
        Some(result)
    }

    /// Whether the cached matrix still matches the topology.
    pub fn cache_ready(&self) -> bool {
        self.cache.is_some() && !self.cache_dirty
    }

    /// Rebuilds the distance matrix if it is stale or was never computed.
    pub fn ensure_cache(&mut self) {
        if self.cache_ready() {
            return;
        }
        self.cache = Some(DistanceMatrix::build(&self.graph));
        self.cache_dirty = false;
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node names, unordered.
    pub fn node_names(&self) -> Vec<String> {
        self.graph.node_weights().cloned().collect()
    }

    /// All edges as `(from, to, weight)` triples, unordered.
    pub fn edges(&self) -> Vec<(String, String, u64)> {
        self.graph
            .edge_references()
            .filter_map(|edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some((from.clone(), to.clone(), *edge.weight()))
            })
            .collect()
    }

    /// Outgoing edges of `name` as `(to, weight)` pairs, or `None` if the
    /// node is unknown.
    pub fn outgoing(&self, name: &str) -> Option<Vec<(String, u64)>> {
        let &index = self.names.get(name)?;
        Some(
            self.graph
                .edges(index)
                .filter_map(|edge| {
                    let to = self.graph.node_weight(edge.target())?;
                    Some((to.clone(), *edge.weight()))
                })
                .collect(),
        )
    }

    /// Stored weight of the edge `(from, to)`, if it exists.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u64> {
        let (&a, &b) = (self.names.get(from)?, self.names.get(to)?);
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }
}
