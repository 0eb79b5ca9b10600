//! All-pairs distance matrix.
//!
//! Built by Floyd–Warshall over a dense re-indexing of the live nodes.
//! The matrix is a snapshot: the store owns the dirty flag that says
//! whether it still matches the topology.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;

/// Matrix sentinel for "no directed path".
pub(crate) const INF: u64 = u64::MAX;

/// Dense `N×N` shortest-distance matrix over the nodes present at build time.
#[derive(Debug)]
pub(crate) struct DistanceMatrix {
    /// Dense index -> stable node index, in the order captured at build time.
    order: Vec<NodeIndex>,
    /// Stable node index -> dense index.
    index: HashMap<NodeIndex, usize>,
    /// Row-major distances, `INF` off-diagonal until proven closer.
    dist: Vec<u64>,
    n: usize,
}

impl DistanceMatrix {
    pub(crate) fn build(graph: &StableDiGraph<String, u64>) -> Self {
        let order: Vec<NodeIndex> = graph.node_indices().collect();
        let n = order.len();
        let index: HashMap<NodeIndex, usize> =
            order.iter().enumerate().map(|(i, &node)| (node, i)).collect();

        let mut dist = vec![INF; n * n];
        for i in 0..n {
            dist[i * n + i] = 0;
        }
        for edge in graph.edge_references() {
            let i = index[&edge.source()];
            let j = index[&edge.target()];
            let weight = *edge.weight();
            if weight < dist[i * n + j] {
                dist[i * n + j] = weight;
            }
        }

        for k in 0..n {
            for i in 0..n {
                let via = dist[i * n + k];
                if via == INF {
                    continue;
                }
                for j in 0..n {
                    let candidate = via.saturating_add(dist[k * n + j]);
                    if candidate < dist[i * n + j] {
                        dist[i * n + j] = candidate;
                    }
                }
            }
        }

        Self {
            order,
            index,
            dist,
            n,
        }
    }

    /// Distance from `from` to `to`; `INF` when either node postdates the
    /// snapshot or no path exists.
    pub(crate) fn distance(&self, from: NodeIndex, to: NodeIndex) -> u64 {
        match (self.index.get(&from), self.index.get(&to)) {
            (Some(&i), Some(&j)) => self.dist[i * self.n + j],
            _ => INF,
        }
    }

    /// The nodes covered by this snapshot.
    pub(crate) fn nodes(&self) -> &[NodeIndex] {
        &self.order
    }
}
