//! Graphline Graph - the shared graph store
//!
//! This crate holds the in-memory, weighted, directed graph that every
//! client session reads and mutates. It provides fast name-based lookups,
//! Dijkstra shortest paths, and a cached all-pairs distance matrix for
//! proximity queries.
//!
//! # Architecture
//!
//! The store wraps petgraph internally with additional state for:
//! - Name-based lookups (node identity is the name alone)
//! - A lazily rebuilt Floyd–Warshall distance matrix, invalidated by a
//!   dirty flag on every structural change
//!
//! The store itself is synchronous and lock-free; sharing it between
//! connections is the server crate's concern.
//!
//! # Example
//!
//! ```
//! use graphline_graph::{Distance, GraphStore};
//!
//! let mut graph = GraphStore::new();
//! graph.add_node("a");
//! graph.add_node("b");
//! graph.add_edge("a", "b", 4);
//!
//! assert_eq!(graph.shortest_path("a", "b"), Some(Distance::Finite(4)));
//! ```

mod graph;
mod matrix;
mod path;

pub use graph::GraphStore;
pub use path::Distance;
