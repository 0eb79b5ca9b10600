//! Graphline Server - line-protocol access to the shared graph
//!
//! This crate implements the conversational side of graphline: a TCP
//! listener that speaks a newline-delimited plain-text protocol, one
//! session task per connection, all sessions sharing a single
//! [`GraphStore`](graphline_graph::GraphStore) behind a readers-writer
//! lock.
//!
//! A conversation opens with the server greeting
//! (`HI, I AM <session-id>`), expects the client to greet back, then
//! loops over graph commands until a farewell, thirty silent seconds,
//! or the connection drops.

use graphline_graph::GraphStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared graph state across sessions.
pub type SharedGraph = Arc<RwLock<GraphStore>>;

mod error;
pub mod protocol;
mod server;
mod session;

pub use error::ServerError;
pub use server::{GraphServer, ServerConfig, DEFAULT_PORT};
pub use session::Session;
