//! Error types for graphline-server.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can take the whole server down.
///
/// Per-session I/O failures are not here: they end the one session, get
/// logged, and never propagate to the listener or to other sessions.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address the listener was asked to bind.
        addr: SocketAddr,
        /// Underlying OS error.
        source: std::io::Error,
    },
}
