//! TCP accept loop.
//!
//! Binds the listener, spawns one session task per accepted connection,
//! and hands every session the same shared graph.

use crate::{ServerError, Session, SharedGraph};
use graphline_graph::GraphStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 50000;

/// How long a client may stay silent before its session is dropped.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
    /// Per-session inactivity timeout.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            idle_timeout: IDLE_TIMEOUT,
        }
    }
}

/// The graphline TCP server.
pub struct GraphServer {
    config: ServerConfig,
    graph: SharedGraph,
}

impl GraphServer {
    /// Creates a server with an empty graph.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_graph(config, GraphStore::new())
    }

    /// Creates a server around an existing graph.
    pub fn with_graph(config: ServerConfig, graph: GraphStore) -> Self {
        Self {
            config,
            graph: Arc::new(RwLock::new(graph)),
        }
    }

    /// Returns a handle to the shared graph.
    pub fn graph(&self) -> SharedGraph {
        self.graph.clone()
    }

    /// Binds the configured address and accepts connections forever.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.addr,
                source,
            })?;
        info!("graphline listening on {}", self.config.addr);
        self.accept_loop(listener).await
    }

    /// Accepts connections on an already-bound listener.
    ///
    /// Split out from [`run`](Self::run) so embedders and tests can bind an
    /// ephemeral port first.
    pub async fn accept_loop(&self, listener: TcpListener) -> Result<(), ServerError> {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("new connection from {addr}");
                    let session = Session::new(self.graph.clone(), self.config.idle_timeout);
                    tokio::spawn(session.run(stream));
                }
                Err(err) => {
                    error!("accept error: {err}");
                }
            }
        }
    }
}
