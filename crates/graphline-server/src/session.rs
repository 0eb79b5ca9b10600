//! Per-connection session: a three-state conversation over one socket.
//!
//! The server speaks first with `HI, I AM <session-id>`. A session then
//! waits for the client greeting before graph commands are accepted,
//! loops over one command per line, and ends on farewell, end of input,
//! an I/O error, or thirty silent seconds. Whatever the exit path, the
//! client gets a timed `BYE` line on a best-effort basis.

use crate::protocol::{self, messages, Command};
use crate::SharedGraph;
use graphline_graph::Distance;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitGreeting,
    Conversing,
    Terminating,
}

/// One client conversation.
pub struct Session {
    id: String,
    client_id: Option<String>,
    started: Instant,
    graph: SharedGraph,
    idle_timeout: Duration,
}

impl Session {
    /// Creates a session with a fresh server-generated id.
    pub fn new(graph: SharedGraph, idle_timeout: Duration) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: None,
            started: Instant::now(),
            graph,
            idle_timeout,
        }
    }

    /// The server-generated session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drives the conversation until it terminates.
    ///
    /// Transport failures end this session only: they are logged here and
    /// never surface to the listener or to other sessions.
    pub async fn run(mut self, stream: TcpStream) {
        let (read_half, mut writer) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        info!(session = %self.id, "session active");
        if let Err(err) = send_line(&mut writer, &messages::greeting(&self.id)).await {
            error!(session = %self.id, %err, "greeting write failed");
            self.finish(&mut writer).await;
            return;
        }

        let mut state = SessionState::AwaitGreeting;
        while state != SessionState::Terminating {
            // The idle clock restarts on every successful read.
            let line = match timeout(self.idle_timeout, lines.next_line()).await {
                Err(_) => {
                    warn!(session = %self.id, "session finished due to inactivity");
                    break;
                }
                Ok(Err(err)) => {
                    error!(session = %self.id, %err, "read failed");
                    break;
                }
                Ok(Ok(None)) => {
                    debug!(session = %self.id, "client closed the connection");
                    break;
                }
                Ok(Ok(Some(line))) => line,
            };

            let reply = match state {
                SessionState::AwaitGreeting => self.greet(&line, &mut state),
                SessionState::Conversing => self.converse(&line, &mut state).await,
                SessionState::Terminating => None,
            };
            if let Some(reply) = reply {
                if let Err(err) = send_line(&mut writer, &reply).await {
                    error!(session = %self.id, %err, "write failed");
                    break;
                }
            }
        }

        self.finish(&mut writer).await;
    }

    /// Handles one line while waiting for the client to introduce itself.
    fn greet(&mut self, line: &str, state: &mut SessionState) -> Option<String> {
        match protocol::parse(line) {
            Some(Command::Greeting { client_id }) => {
                info!(session = %self.id, client = %client_id, "received greeting");
                let reply = messages::greeting_reply(&client_id);
                self.client_id = Some(client_id);
                *state = SessionState::Conversing;
                Some(reply)
            }
            Some(Command::Farewell) => {
                *state = SessionState::Terminating;
                None
            }
            // Graph commands are not accepted before the greeting.
            _ => {
                warn!(session = %self.id, line, "unrecognised line");
                Some(messages::SORRY.to_string())
            }
        }
    }

    /// Handles one line of an established conversation.
    async fn converse(&mut self, line: &str, state: &mut SessionState) -> Option<String> {
        match protocol::parse(line) {
            Some(Command::Farewell) => {
                *state = SessionState::Terminating;
                None
            }
            // A second greeting is not part of a conversation.
            Some(Command::Greeting { .. }) | None => {
                warn!(session = %self.id, line, "unrecognised line");
                Some(messages::SORRY.to_string())
            }
            Some(command) => Some(self.execute(command).await),
        }
    }

    /// Runs one graph command against the shared store.
    async fn execute(&self, command: Command) -> String {
        match command {
            Command::AddNode { name } => {
                info!(session = %self.id, node = %name, "adding node");
                if self.graph.write().await.add_node(&name) {
                    messages::NODE_ADDED.to_string()
                } else {
                    warn!(session = %self.id, node = %name, "node already exists");
                    messages::NODE_EXISTS.to_string()
                }
            }
            Command::AddEdge { from, to, weight } => {
                info!(session = %self.id, %from, %to, weight, "adding edge");
                if self.graph.write().await.add_edge(&from, &to, weight) {
                    messages::EDGE_ADDED.to_string()
                } else {
                    warn!(session = %self.id, %from, %to, "edge endpoint not found");
                    messages::NODE_NOT_FOUND.to_string()
                }
            }
            Command::RemoveNode { name } => {
                info!(session = %self.id, node = %name, "removing node");
                if self.graph.write().await.remove_node(&name) {
                    messages::NODE_REMOVED.to_string()
                } else {
                    warn!(session = %self.id, node = %name, "node not found");
                    messages::NODE_NOT_FOUND.to_string()
                }
            }
            Command::RemoveEdge { from, to } => {
                info!(session = %self.id, %from, %to, "removing edge");
                if self.graph.write().await.remove_edge(&from, &to) {
                    messages::EDGE_REMOVED.to_string()
                } else {
                    warn!(session = %self.id, %from, %to, "edge endpoint not found");
                    messages::NODE_NOT_FOUND.to_string()
                }
            }
            Command::ShortestPath { from, to } => {
                info!(session = %self.id, %from, %to, "shortest path query");
                match self.graph.read().await.shortest_path(&from, &to) {
                    None => {
                        warn!(session = %self.id, %from, %to, "path endpoint not found");
                        messages::NODE_NOT_FOUND.to_string()
                    }
                    Some(Distance::Unreachable) => messages::UNREACHABLE.to_string(),
                    Some(Distance::Finite(cost)) => cost.to_string(),
                }
            }
            Command::CloserThan { limit, from } => {
                info!(session = %self.id, limit, %from, "proximity query");
                let cached = {
                    let graph = self.graph.read().await;
                    if graph.cache_ready() {
                        Some(graph.closer_than_cached(limit, &from))
                    } else {
                        None
                    }
                };
                let result = match cached {
                    Some(result) => result,
                    // Stale matrix: upgrade to the write lock and rebuild.
                    // closer_than re-checks the dirty flag under the lock,
                    // so a racing rebuild is not repeated.
                    None => self.graph.write().await.closer_than(limit, &from),
                };
                match result {
                    None => {
                        warn!(session = %self.id, %from, "node not found");
                        messages::NODE_NOT_FOUND.to_string()
                    }
                    Some(names) => names.join(","),
                }
            }
            // Greeting and farewell never reach here; converse() intercepts
            // them first.
            Command::Greeting { .. } | Command::Farewell => messages::SORRY.to_string(),
        }
    }

    /// Emits the timed farewell and lets the socket drop.
    async fn finish(&self, writer: &mut OwnedWriteHalf) {
        let elapsed_ms = self.started.elapsed().as_millis();
        let client_id = self.client_id.as_deref().unwrap_or("");
        info!(session = %self.id, client = %client_id, elapsed_ms, "session finished");
        // Best effort: the peer may already be gone.
        let _ = send_line(writer, &messages::farewell(client_id, elapsed_ms)).await;
    }
}

async fn send_line(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await
}
