//! End-to-end tests: real TCP connections against a running accept loop.

use graphline_server::{GraphServer, ServerConfig, SharedGraph};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const CLIENT: &str = "11111111-2222-3333-4444-555555555555";

/// Binds an ephemeral port and runs the accept loop in the background.
async fn start_server(idle_timeout: Duration) -> (SocketAddr, SharedGraph) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GraphServer::new(ServerConfig { addr, idle_timeout });
    let graph = server.graph();
    tokio::spawn(async move {
        let _ = server.accept_loop(listener).await;
    });
    (addr, graph)
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    /// Connects, checks the banner, and completes the greeting handshake.
    async fn greeted(addr: SocketAddr) -> Self {
        let mut client = Self::connect(addr).await;
        let banner = client.recv().await.unwrap();
        let session_id = banner.strip_prefix("HI, I AM ").expect("banner");
        assert!(uuid::Uuid::parse_str(session_id).is_ok());
        client.send(&format!("HI, I AM {CLIENT}")).await;
        assert_eq!(client.recv().await.unwrap(), format!("HI {CLIENT}"));
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> Option<String> {
        timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("no reply within 5s")
            .unwrap()
    }

    async fn roundtrip(&mut self, line: &str) -> String {
        self.send(line).await;
        self.recv().await.unwrap()
    }
}

fn assert_farewell(line: &str, client_id: &str) {
    let prefix = format!("BYE {client_id}, WE SPOKE FOR ");
    let rest = line.strip_prefix(&prefix).unwrap_or_else(|| {
        panic!("unexpected farewell: {line:?}");
    });
    let ms = rest.strip_suffix(" MS").expect("farewell ends in MS");
    ms.parse::<u128>().expect("elapsed is a number");
}

#[tokio::test]
async fn server_speaks_first_and_says_goodbye() {
    let (addr, _graph) = start_server(Duration::from_secs(30)).await;
    let mut client = Client::greeted(addr).await;

    client.send("BYE MATE!").await;
    let farewell = client.recv().await.unwrap();
    assert_farewell(&farewell, CLIENT);

    // The server closes the connection after the farewell.
    assert_eq!(client.recv().await, None);
}

#[tokio::test]
async fn farewell_before_greeting_has_empty_client_id() {
    let (addr, _graph) = start_server(Duration::from_secs(30)).await;
    let mut client = Client::connect(addr).await;
    client.recv().await.unwrap(); // banner

    client.send("BYE MATE!").await;
    let farewell = client.recv().await.unwrap();
    assert_farewell(&farewell, "");
}

#[tokio::test]
async fn graph_commands_round_trip() {
    let (addr, _graph) = start_server(Duration::from_secs(30)).await;
    let mut client = Client::greeted(addr).await;

    assert_eq!(client.roundtrip("ADD NODE A").await, "NODE ADDED");
    assert_eq!(
        client.roundtrip("ADD NODE A").await,
        "ERROR: NODE ALREADY EXISTS"
    );
    assert_eq!(client.roundtrip("ADD NODE B").await, "NODE ADDED");
    assert_eq!(client.roundtrip("ADD EDGE A B 5").await, "EDGE ADDED");

    // Re-adding with a worse weight changes nothing; a better one wins.
    assert_eq!(client.roundtrip("ADD EDGE A B 7").await, "EDGE ADDED");
    assert_eq!(client.roundtrip("SHORTEST PATH A B").await, "5");
    assert_eq!(client.roundtrip("ADD EDGE A B 3").await, "EDGE ADDED");
    assert_eq!(client.roundtrip("SHORTEST PATH A B").await, "3");

    assert_eq!(client.roundtrip("SHORTEST PATH B A").await, "2147483647");
    assert_eq!(
        client.roundtrip("SHORTEST PATH A UNKNOWN").await,
        "ERROR: NODE NOT FOUND"
    );

    assert_eq!(client.roundtrip("CLOSER THAN 10 A").await, "B");
    // Empty result is an empty line, not an error.
    assert_eq!(client.roundtrip("CLOSER THAN 10 B").await, "");
    assert_eq!(
        client.roundtrip("CLOSER THAN 10 UNKNOWN").await,
        "ERROR: NODE NOT FOUND"
    );

    assert_eq!(client.roundtrip("REMOVE EDGE A B").await, "EDGE REMOVED");
    assert_eq!(client.roundtrip("REMOVE NODE A").await, "NODE REMOVED");
    assert_eq!(
        client.roundtrip("REMOVE NODE A").await,
        "ERROR: NODE NOT FOUND"
    );
}

#[tokio::test]
async fn commands_before_greeting_get_sorry() {
    let (addr, _graph) = start_server(Duration::from_secs(30)).await;
    let mut client = Client::connect(addr).await;
    client.recv().await.unwrap(); // banner

    assert_eq!(
        client.roundtrip("ADD NODE A").await,
        "SORRY, I DID NOT UNDERSTAND THAT"
    );
    assert_eq!(
        client.roundtrip("hello?").await,
        "SORRY, I DID NOT UNDERSTAND THAT"
    );

    // Greeting still works afterwards.
    client.send(&format!("HI, I AM {CLIENT}")).await;
    assert_eq!(client.recv().await.unwrap(), format!("HI {CLIENT}"));
    assert_eq!(client.roundtrip("ADD NODE A").await, "NODE ADDED");
}

#[tokio::test]
async fn unrecognised_lines_do_not_end_the_conversation() {
    let (addr, _graph) = start_server(Duration::from_secs(30)).await;
    let mut client = Client::greeted(addr).await;

    assert_eq!(
        client.roundtrip("ADD NODE spaced name").await,
        "SORRY, I DID NOT UNDERSTAND THAT"
    );
    assert_eq!(
        client.roundtrip("ADD NODE ok ").await,
        "SORRY, I DID NOT UNDERSTAND THAT"
    );
    assert_eq!(client.roundtrip("ADD NODE ok").await, "NODE ADDED");
}

#[tokio::test]
async fn idle_client_gets_timed_out_with_a_farewell() {
    let (addr, _graph) = start_server(Duration::from_millis(200)).await;
    let mut client = Client::greeted(addr).await;

    // Stay silent; the server must speak the farewell on its own.
    let farewell = client.recv().await.unwrap();
    assert_farewell(&farewell, CLIENT);
    assert_eq!(client.recv().await, None);
}

#[tokio::test]
async fn sessions_share_one_graph() {
    let (addr, _graph) = start_server(Duration::from_secs(30)).await;
    let mut first = Client::greeted(addr).await;
    let mut second = Client::greeted(addr).await;

    assert_eq!(first.roundtrip("ADD NODE shared").await, "NODE ADDED");
    assert_eq!(
        second.roundtrip("ADD NODE shared").await,
        "ERROR: NODE ALREADY EXISTS"
    );
    assert_eq!(second.roundtrip("REMOVE NODE shared").await, "NODE REMOVED");
    assert_eq!(
        first.roundtrip("REMOVE NODE shared").await,
        "ERROR: NODE NOT FOUND"
    );
}

#[tokio::test]
async fn concurrent_writers_and_readers_keep_the_graph_consistent() {
    let (addr, graph) = start_server(Duration::from_secs(30)).await;

    let mut setup = Client::greeted(addr).await;
    assert_eq!(setup.roundtrip("ADD NODE hub").await, "NODE ADDED");

    let mut tasks = Vec::new();
    for i in 0..4 {
        let writer = tokio::spawn(async move {
            let mut client = Client::greeted(addr).await;
            let name = format!("w{i}");
            assert_eq!(client.roundtrip(&format!("ADD NODE {name}")).await, "NODE ADDED");
            assert_eq!(
                client.roundtrip(&format!("ADD EDGE hub {name} {i}")).await,
                "EDGE ADDED"
            );
        });
        tasks.push(writer);
    }
    for _ in 0..4 {
        let reader = tokio::spawn(async move {
            let mut client = Client::greeted(addr).await;
            for _ in 0..10 {
                // Queries interleave with the writers; any answer must be a
                // well-formed catalog reply, never a torn one.
                let reply = client.roundtrip("SHORTEST PATH hub hub").await;
                assert_eq!(reply, "0");
                let reply = client.roundtrip("CLOSER THAN 100 hub").await;
                assert!(
                    reply.is_empty() || reply.split(',').all(|name| name.starts_with('w')),
                    "unexpected reply: {reply:?}"
                );
            }
        });
        tasks.push(reader);
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Writers all landed; the store's edge set and adjacency agree.
    let store = graph.read().await;
    assert_eq!(store.node_count(), 5);
    assert_eq!(store.edge_count(), 4);
    let outgoing = store.outgoing("hub").unwrap();
    assert_eq!(outgoing.len(), store.edges().len());
}
