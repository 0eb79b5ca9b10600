//! Wire protocol: message catalog and line parsing.
//!
//! One request or reply per LF-terminated line, tokens separated by single
//! spaces, no quoting. Requests are recognised by anchored full-match
//! regexes, so trailing characters make a line unrecognised rather than
//! loosely accepted.

use once_cell::sync::Lazy;
use regex::Regex;

/// Token classes shared by the request patterns.
const NAME: &str = "[A-Za-z0-9_-]+";
const NUMBER: &str = "[0-9]+";
const CLIENT_ID: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static GREETING: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^HI, I AM ({CLIENT_ID})$")).unwrap());
static ADD_NODE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!("^ADD NODE ({NAME})$")).unwrap());
static ADD_EDGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^ADD EDGE ({NAME}) ({NAME}) ({NUMBER})$")).unwrap());
static REMOVE_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^REMOVE NODE ({NAME})$")).unwrap());
static REMOVE_EDGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^REMOVE EDGE ({NAME}) ({NAME})$")).unwrap());
static SHORTEST_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^SHORTEST PATH ({NAME}) ({NAME})$")).unwrap());
static CLOSER_THAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^CLOSER THAN ({NUMBER}) ({NAME})$")).unwrap());

/// The client farewell, matched literally.
pub const FAREWELL: &str = "BYE MATE!";

/// Server reply lines.
pub mod messages {
    pub const NODE_ADDED: &str = "NODE ADDED";
    pub const NODE_REMOVED: &str = "NODE REMOVED";
    pub const EDGE_ADDED: &str = "EDGE ADDED";
    pub const EDGE_REMOVED: &str = "EDGE REMOVED";
    pub const NODE_EXISTS: &str = "ERROR: NODE ALREADY EXISTS";
    pub const NODE_NOT_FOUND: &str = "ERROR: NODE NOT FOUND";
    pub const SORRY: &str = "SORRY, I DID NOT UNDERSTAND THAT";

    /// Wire token for a pair with no directed path (i32::MAX).
    pub const UNREACHABLE: &str = "2147483647";

    /// Opening line the server sends on connect.
    pub fn greeting(session_id: &str) -> String {
        format!("HI, I AM {session_id}")
    }

    /// Acknowledges the client greeting.
    pub fn greeting_reply(client_id: &str) -> String {
        format!("HI {client_id}")
    }

    /// Closing line; `client_id` is empty when the client never greeted.
    pub fn farewell(client_id: &str, elapsed_ms: u128) -> String {
        format!("BYE {client_id}, WE SPOKE FOR {elapsed_ms} MS")
    }
}

/// A recognised client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HI, I AM <uuid>`
    Greeting { client_id: String },
    /// `BYE MATE!`
    Farewell,
    /// `ADD NODE <name>`
    AddNode { name: String },
    /// `ADD EDGE <from> <to> <weight>`
    AddEdge { from: String, to: String, weight: u64 },
    /// `REMOVE NODE <name>`
    RemoveNode { name: String },
    /// `REMOVE EDGE <from> <to>`
    RemoveEdge { from: String, to: String },
    /// `SHORTEST PATH <from> <to>`
    ShortestPath { from: String, to: String },
    /// `CLOSER THAN <limit> <from>`
    CloserThan { limit: u64, from: String },
}

/// Classifies one input line. `None` means the line gets a SORRY.
pub fn parse(line: &str) -> Option<Command> {
    if line == FAREWELL {
        return Some(Command::Farewell);
    }
    if let Some(caps) = GREETING.captures(line) {
        return Some(Command::Greeting {
            client_id: caps[1].to_string(),
        });
    }
    if let Some(caps) = ADD_NODE.captures(line) {
        return Some(Command::AddNode {
            name: caps[1].to_string(),
        });
    }
    if let Some(caps) = ADD_EDGE.captures(line) {
        return Some(Command::AddEdge {
            from: caps[1].to_string(),
            to: caps[2].to_string(),
            weight: caps[3].parse().ok()?,
        });
    }
    if let Some(caps) = REMOVE_NODE.captures(line) {
        return Some(Command::RemoveNode {
            name: caps[1].to_string(),
        });
    }
    if let Some(caps) = REMOVE_EDGE.captures(line) {
        return Some(Command::RemoveEdge {
            from: caps[1].to_string(),
            to: caps[2].to_string(),
        });
    }
    if let Some(caps) = SHORTEST_PATH.captures(line) {
        return Some(Command::ShortestPath {
            from: caps[1].to_string(),
            to: caps[2].to_string(),
        });
    }
    if let Some(caps) = CLOSER_THAN.captures(line) {
        return Some(Command::CloserThan {
            limit: caps[1].parse().ok()?,
            from: caps[2].to_string(),
        });
    }
    None
}
