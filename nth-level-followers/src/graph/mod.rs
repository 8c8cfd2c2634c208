//! Follows graph and level finding
//!
//! - `Node`: a user and the ids it follows
//! - `Graph`: id -> Node mapping built once per run
//! - `DistanceMap`: shortest distances discovered by one traversal
//! - `find_at_level`: ids at exactly N hops from a start node

mod level;

pub use level::{distances_from, find_at_level, DistanceMap};

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use challenge_api::{NodeId, UserRecord};
use tracing::warn;

/// A user and the ids it follows, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub follows: Vec<NodeId>,
}

impl From<UserRecord> for Node {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            follows: record.follows,
        }
    }
}

/// Directed follows graph keyed by node id.
///
/// Edges may point at ids with no node of their own; those targets have no
/// outbound edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from user records.
    ///
    /// When an id appears more than once the first record is kept.
    pub fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let mut graph = Self::new();
        for record in records {
            let id = record.id;
            if !graph.insert(record.into()) {
                warn!(id, "Duplicate user record ignored");
            }
        }
        graph
    }

    /// Insert a node, returning false if its id is already present
    pub fn insert(&mut self, node: Node) -> bool {
        match self.nodes.entry(node.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ids followed by `id`, empty for unknown ids
    pub fn follows(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.follows.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
