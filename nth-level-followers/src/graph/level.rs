//! Level finding over the follows graph
//!
//! Breadth-first search from a start node. A node's distance is fixed the
//! first time it is discovered, which is its shortest distance because nodes
//! are dequeued in order of increasing distance.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use challenge_api::NodeId;
use tracing::{debug, info, instrument, warn};

use super::Graph;

/// Shortest distances from the start node, set once per id on first discovery
#[derive(Debug, Clone, Default)]
pub struct DistanceMap {
    distances: HashMap<NodeId, usize>,
}

impl DistanceMap {
    fn with_start(start: NodeId) -> Self {
        let mut distances = HashMap::new();
        distances.insert(start, 0);
        Self { distances }
    }

    /// Record a distance for an undiscovered id; returns false if already known
    fn discover(&mut self, id: NodeId, distance: usize) -> bool {
        match self.distances.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(distance);
                true
            }
        }
    }

    pub fn distance(&self, id: NodeId) -> Option<usize> {
        self.distances.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Ids at exactly `level`, ascending
    pub fn at_level(&self, level: usize) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .distances
            .iter()
            .filter(|(_, distance)| **distance == level)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Compute shortest distances from `start`, expanding no node whose
/// distance has reached `max_depth`.
///
/// Returns `None` when `start` has no node in the graph. Every id in the
/// returned map is within `max_depth` of `start`.
pub fn distances_from(graph: &Graph, start: NodeId, max_depth: usize) -> Option<DistanceMap> {
    if !graph.contains(start) {
        return None;
    }

    let mut distances = DistanceMap::with_start(start);
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((current, distance)) = queue.pop_front() {
        if distance >= max_depth {
            // Queue is ordered by distance; everything left is at least this far
            break;
        }

        for &target in graph.follows(current) {
            if distances.discover(target, distance + 1) {
                queue.push_back((target, distance + 1));
            }
        }
    }

    Some(distances)
}

/// Ids whose shortest distance from `start` is exactly `level`, ascending.
///
/// Never fails: an unknown start or a negative level yields an empty list,
/// as does a level no node sits at. `level == 0` yields `[start]`. Edges to
/// ids without a node still count their targets at the edge's distance.
#[instrument(skip(graph), fields(nodes = graph.len()))]
pub fn find_at_level(graph: &Graph, start: NodeId, level: i64) -> Vec<NodeId> {
    let Ok(depth) = usize::try_from(level) else {
        debug!("Negative level has no nodes");
        return Vec::new();
    };

    let Some(distances) = distances_from(graph, start, depth) else {
        warn!(start, "Start node not found in graph");
        return Vec::new();
    };

    let found = distances.at_level(depth);

    info!(
        visited = distances.len(),
        found = found.len(),
        "Resolved nodes at level"
    );
    found
}
