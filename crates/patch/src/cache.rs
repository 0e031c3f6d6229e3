//! Nodes set aside during a batch.

use std::collections::HashMap;

use dom::{Dom, NodeId, StableId};

/// Detached nodes that stay addressable by stable id until the batch ends.
#[derive(Debug, Default)]
pub struct RememberedNodeCache {
    nodes: HashMap<StableId, NodeId>,
}

impl RememberedNodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, id: StableId, node: NodeId) {
        self.nodes.insert(id, node);
    }

    /// The remembered node for `id`, if it is still alive.
    pub fn get(&self, dom: &Dom, id: StableId) -> Option<NodeId> {
        self.nodes
            .get(&id)
            .copied()
            .filter(|&n| dom.nodes.contains(n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forget everything. Nodes that were never re-attached are released;
    /// returns how many.
    pub fn clear(&mut self, dom: &mut Dom) -> usize {
        let mut released = 0;
        for (_, node) in self.nodes.drain() {
            if dom.nodes.contains(node) && dom.parent(node).is_none() {
                dom.release_subtree(node);
                released += 1;
            }
        }
        released
    }
}
