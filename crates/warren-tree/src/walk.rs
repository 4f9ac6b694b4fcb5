//! Traversal: the canonical visit order and the record iterator.
//!
//! Aliasing makes the structure a DAG, so every walk carries a seen-set
//! keyed by node identity and enters each node at most once. The walk is
//! depth-first from the root, left before right; finalization numbers nodes
//! in this order and the encoder emits them in this order, which is what
//! keeps `Node` record values consistent with the written stream.

use std::collections::HashSet;

use warren_core::{Direction, Network, NodeId, Record, Visitor};

use crate::tree::Tree;

impl<V> Tree<V> {
    /// All reachable nodes in canonical (depth-first, left-first) order.
    pub(crate) fn reachable_nodes(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let node = self.arena.get(id);
            // Push right first so the left child is visited first.
            if let Record::Node(right) = node.right {
                stack.push(right);
            }
            if let Record::Node(left) = node.left {
                stack.push(left);
            }
        }
        order
    }

    /// Walk the tree once, reporting every record position to `visitor`.
    ///
    /// Finalizes first so node numbers are meaningful. Each reachable node
    /// is reported exactly once (left record, then right record), so the
    /// visitor sees `2 × node_count` records. A node reachable through
    /// alias edges is reported under the prefix by which the canonical
    /// order first reaches it.
    pub fn iterate(&mut self, visitor: &mut dyn Visitor<V>) {
        self.finalize();
        let mut seen = HashSet::new();
        let root_net = Network::any(self.config.ip_version);
        self.visit_records(self.root, &root_net, &mut seen, visitor);
    }

    fn visit_records(
        &self,
        id: NodeId,
        node_net: &Network,
        seen: &mut HashSet<NodeId>,
        visitor: &mut dyn Visitor<V>,
    ) {
        if !seen.insert(id) {
            return;
        }
        let number = self.arena.get(id).number;
        for dir in [Direction::Left, Direction::Right] {
            let record_net = node_net.child(dir);
            match self.arena.get(id).record(dir) {
                Record::Node(target) => {
                    let target_number = self.arena.get(target).number;
                    visitor.on_node_record(number, dir, node_net, &record_net, target_number);
                    self.visit_records(target, &record_net, seen, visitor);
                }
                Record::Empty => visitor.on_empty_record(number, dir, node_net, &record_net),
                Record::Data(key) => visitor.on_data_record(
                    number,
                    dir,
                    node_net,
                    &record_net,
                    self.data.key(key),
                    self.data.value(key),
                ),
            }
        }
    }
}
