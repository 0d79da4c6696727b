use std::collections::HashMap;

use super::NodeId;

/// Stack of open (ancestor) nodes with constant-time position lookup.
///
/// A node pushed twice keeps the position of its outermost occurrence.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenStack {
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
}

impl OpenStack {
    pub fn push(&mut self, id: NodeId) {
        self.index.entry(id).or_insert(self.nodes.len());
        self.nodes.push(id);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        let id = self.nodes.pop()?;
        if self.index.get(&id) == Some(&self.nodes.len()) {
            self.index.remove(&id);
        }
        Some(id)
    }

    pub fn truncate(&mut self, len: usize) {
        while self.nodes.len() > len {
            self.pop();
        }
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_push_order() {
        let mut open = OpenStack::default();
        open.push(4);
        open.push(7);
        assert_eq!(open.position(4), Some(0));
        assert_eq!(open.position(7), Some(1));
        assert_eq!(open.pop(), Some(7));
        assert_eq!(open.position(7), None);
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn repeated_node_keeps_outer_position() {
        let mut open = OpenStack::default();
        open.push(1);
        open.push(1);
        assert_eq!(open.position(1), Some(0));
        open.pop();
        assert_eq!(open.position(1), Some(0));
        open.truncate(0);
        assert!(open.is_empty());
        assert_eq!(open.position(1), None);
    }
}
