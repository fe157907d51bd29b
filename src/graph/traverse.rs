//! Structural queries: ancestor walks, chains, descendants.
//!
//! Parent pointers never form a cycle (see `Graph::check_attachable`), so
//! none of these walks need a visited set.

use crate::model::NodeId;
use crate::Result;
use super::Graph;

/// Iterator over the owners of record above a node, nearest first.
pub struct Ancestors<'g> {
    graph: &'g Graph,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let parent = self.graph.node(self.current?)?.parent;
        self.current = parent;
        parent
    }
}

impl Graph {
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { graph: self, current: Some(id) }
    }

    /// Top of the stack or expression tree containing `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// The node whose slot encloses `id`, skipping over the statements that
    /// merely precede it in the same chain.
    pub fn surround_parent(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        for parent in self.ancestors(id) {
            let follows = self.node(parent).is_some_and(|p| p.next == Some(current));
            if !follows {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// True when the node itself or any enclosing node is disabled.
    /// Disabling a statement does not disable the ones chained after it.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(nid) = current {
            match self.node(nid) {
                Some(node) if !node.enabled => return true,
                Some(_) => current = self.surround_parent(nid),
                None => return false,
            }
        }
        false
    }

    /// Statements from `head` following `next` links, `head` included.
    pub fn chain(&self, head: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            let Some(node) = self.node(id) else { break };
            out.push(id);
            current = node.next;
        }
        out
    }

    /// Last statement of the chain containing `id`.
    pub fn tail(&self, id: NodeId) -> Result<NodeId> {
        let mut current = self.get(id)?;
        while let Some(next) = current.next {
            current = self.get(next)?;
        }
        Ok(current.id)
    }

    /// Pre-order walk of everything `id` owns, `id` first. Slot contents come
    /// in slot order, then the statements chained after each node.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(nid) = stack.pop() {
            let Some(node) = self.node(nid) else { continue };
            out.push(nid);
            let children: Vec<NodeId> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}
