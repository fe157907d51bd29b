//! Node: one form instance placed in a graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Capability, FieldMap, Shape, Value};

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connection point owned by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    /// Holds at most one expression subgraph of a compatible capability.
    Value { check: Option<Capability>, child: Option<NodeId> },
    /// Holds the head of a statement chain.
    Statement { head: Option<NodeId> },
}

impl Slot {
    pub fn occupant(&self) -> Option<NodeId> {
        match self {
            Slot::Value { child, .. } => *child,
            Slot::Statement { head } => *head,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Slot::Statement { .. })
    }
}

/// A node in the block graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Foreign key into the form registry.
    pub type_name: String,
    pub fields: FieldMap,
    /// Slots in declaration order (template order, then slots added later).
    pub slots: IndexMap<String, Slot>,
    pub shape: Shape,
    pub enabled: bool,
    /// Default literal filled in for an empty slot; replaced on connect.
    pub shadow: bool,
    /// Owner of record: the slot owner, or the previous statement in a chain.
    pub parent: Option<NodeId>,
    /// Next statement in the chain.
    pub next: Option<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, type_name: impl Into<String>, shape: Shape) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            fields: FieldMap::new(),
            slots: IndexMap::new(),
            shape,
            enabled: true,
            shadow: false,
            parent: None,
            next: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field rendered as source text, empty when unset.
    pub fn field_text(&self, key: &str) -> String {
        self.fields.get(key).map(ToString::to_string).unwrap_or_default()
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn value_child(&self, name: &str) -> Option<NodeId> {
        match self.slots.get(name) {
            Some(Slot::Value { child, .. }) => *child,
            _ => None,
        }
    }

    pub fn statement_head(&self, name: &str) -> Option<NodeId> {
        match self.slots.get(name) {
            Some(Slot::Statement { head }) => *head,
            _ => None,
        }
    }

    /// Everything this node owns, in slot order, followed by the next
    /// statement in its chain.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.values().filter_map(Slot::occupant).chain(self.next)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_order_is_slots_then_next() {
        let mut node = Node::new(NodeId(1), "controls_if", Shape::Statement { previous: true, next: true });
        node.slots.insert("IF0".into(), Slot::Value { check: None, child: Some(NodeId(2)) });
        node.slots.insert("DO0".into(), Slot::Statement { head: Some(NodeId(3)) });
        node.next = Some(NodeId(4));
        assert_eq!(node.children().collect::<Vec<_>>(), vec![NodeId(2), NodeId(3), NodeId(4)]);
    }

    #[test]
    fn test_field_text() {
        let node = Node::new(NodeId(1), "pause", Shape::Statement { previous: true, next: true })
            .with_field("TIME", 100);
        assert_eq!(node.field_text("TIME"), "100");
        assert_eq!(node.field_text("MISSING"), "");
    }
}
