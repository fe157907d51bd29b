//! # Block Graph
//!
//! In-memory owner of every node placed by the decoder or by the host.
//!
//! ## Invariants
//!
//! - A node has at most one owner of record (`parent`): either the node whose
//!   slot holds it, or the statement it follows in a chain.
//! - Slots are single-occupancy. Chains are terminal at both ends.
//! - Connections that would make a node its own ancestor are refused, so
//!   every ancestor walk terminates.
//!
//! Structural violations are returned as errors. `append_to_chain` is the
//! one permissive operation: a failed link is logged and reported as `false`.

mod traverse;

pub use traverse::Ancestors;

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::*;
use crate::registry::Registry;
use crate::{Error, Result};

/// Owning container of nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    /// Creation order; gives roots and iteration a stable order.
    order: Vec<NodeId>,
    next_node_id: u64,
    /// Host variable table: variable id → display name.
    variables: IndexMap<String, String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Create a node of a registered form. Template defaults are applied
    /// first, then `fields` override them.
    pub fn create_node(
        &mut self,
        registry: &Registry,
        type_name: &str,
        fields: FieldMap,
    ) -> Result<NodeId> {
        let form = registry.get(type_name)?;
        let template = form.template();

        self.next_node_id += 1;
        let id = NodeId(self.next_node_id);
        let mut node = Node::new(id, type_name, template.shape);

        for arg in &template.args {
            match arg {
                Arg::Value { name, check } => {
                    node.slots.insert(name.clone(), Slot::Value { check: *check, child: None });
                }
                Arg::Statement { name } => {
                    node.slots.insert(name.clone(), Slot::Statement { head: None });
                }
                _ => {
                    if let (Some(name), Some(default)) = (arg.name(), arg.default_value()) {
                        node.fields.insert(name.to_string(), default);
                    }
                }
            }
        }
        node.fields.extend(fields);

        self.nodes.insert(id, node);
        self.order.push(id);
        Ok(id)
    }

    /// Create a node flagged as a shadow (default literal).
    pub fn create_shadow(
        &mut self,
        registry: &Registry,
        type_name: &str,
        fields: FieldMap,
    ) -> Result<NodeId> {
        let id = self.create_node(registry, type_name, fields)?;
        self.get_mut(id)?.shadow = true;
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Like `node`, but a missing id is an error.
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or_else(|| Error::NotFound(format!("Node {id}")))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or_else(|| Error::NotFound(format!("Node {id}")))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Nodes without an owner, in creation order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.is_root()).map(|n| n.id).collect()
    }

    /// Set a field value (upsert).
    pub fn set_field(&mut self, id: NodeId, key: &str, value: impl Into<Value>) -> Result<()> {
        self.get_mut(id)?.fields.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Declare an extra value slot on an existing node (mutator arms such as
    /// `IF1`). Declaring an existing slot again is a no-op.
    pub fn add_value_slot(
        &mut self,
        id: NodeId,
        name: &str,
        check: Option<Capability>,
    ) -> Result<()> {
        let node = self.get_mut(id)?;
        node.slots
            .entry(name.to_string())
            .or_insert(Slot::Value { check, child: None });
        Ok(())
    }

    /// Declare an extra statement slot on an existing node (`DO1`, `ELSE`).
    pub fn add_statement_slot(&mut self, id: NodeId, name: &str) -> Result<()> {
        let node = self.get_mut(id)?;
        node.slots
            .entry(name.to_string())
            .or_insert(Slot::Statement { head: None });
        Ok(())
    }

    /// Remove a node together with everything it owns (slot contents and
    /// the statements chained after it). Returns how many nodes were removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<usize> {
        self.disconnect(id)?;
        let doomed = self.descendants(id);
        for nid in &doomed {
            self.nodes.remove(nid);
        }
        self.order.retain(|nid| !doomed.contains(nid));
        Ok(doomed.len())
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Attach `child` (and the chain it heads) to a statement slot of `parent`.
    pub fn connect_statement(&mut self, parent: NodeId, slot: &str, child: NodeId) -> Result<()> {
        let owner = self.get(parent)?;
        match owner.slot(slot) {
            Some(Slot::Statement { head: None }) => {}
            Some(Slot::Statement { head: Some(_) }) => {
                return Err(Error::SlotOccupied { node: parent, slot: slot.to_string() });
            }
            Some(Slot::Value { .. }) => {
                return Err(Error::TypeMismatch {
                    expected: "statement slot".into(),
                    got: format!("value slot '{slot}'"),
                });
            }
            None => return Err(Error::UnknownSlot { node: parent, slot: slot.to_string() }),
        }

        let incoming = self.get(child)?;
        if !incoming.shape.has_previous() {
            return Err(Error::TypeMismatch {
                expected: "statement with a previous connector".into(),
                got: incoming.type_name.clone(),
            });
        }
        self.check_attachable(parent, child)?;

        if let Some(Slot::Statement { head }) = self.get_mut(parent)?.slots.get_mut(slot) {
            *head = Some(child);
        }
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Plug an expression into a value slot of `parent`. A shadow occupant
    /// is discarded and replaced; any other occupant is an error.
    pub fn connect_value(&mut self, parent: NodeId, slot: &str, child: NodeId) -> Result<()> {
        let owner = self.get(parent)?;
        let (check, occupant) = match owner.slot(slot) {
            Some(Slot::Value { check, child }) => (*check, *child),
            Some(Slot::Statement { .. }) => {
                return Err(Error::TypeMismatch {
                    expected: "value slot".into(),
                    got: format!("statement slot '{slot}'"),
                });
            }
            None => return Err(Error::UnknownSlot { node: parent, slot: slot.to_string() }),
        };

        let shadow_occupant = match occupant {
            Some(existing) if self.get(existing)?.shadow => Some(existing),
            Some(_) => {
                return Err(Error::SlotOccupied { node: parent, slot: slot.to_string() });
            }
            None => None,
        };

        let incoming = self.get(child)?;
        let Shape::Expression { output } = incoming.shape else {
            return Err(Error::TypeMismatch {
                expected: "expression".into(),
                got: incoming.type_name.clone(),
            });
        };
        if !Capability::compatible(check, output) {
            return Err(Error::CapabilityMismatch {
                slot: slot.to_string(),
                expected: check.map(|c| c.to_string()).unwrap_or_default(),
                got: output.map(|c| c.to_string()).unwrap_or_default(),
            });
        }
        self.check_attachable(parent, child)?;

        if let Some(shadow) = shadow_occupant {
            debug!(node = %parent, slot, shadow = %shadow, "replacing shadow");
            self.remove_node(shadow)?;
        }
        if let Some(Slot::Value { child: c, .. }) = self.get_mut(parent)?.slots.get_mut(slot) {
            *c = Some(child);
        }
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Link `node` after the current tail of the chain containing `head`.
    ///
    /// Permissive: when either end lacks the needed connector, or `node`
    /// already has an owner, the two are left unconnected and `false` is
    /// returned after logging a warning.
    pub fn append_to_chain(&mut self, head: NodeId, node: NodeId) -> bool {
        match self.try_append(head, node) {
            Ok(()) => true,
            Err(e) => {
                warn!(head = %head, node = %node, error = %e, "failed to link statements");
                false
            }
        }
    }

    fn try_append(&mut self, head: NodeId, node: NodeId) -> Result<()> {
        let tail = self.tail(head)?;
        let tail_node = self.get(tail)?;
        if !tail_node.shape.has_next() {
            return Err(Error::TypeMismatch {
                expected: "statement with a next connector".into(),
                got: tail_node.type_name.clone(),
            });
        }
        let incoming = self.get(node)?;
        if !incoming.shape.has_previous() {
            return Err(Error::TypeMismatch {
                expected: "statement with a previous connector".into(),
                got: incoming.type_name.clone(),
            });
        }
        self.check_attachable(tail, node)?;

        self.get_mut(tail)?.next = Some(node);
        self.get_mut(node)?.parent = Some(tail);
        Ok(())
    }

    /// Detach a node from its owner. The node keeps its own slot contents
    /// and the statements chained after it. Detaching a root is a no-op.
    pub fn disconnect(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(());
        };
        let owner = self.get_mut(parent)?;
        if owner.next == Some(id) {
            owner.next = None;
        } else {
            for slot in owner.slots.values_mut() {
                match slot {
                    Slot::Value { child, .. } if *child == Some(id) => *child = None,
                    Slot::Statement { head } if *head == Some(id) => *head = None,
                    _ => {}
                }
            }
        }
        self.get_mut(id)?.parent = None;
        Ok(())
    }

    /// Refuse owned nodes and connections that would close a cycle.
    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child)?.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(Error::WouldCycle { parent, child });
        }
        Ok(())
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Register a host variable so its id resolves to a display name.
    pub fn declare_variable(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.variables.insert(id.into(), name.into());
    }

    pub fn variable_name(&self, id: &str) -> Option<&str> {
        self.variables.get(id).map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fields;

    fn registry() -> Registry {
        Registry::builtin().unwrap()
    }

    #[test]
    fn test_create_node_applies_template_defaults() {
        let reg = registry();
        let mut g = Graph::new();
        let id = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        let node = g.get(id).unwrap();
        assert_eq!(node.get("TIME"), Some(&Value::Int(1000)));
        assert!(node.enabled);
        assert!(node.is_root());
    }

    #[test]
    fn test_create_unknown_type() {
        let mut g = Graph::new();
        let err = g.create_node(&registry(), "nope", FieldMap::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownType(t) if t == "nope"));
        assert!(g.is_empty());
    }

    #[test]
    fn test_connect_statement_and_occupancy() {
        let reg = registry();
        let mut g = Graph::new();
        let start = g.create_node(&reg, "on_start", FieldMap::new()).unwrap();
        let a = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        let b = g.create_node(&reg, "pause", FieldMap::new()).unwrap();

        g.connect_statement(start, "DO", a).unwrap();
        assert_eq!(g.get(start).unwrap().statement_head("DO"), Some(a));
        assert_eq!(g.get(a).unwrap().parent, Some(start));

        let err = g.connect_statement(start, "DO", b).unwrap_err();
        assert!(matches!(err, Error::SlotOccupied { .. }));
    }

    #[test]
    fn test_connect_statement_rejects_expression() {
        let reg = registry();
        let mut g = Graph::new();
        let start = g.create_node(&reg, "on_start", FieldMap::new()).unwrap();
        let point = g.create_node(&reg, "point_led", FieldMap::new()).unwrap();
        let err = g.connect_statement(start, "DO", point).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_connect_value_capability_mismatch() {
        let reg = registry();
        let mut g = Graph::new();
        let show = g.create_node(&reg, "show_number", FieldMap::new()).unwrap();
        let text = g.create_node(&reg, "text", fields([("TEXT", "hi")])).unwrap();
        let err = g.connect_value(show, "NUM", text).unwrap_err();
        assert!(matches!(err, Error::CapabilityMismatch { .. }));
    }

    #[test]
    fn test_connect_value_replaces_shadow() {
        let reg = registry();
        let mut g = Graph::new();
        let show = g.create_node(&reg, "show_number", FieldMap::new()).unwrap();
        let shadow = g.create_shadow(&reg, "math_number", fields([("NUM", 0)])).unwrap();
        g.connect_value(show, "NUM", shadow).unwrap();

        let real = g.create_node(&reg, "microbit_accelerometer", FieldMap::new()).unwrap();
        g.connect_value(show, "NUM", real).unwrap();
        assert_eq!(g.get(show).unwrap().value_child("NUM"), Some(real));
        assert!(!g.contains(shadow));

        let other = g.create_node(&reg, "microbit_pin_read", FieldMap::new()).unwrap();
        let err = g.connect_value(show, "NUM", other).unwrap_err();
        assert!(matches!(err, Error::SlotOccupied { .. }));
    }

    #[test]
    fn test_append_to_chain_links_after_tail() {
        let reg = registry();
        let mut g = Graph::new();
        let a = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        let b = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        let c = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        assert!(g.append_to_chain(a, b));
        assert!(g.append_to_chain(a, c));
        assert_eq!(g.chain(a), vec![a, b, c]);
        assert_eq!(g.roots(), vec![a]);
    }

    #[test]
    fn test_append_to_chain_is_permissive() {
        let reg = registry();
        let mut g = Graph::new();
        let a = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        let start = g.create_node(&reg, "on_start", FieldMap::new()).unwrap();
        let point = g.create_node(&reg, "point_led", FieldMap::new()).unwrap();
        // on_start has no previous connector; point_led is an expression.
        assert!(!g.append_to_chain(a, start));
        assert!(!g.append_to_chain(a, point));
        assert_eq!(g.get(a).unwrap().next, None);
        assert_eq!(g.roots().len(), 3);
    }

    #[test]
    fn test_cycles_are_refused() {
        let reg = registry();
        let mut g = Graph::new();
        let outer = g.create_node(&reg, "forever", FieldMap::new()).unwrap();
        let inner = g.create_node(&reg, "controls_if", FieldMap::new()).unwrap();
        g.connect_statement(outer, "DO", inner).unwrap();
        // outer is owned by nobody, but is an ancestor of inner.
        let err = g.connect_statement(inner, "DO0", outer).unwrap_err();
        assert!(matches!(err, Error::WouldCycle { .. }));
    }

    #[test]
    fn test_disconnect_and_remove() {
        let reg = registry();
        let mut g = Graph::new();
        let start = g.create_node(&reg, "on_start", FieldMap::new()).unwrap();
        let a = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        let b = g.create_node(&reg, "pause", FieldMap::new()).unwrap();
        g.connect_statement(start, "DO", a).unwrap();
        assert!(g.append_to_chain(a, b));

        g.disconnect(a).unwrap();
        assert_eq!(g.get(start).unwrap().statement_head("DO"), None);
        assert_eq!(g.roots(), vec![start, a]);

        assert_eq!(g.remove_node(a).unwrap(), 2);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_mutator_slots() {
        let reg = registry();
        let mut g = Graph::new();
        let iff = g.create_node(&reg, "controls_if", FieldMap::new()).unwrap();
        g.add_value_slot(iff, "IF1", Some(Capability::Boolean)).unwrap();
        g.add_statement_slot(iff, "DO1").unwrap();
        g.add_statement_slot(iff, "ELSE").unwrap();
        let names: Vec<_> = g.get(iff).unwrap().slots.keys().cloned().collect();
        assert_eq!(names, vec!["IF0", "DO0", "IF1", "DO1", "ELSE"]);
    }
}
