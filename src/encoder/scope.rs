//! Free-variable inference for container bodies.
//!
//! A container's body may assign names that live at module level, so the
//! generated function opens with a `global` line listing every variable
//! any descendant of its statement slots touches. Computed as a fold over
//! the subtree; the graph is never mutated.

use indexmap::IndexSet;

use crate::graph::Graph;
use crate::model::{NodeId, Slot};
use crate::registry::Registry;

/// Distinct variable names referenced under `container`'s statement slots,
/// first-seen order.
pub fn free_variables(
    graph: &Graph,
    registry: &Registry,
    container: NodeId,
    fallback: &str,
) -> Vec<String> {
    let Some(node) = graph.node(container) else {
        return Vec::new();
    };
    node.slots
        .values()
        .filter_map(|slot| match slot {
            Slot::Statement { head: Some(head) } => Some(*head),
            _ => None,
        })
        .flat_map(|head| graph.descendants(head))
        .filter_map(|id| referenced_name(graph, registry, id, fallback))
        .fold(IndexSet::new(), |mut names, name| {
            names.insert(name);
            names
        })
        .into_iter()
        .collect()
}

/// Name of the variable a node refers to, if its form declares one.
fn referenced_name(graph: &Graph, registry: &Registry, id: NodeId, fallback: &str) -> Option<String> {
    let node = graph.node(id)?;
    let field = registry.lookup(&node.type_name)?.variable()?;
    let raw = node.field_text(field);
    Some(resolve_name(graph, &raw, fallback))
}

/// Resolve a variable field: a declared id maps to its display name, an
/// opaque id maps to `fallback`, anything else is already a name.
pub fn resolve_name(graph: &Graph, raw: &str, fallback: &str) -> String {
    if let Some(name) = graph.variable_name(raw) {
        return name.to_string();
    }
    if raw.is_empty() || looks_like_id(raw) {
        return fallback.to_string();
    }
    raw.to_string()
}

/// Hex digits and dashes, eight or more.
fn looks_like_id(s: &str) -> bool {
    s.len() >= 8 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}
