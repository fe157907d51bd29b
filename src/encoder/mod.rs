//! # Encoder
//!
//! Walks the graph and renders source text. Each node's slot contents are
//! rendered first and handed to the form's encode function, which only
//! assembles strings.
//!
//! ## Gating
//!
//! Forms flagged as gated emit nothing when they are disabled (directly or
//! through an enclosing slot owner) or when the root of their subtree is not
//! a container. Suppression is silent; it is traced, never an error.

mod fragment;
mod indent;
mod scope;

pub use fragment::{EncodeInput, Fragment, Precedence};
pub use indent::{indent_body_if_needed, prefix_lines};
pub use scope::resolve_name;

use tracing::{debug, trace, warn};

use crate::config::EncoderOptions;
use crate::graph::Graph;
use crate::model::{NodeId, Shape, Slot};
use crate::registry::{Form, Registry};
use crate::{Error, Result};

/// Renders nodes of a graph using the forms of a registry.
#[derive(Debug, Clone)]
pub struct Encoder<'r> {
    registry: &'r Registry,
    options: EncoderOptions,
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, EncoderOptions::default())
    }

    pub fn with_options(registry: &'r Registry, options: EncoderOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Source text for one node and everything in its slots. Statements
    /// chained after the node are not included; see `encode_chain`.
    pub fn encode(&self, graph: &Graph, id: NodeId) -> Result<String> {
        Ok(self.encode_fragment(graph, id)?.into_code())
    }

    /// Like `encode`, keeping the fragment kind and precedence.
    pub fn encode_fragment(&self, graph: &Graph, id: NodeId) -> Result<Fragment> {
        self.render(graph, id)
    }

    /// Source text for a statement chain starting at `head`.
    pub fn encode_chain(&self, graph: &Graph, head: NodeId) -> Result<String> {
        let mut out = String::new();
        for id in graph.chain(head) {
            match self.render(graph, id)? {
                Fragment::Statement(code) => out.push_str(&code),
                Fragment::Expression { code, .. } => {
                    // A bare expression in statement position is a line of its own.
                    out.push_str(&code);
                    out.push('\n');
                }
            }
        }
        Ok(out)
    }

    /// Source text for every root, in creation order, separated by a blank
    /// line. Roots of unregistered types are skipped with a warning.
    pub fn encode_graph(&self, graph: &Graph) -> Result<String> {
        let mut sections = Vec::new();
        for root in graph.roots() {
            let node = graph.get(root)?;
            let rendered = match node.shape {
                Shape::Statement { .. } => self.encode_chain(graph, root),
                Shape::Expression { .. } => self.encode(graph, root).map(|mut code| {
                    if !code.is_empty() {
                        code.push('\n');
                    }
                    code
                }),
            };
            match rendered {
                Ok(code) if code.trim().is_empty() => {
                    trace!(root = %root, "root produced no code");
                }
                Ok(code) => sections.push(code),
                Err(Error::UnknownType(t)) => {
                    warn!(root = %root, type_name = %t, "skipping root with unregistered form");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(sections = sections.len(), "encoded graph");
        Ok(sections.join("\n"))
    }

    /// Variables a container's body refers to, as they would be declared.
    pub fn free_variables(&self, graph: &Graph, container: NodeId) -> Vec<String> {
        scope::free_variables(graph, self.registry, container, &self.options.fallback_variable)
    }

    /// Whether a gated form at `id` is currently silenced.
    pub fn is_suppressed(&self, graph: &Graph, id: NodeId) -> bool {
        if graph.is_disabled(id) {
            return true;
        }
        let root = graph.root_of(id);
        let rooted_in_container = graph
            .node(root)
            .and_then(|n| self.registry.lookup(&n.type_name))
            .is_some_and(Form::is_container);
        !rooted_in_container
    }

    fn render(&self, graph: &Graph, id: NodeId) -> Result<Fragment> {
        let node = graph.get(id)?;
        let form = self.registry.get(&node.type_name)?;

        if form.is_gated() && self.is_suppressed(graph, id) {
            trace!(node = %id, type_name = %node.type_name, "gated form suppressed");
            return Ok(Fragment::Statement(String::new()));
        }

        let mut input = EncodeInput::new(node, &self.options);
        for (name, slot) in &node.slots {
            input = match slot {
                Slot::Value { child: Some(child), .. } => match self.render(graph, *child)? {
                    Fragment::Expression { code, precedence } => {
                        input.with_value(name, Some((code, precedence)))
                    }
                    Fragment::Statement(_) => {
                        return Err(Error::TypeMismatch {
                            expected: format!("expression in slot '{name}'"),
                            got: graph.get(*child)?.type_name.clone(),
                        });
                    }
                },
                Slot::Value { child: None, .. } => input.with_value(name, None),
                Slot::Statement { head } => {
                    let code = match head {
                        Some(head) => self.encode_chain(graph, *head)?,
                        None => String::new(),
                    };
                    input.with_statements(name, prefix_lines(&code, &self.options.indent))
                }
            };
        }
        if let Some(field) = form.variable() {
            let raw = node.field_text(field);
            input = input.with_variable(resolve_name(graph, &raw, &self.options.fallback_variable));
        }
        if form.is_container() {
            input = input.with_globals(self.free_variables(graph, id));
        }
        form.encode(&input)
    }
}
