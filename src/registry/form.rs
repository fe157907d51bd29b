//! Form: the descriptor of one convertible program shape.

use regex::{Captures, Regex};

use crate::encoder::{EncodeInput, Fragment};
use crate::graph::Graph;
use crate::model::{FieldMap, NodeId, Shape, Template};
use crate::{Error, Result};
use super::Registry;

/// Text match → field values.
pub type DecodeFn = fn(&Captures<'_>) -> Result<FieldMap>;

/// Node plus resolved child fragments → source text.
pub type EncodeFn = fn(&EncodeInput<'_>) -> Result<Fragment>;

/// Field values → a new node bound into the graph.
pub type ConstructFn = fn(&mut Graph, &Registry, &Form, FieldMap) -> Result<NodeId>;

/// How the encoder treats a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Statement,
    Expression,
    /// Entry point (event handler, unconditional loop). Gated forms only
    /// produce code underneath one of these; its body declares the free
    /// variables it touches.
    Container,
}

/// An immutable form descriptor.
///
/// Built once with the `with_*` methods and then handed to
/// `Registry::register`.
#[derive(Clone)]
pub struct Form {
    type_name: String,
    category: Option<String>,
    role: Role,
    gated: bool,
    template: Template,
    pattern: Regex,
    /// Field naming the variable the form reads or writes.
    variable: Option<&'static str>,
    decode: DecodeFn,
    encode: EncodeFn,
    construct: ConstructFn,
}

impl Form {
    /// New form whose role follows the template shape. Decoding yields no
    /// fields and construction creates a bare node until overridden.
    pub fn new(type_name: &str, template: Template, pattern: &str, encode: EncodeFn) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            type_name: type_name.to_string(),
            source,
        })?;
        let role = match template.shape {
            Shape::Expression { .. } => Role::Expression,
            Shape::Statement { .. } => Role::Statement,
        };
        Ok(Self {
            type_name: type_name.to_string(),
            category: None,
            role,
            gated: false,
            template,
            pattern,
            variable: None,
            decode: decode_nothing,
            encode,
            construct: construct_bare,
        })
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Only emit code when enabled and rooted under a container.
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn container(mut self) -> Self {
        self.role = Role::Container;
        self
    }

    pub fn with_variable(mut self, field: &'static str) -> Self {
        self.variable = Some(field);
        self
    }

    pub fn with_decode(mut self, decode: DecodeFn) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_construct(mut self, construct: ConstructFn) -> Self {
        self.construct = construct;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn type_name(&self) -> &str { &self.type_name }
    pub fn category(&self) -> Option<&str> { self.category.as_deref() }
    pub fn role(&self) -> Role { self.role }
    pub fn is_gated(&self) -> bool { self.gated }
    pub fn is_container(&self) -> bool { self.role == Role::Container }
    pub fn template(&self) -> &Template { &self.template }
    pub fn pattern(&self) -> &Regex { &self.pattern }
    pub fn variable(&self) -> Option<&'static str> { self.variable }

    // ========================================================================
    // Behaviour
    // ========================================================================

    /// First match of the pattern anywhere in `text`.
    pub fn matches<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(text)
    }

    /// Match only when the pattern covers all of `text`.
    pub fn matches_whole<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.pattern
            .captures(text)
            .filter(|c| c.get(0).is_some_and(|m| m.start() == 0 && m.end() == text.len()))
    }

    pub fn decode(&self, caps: &Captures<'_>) -> Result<FieldMap> {
        (self.decode)(caps)
    }

    pub fn encode(&self, input: &EncodeInput<'_>) -> Result<Fragment> {
        (self.encode)(input)
    }

    pub fn construct(&self, graph: &mut Graph, registry: &Registry, fields: FieldMap) -> Result<NodeId> {
        (self.construct)(graph, registry, self, fields)
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("type_name", &self.type_name)
            .field("category", &self.category)
            .field("role", &self.role)
            .field("gated", &self.gated)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

fn decode_nothing(_: &Captures<'_>) -> Result<FieldMap> {
    Ok(FieldMap::new())
}

fn construct_bare(graph: &mut Graph, registry: &Registry, form: &Form, fields: FieldMap) -> Result<NodeId> {
    graph.create_node(registry, form.type_name(), fields)
}
