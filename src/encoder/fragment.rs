//! Encoded fragments and the input handed to a form's encode function.

use indexmap::IndexMap;

use crate::config::EncoderOptions;
use crate::model::{Node, Value};
use super::indent::indent_body_if_needed;

/// Binding strength of an expression. Higher binds tighter.
///
/// A parent asks for a minimum strength at each argument position; a child
/// weaker than that is wrapped in parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(pub u8);

impl Precedence {
    pub const ATOMIC: Precedence = Precedence(100);
    pub const CALL: Precedence = Precedence(90);
    pub const EXPONENT: Precedence = Precedence(80);
    pub const UNARY: Precedence = Precedence(70);
    pub const MULTIPLICATIVE: Precedence = Precedence(60);
    pub const ADDITIVE: Precedence = Precedence(50);
    pub const RELATIONAL: Precedence = Precedence(40);
    pub const LOGICAL_NOT: Precedence = Precedence(30);
    pub const LOGICAL_AND: Precedence = Precedence(20);
    pub const LOGICAL_OR: Precedence = Precedence(10);
    /// Any expression is acceptable here.
    pub const NONE: Precedence = Precedence(0);

    /// One step tighter; used for the non-associative side of an operator.
    pub fn tighter(self) -> Precedence {
        Precedence(self.0.saturating_add(1))
    }
}

/// Output of a form's encode function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Zero or more complete lines, each newline-terminated.
    Statement(String),
    Expression { code: String, precedence: Precedence },
}

impl Fragment {
    pub fn statement(code: impl Into<String>) -> Self {
        Fragment::Statement(code.into())
    }

    pub fn expression(code: impl Into<String>, precedence: Precedence) -> Self {
        Fragment::Expression { code: code.into(), precedence }
    }

    pub fn code(&self) -> &str {
        match self {
            Fragment::Statement(code) | Fragment::Expression { code, .. } => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            Fragment::Statement(code) | Fragment::Expression { code, .. } => code,
        }
    }
}

/// Everything a form's encode function may consult: the node, its already
/// encoded slot contents and, for containers, the free variables.
#[derive(Debug)]
pub struct EncodeInput<'a> {
    node: &'a Node,
    options: &'a EncoderOptions,
    /// Declared value slots; `None` when nothing is attached.
    values: IndexMap<String, Option<(String, Precedence)>>,
    /// Statement slots, already indented one level.
    statements: IndexMap<String, String>,
    globals: Vec<String>,
    /// Resolved name for forms that reference a variable.
    variable: Option<String>,
}

impl<'a> EncodeInput<'a> {
    pub fn new(node: &'a Node, options: &'a EncoderOptions) -> Self {
        Self {
            node,
            options,
            values: IndexMap::new(),
            statements: IndexMap::new(),
            globals: Vec::new(),
            variable: None,
        }
    }

    pub fn with_value(mut self, slot: &str, child: Option<(String, Precedence)>) -> Self {
        self.values.insert(slot.to_string(), child);
        self
    }

    pub fn with_statements(mut self, slot: &str, code: String) -> Self {
        self.statements.insert(slot.to_string(), code);
        self
    }

    pub fn with_globals(mut self, globals: Vec<String>) -> Self {
        self.globals = globals;
        self
    }

    pub fn with_variable(mut self, name: String) -> Self {
        self.variable = Some(name);
        self
    }

    pub fn node(&self) -> &Node {
        self.node
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.node.get(name)
    }

    /// Field as source text; empty when unset.
    pub fn field_text(&self, name: &str) -> String {
        self.node.field_text(name)
    }

    /// Field as source text, or `default` when unset or empty.
    pub fn field_or(&self, name: &str, default: &str) -> String {
        let text = self.field_text(name);
        if text.is_empty() { default.to_string() } else { text }
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.values.contains_key(name) || self.statements.contains_key(name)
    }

    /// Code of the expression in `slot`, parenthesised when it binds looser
    /// than `required`. An empty slot yields `default`.
    pub fn value(&self, slot: &str, required: Precedence, default: &str) -> String {
        match self.values.get(slot) {
            Some(Some((code, precedence))) if !code.is_empty() => {
                if *precedence < required {
                    format!("({code})")
                } else {
                    code.clone()
                }
            }
            _ => default.to_string(),
        }
    }

    /// Body of a statement slot: indented one level, never empty.
    pub fn body(&self, slot: &str) -> String {
        let code = self.statements.get(slot).map(String::as_str).unwrap_or("");
        indent_body_if_needed(code, &self.options.indent, &self.options.empty_body)
    }

    pub fn globals(&self) -> &[String] {
        &self.globals
    }

    /// `global a, b` declaration line at body indentation, or nothing.
    pub fn globals_line(&self) -> String {
        if self.globals.is_empty() {
            String::new()
        } else {
            format!("{}global {}\n", self.options.indent, self.globals.join(", "))
        }
    }

    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    pub fn indent(&self) -> &str {
        &self.options.indent
    }
}
