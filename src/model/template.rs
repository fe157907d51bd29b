//! Presentation templates.
//!
//! A template is purely descriptive: the rendering host draws it and the
//! palette projection reads its defaults. The graph model also copies slot
//! declarations and connectors out of it when a node is created.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Capability, Value};

/// How a node connects to its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Chainable statement. `previous` lets it follow another statement,
    /// `next` lets another statement follow it.
    Statement { previous: bool, next: bool },
    /// Expression plugged into a value slot.
    Expression { output: Option<Capability> },
}

impl Shape {
    pub fn is_expression(&self) -> bool {
        matches!(self, Shape::Expression { .. })
    }

    pub fn has_previous(&self) -> bool {
        matches!(self, Shape::Statement { previous: true, .. })
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Shape::Statement { next: true, .. })
    }

    pub fn output(&self) -> Option<Capability> {
        match self {
            Shape::Expression { output } => *output,
            Shape::Statement { .. } => None,
        }
    }
}

/// One entry of a template's argument list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Arg {
    Number { name: String, default: f64, min: Option<f64>, max: Option<f64> },
    Slider { name: String, default: f64, min: f64, max: f64 },
    Text { name: String, default: String },
    MultilineText { name: String, default: String },
    Dropdown { name: String, options: Vec<(String, String)> },
    LedMatrix { name: String, default: String },
    Icon { name: String, default: String },
    /// Value slot holding one expression subgraph.
    Value { name: String, check: Option<Capability> },
    /// Statement slot holding one chain.
    Statement { name: String },
    /// Line break without a connection.
    Dummy,
}

impl Arg {
    pub fn number(name: &str, default: f64) -> Self {
        Arg::Number { name: name.into(), default, min: None, max: None }
    }

    pub fn bounded(name: &str, default: f64, min: f64, max: f64) -> Self {
        Arg::Number { name: name.into(), default, min: Some(min), max: Some(max) }
    }

    pub fn slider(name: &str, default: f64, min: f64, max: f64) -> Self {
        Arg::Slider { name: name.into(), default, min, max }
    }

    pub fn text(name: &str, default: &str) -> Self {
        Arg::Text { name: name.into(), default: default.into() }
    }

    pub fn multiline(name: &str, default: &str) -> Self {
        Arg::MultilineText { name: name.into(), default: default.into() }
    }

    pub fn dropdown(name: &str, options: &[(&str, &str)]) -> Self {
        Arg::Dropdown {
            name: name.into(),
            options: options.iter().map(|(l, v)| (l.to_string(), v.to_string())).collect(),
        }
    }

    pub fn led_matrix(name: &str, default: &str) -> Self {
        Arg::LedMatrix { name: name.into(), default: default.into() }
    }

    pub fn icon(name: &str, default: &str) -> Self {
        Arg::Icon { name: name.into(), default: default.into() }
    }

    pub fn value(name: &str, check: Option<Capability>) -> Self {
        Arg::Value { name: name.into(), check }
    }

    pub fn statement(name: &str) -> Self {
        Arg::Statement { name: name.into() }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Arg::Number { name, .. }
            | Arg::Slider { name, .. }
            | Arg::Text { name, .. }
            | Arg::MultilineText { name, .. }
            | Arg::Dropdown { name, .. }
            | Arg::LedMatrix { name, .. }
            | Arg::Icon { name, .. }
            | Arg::Value { name, .. }
            | Arg::Statement { name } => Some(name),
            Arg::Dummy => None,
        }
    }

    /// Default scalar for field arguments; `None` for slots and dummies.
    /// Dropdowns default to their first option's value.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Arg::Number { default, .. } | Arg::Slider { default, .. } => Some(number(*default)),
            Arg::Text { default, .. }
            | Arg::MultilineText { default, .. }
            | Arg::LedMatrix { default, .. }
            | Arg::Icon { default, .. } => Some(Value::String(default.clone())),
            Arg::Dropdown { options, .. } => {
                options.first().map(|(_, v)| Value::String(v.clone()))
            }
            Arg::Value { .. } | Arg::Statement { .. } | Arg::Dummy => None,
        }
    }

    pub fn is_field(&self) -> bool {
        !matches!(self, Arg::Value { .. } | Arg::Statement { .. } | Arg::Dummy)
    }
}

fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::Int(v as i64)
    } else {
        Value::Float(v)
    }
}

/// Presentation template of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Label with `%1`, `%2`, ... placeholders, one per argument.
    pub message: String,
    pub args: SmallVec<[Arg; 4]>,
    pub shape: Shape,
    pub tooltip: String,
}

impl Template {
    /// Chainable statement with both connectors.
    pub fn statement(message: &str) -> Self {
        Self::with_shape(message, Shape::Statement { previous: true, next: true })
    }

    /// Entry point: nothing may precede it.
    pub fn event(message: &str) -> Self {
        Self::with_shape(message, Shape::Statement { previous: false, next: true })
    }

    pub fn expression(message: &str, output: Option<Capability>) -> Self {
        Self::with_shape(message, Shape::Expression { output })
    }

    fn with_shape(message: &str, shape: Shape) -> Self {
        Self {
            message: message.into(),
            args: SmallVec::new(),
            shape,
            tooltip: String::new(),
        }
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|a| a.is_field())
    }

    pub fn value_slots(&self) -> impl Iterator<Item = (&str, Option<Capability>)> {
        self.args.iter().filter_map(|a| match a {
            Arg::Value { name, check } => Some((name.as_str(), *check)),
            _ => None,
        })
    }

    pub fn statement_slots(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|a| match a {
            Arg::Statement { name } => Some(name.as_str()),
            _ => None,
        })
    }
}
