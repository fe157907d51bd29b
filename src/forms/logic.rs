//! Logic category: conditionals, comparisons and boolean literals.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::graph::Graph;
use crate::model::{fields, Arg, Capability, FieldMap, NodeId, Slot, Template};
use crate::registry::Form;
use crate::Result;
use super::math::top_level_operators;
use super::{construct_with_arguments, decode_error, group, split_binary, strip_parens};

// ============================================================================
// controls_if
// ============================================================================

pub(super) fn controls_if() -> Result<Form> {
    let template = Template::statement("if %1 %2")
        .arg(Arg::value("IF0", Some(Capability::Boolean)))
        .arg(Arg::statement("DO0"))
        .tooltip("If / else if / else");
    Ok(Form::new("controls_if", template, r"\bif\b\s*([^:]*):", encode_controls_if)?
        .with_category("Logic")
        .gated()
        .with_decode(decode_controls_if)
        .with_construct(construct_with_arguments))
}

fn decode_controls_if(caps: &Captures<'_>) -> Result<FieldMap> {
    let condition = group(caps, 1).trim();
    if condition.is_empty() {
        return Ok(FieldMap::new());
    }
    Ok(fields([("IF0", condition)]))
}

fn encode_controls_if(input: &EncodeInput<'_>) -> Result<Fragment> {
    let mut code = format!(
        "if {}:\n{}",
        input.value("IF0", Precedence::NONE, "True"),
        input.body("DO0")
    );
    let mut n = 1;
    while input.has_slot(&format!("IF{n}")) {
        code.push_str(&format!(
            "elif {}:\n{}",
            input.value(&format!("IF{n}"), Precedence::NONE, "False"),
            input.body(&format!("DO{n}"))
        ));
        n += 1;
    }
    if input.has_slot("ELSE") {
        code.push_str(&format!("else:\n{}", input.body("ELSE")));
    }
    Ok(Fragment::statement(code))
}

/// Give an if node one more `elif` arm; returns the arm's index.
pub fn add_else_if(graph: &mut Graph, id: NodeId) -> Result<usize> {
    let node = graph.get(id)?;
    let n = (1..)
        .find(|n| node.slot(&format!("IF{n}")).is_none())
        .unwrap_or(1);
    graph.add_value_slot(id, &format!("IF{n}"), Some(Capability::Boolean))?;
    graph.add_statement_slot(id, &format!("DO{n}"))?;
    Ok(n)
}

/// Give an if node its `else` arm. Adding it twice is a no-op.
pub fn add_else(graph: &mut Graph, id: NodeId) -> Result<()> {
    graph.add_statement_slot(id, "ELSE")
}

/// Number of `if`/`elif` arms and whether an `else` arm exists.
pub fn arms(graph: &Graph, id: NodeId) -> Result<(usize, bool)> {
    let node = graph.get(id)?;
    let conditions = node
        .slots
        .iter()
        .filter(|(name, slot)| name.starts_with("IF") && matches!(slot, Slot::Value { .. }))
        .count();
    Ok((conditions, node.slot("ELSE").is_some()))
}

// ============================================================================
// Comparisons and literals
// ============================================================================

/// `(code, symbol)`.
const COMPARISONS: [(&str, &str); 6] = [
    ("EQ", "=="),
    ("NEQ", "!="),
    ("LTE", "<="),
    ("GTE", ">="),
    ("LT", "<"),
    ("GT", ">"),
];

pub(super) fn logic_compare() -> Result<Form> {
    let template = Template::expression("%1 %2 %3", Some(Capability::Boolean))
        .arg(Arg::value("A", None))
        .arg(Arg::dropdown(
            "OP",
            &[("=", "EQ"), ("≠", "NEQ"), ("<", "LT"), ("≤", "LTE"), (">", "GT"), ("≥", "GTE")],
        ))
        .arg(Arg::value("B", None))
        .tooltip("Compare two values");
    Ok(Form::new(
        "logic_compare",
        template,
        r"^(.+?)\s*(==|!=|<=|>=|<|>)\s*(.+)$",
        encode_logic_compare,
    )?
    .with_category("Logic")
    .with_decode(decode_logic_compare)
    .with_construct(construct_with_arguments))
}

fn decode_logic_compare(caps: &Captures<'_>) -> Result<FieldMap> {
    let text = strip_parens(group(caps, 0).trim());
    let symbols: Vec<&str> = COMPARISONS.iter().map(|(_, s)| *s).collect();
    // `0 < x < 5` is `0 < x and x < 5` in the dialect; a two-operand block
    // cannot hold it.
    let chained = top_level_operators(text)
        .iter()
        .filter(|(_, op)| symbols.contains(op))
        .count();
    if chained > 1 {
        return Err(decode_error("logic_compare", format!("chained comparison '{text}'")));
    }
    let (a, symbol, b) = split_binary(text, &symbols, false)
        .ok_or_else(|| decode_error("logic_compare", format!("no comparison in '{text}'")))?;
    let op = COMPARISONS
        .iter()
        .find(|(_, s)| *s == symbol)
        .map_or("EQ", |(code, _)| *code);
    Ok(fields([("A", a), ("OP", op), ("B", b)]))
}

fn encode_logic_compare(input: &EncodeInput<'_>) -> Result<Fragment> {
    let op = input.field_text("OP");
    let symbol = COMPARISONS
        .iter()
        .find(|(code, _)| *code == op)
        .map_or("==", |(_, s)| *s);
    // Comparisons chain in the dialect; a nested comparison keeps its parens.
    let operand = Precedence::RELATIONAL.tighter();
    let a = input.value("A", operand, "0");
    let b = input.value("B", operand, "0");
    Ok(Fragment::expression(format!("{a} {symbol} {b}"), Precedence::RELATIONAL))
}

pub(super) fn logic_boolean() -> Result<Form> {
    let template = Template::expression("%1", Some(Capability::Boolean))
        .arg(Arg::dropdown("BOOL", &[("true", "TRUE"), ("false", "FALSE")]))
        .tooltip("Returns either true or false");
    Ok(Form::new("logic_boolean", template, r"^(True|False)$", encode_logic_boolean)?
        .with_category("Logic")
        .with_decode(decode_logic_boolean))
}

fn decode_logic_boolean(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("BOOL", group(caps, 1).to_uppercase())]))
}

fn encode_logic_boolean(input: &EncodeInput<'_>) -> Result<Fragment> {
    let code = if input.field_text("BOOL") == "FALSE" { "False" } else { "True" };
    Ok(Fragment::expression(code, Precedence::ATOMIC))
}
