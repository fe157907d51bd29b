//! Math category: literals and binary arithmetic.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::model::{fields, Arg, Capability, FieldMap, Template};
use crate::registry::Form;
use crate::{Error, Result};
use super::{construct_with_arguments, decode_error, group, parse_number, strip_parens};

// ============================================================================
// Operator splitting
// ============================================================================

const OPERATORS: [&str; 11] = ["**", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/"];

/// Binary operators at nesting depth zero, outside string literals, as
/// `(byte offset, operator)`. A `+` or `-` that opens an operand is a sign,
/// not an operator.
pub(super) fn top_level_operators(text: &str) -> Vec<(usize, &'static str)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    // True while the next token starts an operand.
    let mut expect_operand = true;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                quote = Some(b);
                expect_operand = false;
            }
            b'(' | b'[' => {
                depth += 1;
                expect_operand = true;
            }
            b')' | b']' => {
                depth -= 1;
                expect_operand = false;
            }
            b' ' | b'\t' => {}
            _ if !b.is_ascii() => expect_operand = false,
            _ => {
                let op = OPERATORS.iter().find(|op| text[i..].starts_with(**op));
                match op {
                    Some(op) if depth == 0 && !expect_operand => {
                        found.push((i, *op));
                        expect_operand = true;
                        i += op.len();
                        continue;
                    }
                    Some(op) => {
                        i += op.len();
                        continue;
                    }
                    None => expect_operand = false,
                }
            }
        }
        i += 1;
    }
    found
}

/// Split `text` at one of `ops` found at the top level: the rightmost
/// occurrence for left-associative operators, the leftmost otherwise.
/// Both operands must be non-empty.
pub fn split_binary<'t>(
    text: &'t str,
    ops: &[&str],
    rightmost: bool,
) -> Option<(&'t str, &'t str, &'t str)> {
    let candidates = top_level_operators(text).into_iter().filter(|(_, op)| ops.contains(op));
    let (at, op) = if rightmost { candidates.last()? } else { candidates.into_iter().next()? };
    let lhs = text[..at].trim();
    let rhs = text[at + op.len()..].trim();
    if lhs.is_empty() || rhs.is_empty() {
        return None;
    }
    Some((lhs, &text[at..at + op.len()], rhs))
}

// ============================================================================
// Literals
// ============================================================================

pub(super) fn text() -> Result<Form> {
    let template = Template::expression("%1", Some(Capability::String))
        .arg(Arg::text("TEXT", ""))
        .tooltip("A text value");
    Ok(Form::new("text", template, r#""([^"]*)"|'([^']*)'"#, encode_text)?
        .with_category("Math")
        .with_decode(decode_text))
}

fn decode_text(caps: &Captures<'_>) -> Result<FieldMap> {
    let text = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    Ok(fields([("TEXT", text)]))
}

/// Emitted as a JSON string literal, which the dialect reads as a string.
fn encode_text(input: &EncodeInput<'_>) -> Result<Fragment> {
    let code = serde_json::to_string(&input.field_text("TEXT"))
        .map_err(|e| Error::Encode(format!("text literal: {e}")))?;
    Ok(Fragment::expression(code, Precedence::ATOMIC))
}

pub(super) fn math_number() -> Result<Form> {
    let template = Template::expression("%1", Some(Capability::Number))
        .arg(Arg::number("NUM", 0.0))
        .tooltip("A number");
    Ok(Form::new("math_number", template, r"^-?\d+(?:\.\d+)?$", encode_math_number)?
        .with_category("Math")
        .with_decode(decode_math_number))
}

fn decode_math_number(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("NUM", parse_number("math_number", group(caps, 0))?)]))
}

fn encode_math_number(input: &EncodeInput<'_>) -> Result<Fragment> {
    let code = input.field_or("NUM", "0");
    let precedence = if code.starts_with('-') { Precedence::UNARY } else { Precedence::ATOMIC };
    Ok(Fragment::expression(code, precedence))
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `(code, symbol, precedence)`, loosest level first.
const ARITHMETIC: [(&str, &str, Precedence); 5] = [
    ("ADD", "+", Precedence::ADDITIVE),
    ("MINUS", "-", Precedence::ADDITIVE),
    ("MULTIPLY", "*", Precedence::MULTIPLICATIVE),
    ("DIVIDE", "/", Precedence::MULTIPLICATIVE),
    ("POWER", "**", Precedence::EXPONENT),
];

pub(super) fn math_arithmetic() -> Result<Form> {
    let template = Template::expression("%1 %2 %3", Some(Capability::Number))
        .arg(Arg::value("A", Some(Capability::Number)))
        .arg(Arg::dropdown(
            "OP",
            &[("+", "ADD"), ("-", "MINUS"), ("×", "MULTIPLY"), ("÷", "DIVIDE"), ("^", "POWER")],
        ))
        .arg(Arg::value("B", Some(Capability::Number)))
        .tooltip("Arithmetic on two numbers");
    Ok(Form::new(
        "math_arithmetic",
        template,
        r"^.+?\s*(?:\*\*|[-+*/])\s*.+$",
        encode_math_arithmetic,
    )?
    .with_category("Math")
    .with_decode(decode_math_arithmetic)
    .with_construct(construct_with_arguments))
}

fn decode_math_arithmetic(caps: &Captures<'_>) -> Result<FieldMap> {
    let text = strip_parens(group(caps, 0).trim());
    let (a, symbol, b) = split_binary(text, &["+", "-"], true)
        .or_else(|| split_binary(text, &["*", "/"], true))
        .or_else(|| split_binary(text, &["**"], false))
        .ok_or_else(|| decode_error("math_arithmetic", format!("no operator in '{text}'")))?;
    let op = ARITHMETIC
        .iter()
        .find(|(_, s, _)| *s == symbol)
        .map(|(code, _, _)| *code)
        .ok_or_else(|| decode_error("math_arithmetic", format!("operator '{symbol}'")))?;
    Ok(fields([("A", a), ("OP", op), ("B", b)]))
}

fn encode_math_arithmetic(input: &EncodeInput<'_>) -> Result<Fragment> {
    let op = input.field_text("OP");
    let (_, symbol, precedence) = ARITHMETIC
        .iter()
        .find(|(code, _, _)| *code == op)
        .copied()
        .unwrap_or(ARITHMETIC[0]);
    // `-` and `/` do not associate to the right; `**` does not to the left.
    let (left, right) = match op.as_str() {
        "MINUS" | "DIVIDE" => (precedence, precedence.tighter()),
        "POWER" => (precedence.tighter(), precedence),
        _ => (precedence, precedence),
    };
    let a = input.value("A", left, "0");
    let b = input.value("B", right, "0");
    Ok(Fragment::expression(format!("{a} {symbol} {b}"), precedence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::encoder::Encoder;
    use crate::registry::Registry;
    use crate::model::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_respects_signs_and_nesting() {
        assert_eq!(split_binary("x * -1", &["*"], true), Some(("x", "*", "-1")));
        assert_eq!(split_binary("-3", &["-"], true), None);
        assert_eq!(split_binary("f(a - b) - c", &["-"], true), Some(("f(a - b)", "-", "c")));
        assert_eq!(split_binary("\"a-b\" + c", &["-"], true), None);
        assert_eq!(split_binary("1 - 2 - 3", &["-"], true), Some(("1 - 2", "-", "3")));
        assert_eq!(split_binary("2 ** 3 ** 2", &["**"], false), Some(("2", "**", "3 ** 2")));
        assert_eq!(split_binary("a <= b", &["<=", "<"], false), Some(("a", "<=", "b")));
    }

    #[test]
    fn test_decode_picks_loosest_operator() {
        let form = math_arithmetic().unwrap();
        let caps = form.matches("2 * 3 + 1").unwrap();
        let map = form.decode(&caps).unwrap();
        assert_eq!(map.get("A"), Some(&Value::from("2 * 3")));
        assert_eq!(map.get("OP"), Some(&Value::from("ADD")));
        assert_eq!(map.get("B"), Some(&Value::from("1")));
    }

    #[test]
    fn test_arithmetic_round_trip_keeps_grouping() {
        let reg = Registry::builtin().unwrap();
        let mut g = Graph::new();
        let form = reg.get("math_arithmetic").unwrap();
        for text in ["1 - (2 - 3)", "(1 + 2) * 3", "2 ** 3", "x / (y * 2)"] {
            let caps = form.matches(text).unwrap();
            let id = form.construct(&mut g, &reg, form.decode(&caps).unwrap()).unwrap();
            assert_eq!(Encoder::new(&reg).encode(&g, id).unwrap(), text);
        }
    }

    #[test]
    fn test_text_is_json_quoted() {
        let reg = Registry::builtin().unwrap();
        let mut g = Graph::new();
        let id = g.create_node(&reg, "text", fields([("TEXT", "say \"hi\"")])).unwrap();
        let frag = Encoder::new(&reg).encode_fragment(&g, id).unwrap();
        assert_eq!(frag, Fragment::expression(r#""say \"hi\"""#, Precedence::ATOMIC));
    }

    #[test]
    fn test_negative_number_binds_as_unary() {
        let reg = Registry::builtin().unwrap();
        let mut g = Graph::new();
        let id = g.create_node(&reg, "math_number", fields([("NUM", -2)])).unwrap();
        let frag = Encoder::new(&reg).encode_fragment(&g, id).unwrap();
        assert_eq!(frag, Fragment::expression("-2", Precedence::UNARY));
    }
}
