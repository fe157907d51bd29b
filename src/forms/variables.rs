//! Variables: assignment, compound assignment and reads.
//!
//! The VAR field holds either a display name or a host variable id; the
//! encoder resolves it before these forms see it.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::model::{fields, Arg, Capability, FieldMap, Template};
use crate::registry::Form;
use crate::Result;
use super::{construct_with_arguments, decode_error, group};

/// Words that read like identifiers but never name a variable.
const KEYWORDS: [&str; 12] = [
    "pass", "break", "continue", "return", "else", "global", "None", "and", "or", "not", "def",
    "while",
];

fn name(input: &EncodeInput<'_>) -> String {
    input.variable().map_or_else(|| input.field_text("VAR"), str::to_string)
}

pub(super) fn math_change() -> Result<Form> {
    let template = Template::statement("change %1 by %2")
        .arg(Arg::text("VAR", "x"))
        .arg(Arg::value("DELTA", Some(Capability::Number)))
        .tooltip("Add a number to a variable");
    Ok(Form::new("math_change", template, r"^([A-Za-z_]\w*)\s*\+=\s*(.+)$", encode_math_change)?
        .with_category("Variables")
        .with_variable("VAR")
        .with_decode(decode_math_change)
        .with_construct(construct_with_arguments))
}

fn decode_math_change(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("VAR", group(caps, 1)), ("DELTA", group(caps, 2).trim())]))
}

fn encode_math_change(input: &EncodeInput<'_>) -> Result<Fragment> {
    let delta = input.value("DELTA", Precedence::NONE, "1");
    Ok(Fragment::statement(format!("{} += {delta}\n", name(input))))
}

pub(super) fn variables_set() -> Result<Form> {
    let template = Template::statement("set %1 to %2")
        .arg(Arg::text("VAR", "x"))
        .arg(Arg::value("VALUE", None))
        .tooltip("Assign a value to a variable");
    Ok(Form::new("variables_set", template, r"^([A-Za-z_]\w*)\s*=\s*([^=].*)$", encode_variables_set)?
        .with_category("Variables")
        .with_variable("VAR")
        .with_decode(decode_variables_set)
        .with_construct(construct_with_arguments))
}

fn decode_variables_set(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("VAR", group(caps, 1)), ("VALUE", group(caps, 2).trim())]))
}

fn encode_variables_set(input: &EncodeInput<'_>) -> Result<Fragment> {
    let rhs = input.value("VALUE", Precedence::NONE, "0");
    Ok(Fragment::statement(format!("{} = {rhs}\n", name(input))))
}

pub(super) fn variables_get() -> Result<Form> {
    let template = Template::expression("%1", None)
        .arg(Arg::text("VAR", "x"))
        .tooltip("Read a variable");
    Ok(Form::new("variables_get", template, r"^[A-Za-z_]\w*$", |input| {
        Ok(Fragment::expression(name(input), Precedence::ATOMIC))
    })?
    .with_category("Variables")
    .with_variable("VAR")
    .with_decode(decode_variables_get))
}

fn decode_variables_get(caps: &Captures<'_>) -> Result<FieldMap> {
    let word = group(caps, 0);
    if KEYWORDS.contains(&word) {
        return Err(decode_error("variables_get", format!("'{word}' is a keyword")));
    }
    Ok(fields([("VAR", word)]))
}
