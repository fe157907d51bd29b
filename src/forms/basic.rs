//! Basic category: text and number display, the LED image forms, pausing,
//! and the two unconditional entry points.

use regex::Captures;

use crate::encoder::{EncodeInput, Fragment, Precedence};
use crate::graph::Graph;
use crate::model::{fields, Arg, Capability, FieldMap, NodeId, Template, Value};
use crate::registry::{Form, Registry};
use crate::Result;
use super::{attach_shadow, discard_on_err, group, parse_int, parse_number};

const BLANK_MATRIX: &str = ".....\n.....\n.....\n.....\n.....";

/// Named 5×5 icons, rows top to bottom, `1` = lit.
pub const ICONS: [(&str, [&str; 5]); 6] = [
    ("HEART", ["01010", "11111", "11111", "01110", "00100"]),
    ("SMALL_HEART", ["00000", "01010", "01110", "00100", "00000"]),
    ("HAPPY", ["00000", "01010", "00000", "10001", "01110"]),
    ("SAD", ["00000", "01010", "01110", "10001", "00000"]),
    ("YES", ["00001", "00010", "00100", "01000", "10000"]),
    ("NO", ["10001", "01010", "00100", "01010", "10001"]),
];

/// Rows of a named icon; unknown names fall back to HEART.
pub fn icon_rows(name: &str) -> [&'static str; 5] {
    ICONS
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(ICONS[0].1, |(_, rows)| *rows)
}

// ============================================================================
// show_string / show_number
// ============================================================================

pub(super) fn show_string() -> Result<Form> {
    let template = Template::statement("show string %1")
        .arg(Arg::value("TEXT", Some(Capability::String)))
        .tooltip("Show a string on the display");
    Ok(Form::new(
        "show_string",
        template,
        r#"basic\.show_string\((?:"([^"]*)"|'([^']*)')\)"#,
        encode_show_string,
    )?
    .with_category("Basic")
    .gated()
    .with_decode(decode_show_string)
    .with_construct(construct_show_string))
}

fn decode_show_string(caps: &Captures<'_>) -> Result<FieldMap> {
    let text = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    Ok(fields([("TEXT", text)]))
}

/// The literal becomes a `text` shadow in the TEXT slot.
fn construct_show_string(
    graph: &mut Graph,
    registry: &Registry,
    form: &Form,
    mut map: FieldMap,
) -> Result<NodeId> {
    let text = map.remove("TEXT");
    let id = graph.create_node(registry, form.type_name(), map)?;
    if let Some(text) = text {
        let shadow = attach_shadow(graph, registry, id, "TEXT", "text", fields([("TEXT", text)]));
        discard_on_err(graph, id, shadow)?;
    }
    Ok(id)
}

fn encode_show_string(input: &EncodeInput<'_>) -> Result<Fragment> {
    let text = input.value("TEXT", Precedence::NONE, "\"\"");
    Ok(Fragment::statement(format!("basic.show_string({text})\n")))
}

pub(super) fn show_number() -> Result<Form> {
    let template = Template::statement("show number %1")
        .arg(Arg::value("NUM", Some(Capability::Number)))
        .tooltip("Show a number on the display");
    Ok(Form::new(
        "show_number",
        template,
        r"basic\.show_number\((-?\d+(?:\.\d+)?)\)",
        encode_show_number,
    )?
    .with_category("Basic")
    .gated()
    .with_decode(decode_show_number)
    .with_construct(construct_show_number))
}

fn decode_show_number(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("NUM", parse_number("show_number", group(caps, 1))?)]))
}

/// The literal becomes a `math_number` shadow in the NUM slot.
fn construct_show_number(
    graph: &mut Graph,
    registry: &Registry,
    form: &Form,
    mut map: FieldMap,
) -> Result<NodeId> {
    let num = map.remove("NUM").unwrap_or(Value::Int(0));
    let id = graph.create_node(registry, form.type_name(), map)?;
    let shadow = attach_shadow(graph, registry, id, "NUM", "math_number", fields([("NUM", num)]));
    discard_on_err(graph, id, shadow)?;
    Ok(id)
}

fn encode_show_number(input: &EncodeInput<'_>) -> Result<Fragment> {
    let num = input.value("NUM", Precedence::NONE, "0");
    Ok(Fragment::statement(format!("basic.show_number({num})\n")))
}

// ============================================================================
// basic_show_leds
// ============================================================================

pub(super) fn basic_show_leds() -> Result<Form> {
    let template = Template::statement("show leds %1")
        .arg(Arg::led_matrix("MATRIX", BLANK_MATRIX))
        .tooltip("Draw a 5×5 image and show it on the LED screen");
    Ok(Form::new(
        "basic_show_leds",
        template,
        r#"basic\.show_leds\(\s*(?:"""|''')([\s\S]*?)(?:"""|''')\s*\)"#,
        encode_basic_show_leds,
    )?
    .with_category("Basic")
    .gated()
    .with_decode(decode_basic_show_leds))
}

/// Keep the first five `#`/`.` markers of the first five lines, padding
/// short rows and missing lines with `.`.
fn normalize_matrix(raw: &str) -> [String; 5] {
    let raw = raw.replace('\r', "");
    let mut lines = raw.split('\n');
    std::array::from_fn(|_| {
        let line = lines.next().unwrap_or("");
        let mut row: String = line.chars().filter(|c| matches!(c, '#' | '.')).take(5).collect();
        while row.len() < 5 {
            row.push('.');
        }
        row
    })
}

fn decode_basic_show_leds(caps: &Captures<'_>) -> Result<FieldMap> {
    let inner = group(caps, 1);
    // Content usually starts on the line after the opening quotes.
    let inner = inner.strip_prefix('\n').unwrap_or(inner);
    Ok(fields([("MATRIX", normalize_matrix(inner).join("\n"))]))
}

fn encode_basic_show_leds(input: &EncodeInput<'_>) -> Result<Fragment> {
    let rows = normalize_matrix(&input.field_text("MATRIX"));
    let body: Vec<String> = rows
        .iter()
        .map(|row| row.chars().map(String::from).collect::<Vec<_>>().join(" "))
        .collect();
    Ok(Fragment::statement(format!("basic.show_leds(\"\"\"\n{}\n\"\"\")\n", body.join("\n"))))
}

// ============================================================================
// pause / show_icon
// ============================================================================

pub(super) fn pause() -> Result<Form> {
    let template = Template::statement("pause %1 ms")
        .arg(Arg::number("TIME", 1000.0))
        .tooltip("Pause execution");
    Ok(Form::new("pause", template, r"basic\.pause\((\d+)\)", encode_pause)?
        .with_category("Basic")
        .gated()
        .with_decode(decode_pause))
}

fn decode_pause(caps: &Captures<'_>) -> Result<FieldMap> {
    Ok(fields([("TIME", parse_int("pause", caps, 1)?)]))
}

fn encode_pause(input: &EncodeInput<'_>) -> Result<Fragment> {
    Ok(Fragment::statement(format!("basic.pause({})\n", input.field_or("TIME", "1000"))))
}

pub(super) fn show_icon() -> Result<Form> {
    let template = Template::statement("show icon %1")
        .arg(Arg::icon("ICON", "HEART"))
        .tooltip("Show a predefined icon on the LED matrix");
    Ok(Form::new("show_icon", template, r"display\.show\(Image\.([A-Z_]+)\)", encode_show_icon)?
        .with_category("Basic")
        .gated()
        .with_decode(decode_show_icon))
}

fn decode_show_icon(caps: &Captures<'_>) -> Result<FieldMap> {
    let name = group(caps, 1).to_uppercase();
    let known = ICONS.iter().any(|(n, _)| *n == name);
    Ok(fields([("ICON", if known { name } else { "HEART".to_string() })]))
}

/// Clear the whole matrix, then light the icon's pixels.
fn encode_show_icon(input: &EncodeInput<'_>) -> Result<Fragment> {
    let rows = icon_rows(&input.field_text("ICON"));
    let mut code = String::new();
    for y in 0..5 {
        for x in 0..5 {
            code.push_str(&format!("led.unplot({x}, {y})\n"));
        }
    }
    for (y, row) in rows.iter().enumerate() {
        for (x, c) in row.chars().enumerate() {
            if c == '1' {
                code.push_str(&format!("led.plot({x}, {y})\n"));
            }
        }
    }
    Ok(Fragment::statement(code))
}

// ============================================================================
// Entry points
// ============================================================================

pub(super) fn forever() -> Result<Form> {
    let template = Template::statement("forever %1 %2")
        .arg(Arg::Dummy)
        .arg(Arg::statement("DO"))
        .tooltip("Runs code forever");
    Ok(Form::new(
        "forever",
        template,
        r"^(?:def\s+on_forever\s*\(\s*\)\s*:|while\s+True\s*:)",
        encode_forever,
    )?
    .with_category("Basic")
    .container())
}

fn encode_forever(input: &EncodeInput<'_>) -> Result<Fragment> {
    Ok(Fragment::statement(format!(
        "def on_forever():\n{}{}basic.forever(on_forever)\n",
        input.globals_line(),
        input.body("DO"),
    )))
}

pub(super) fn on_start() -> Result<Form> {
    let template = Template::event("on start %1 %2")
        .arg(Arg::Dummy)
        .arg(Arg::statement("DO"))
        .tooltip("Runs once at the start");
    Ok(Form::new("on_start", template, r"def\s+on_start\(\s*\)\s*:", encode_on_start)?
        .with_category("Basic")
        .container())
}

fn encode_on_start(input: &EncodeInput<'_>) -> Result<Fragment> {
    Ok(Fragment::statement(format!(
        "def on_start():\n{}{}\non_start()\n",
        input.globals_line(),
        input.body("DO"),
    )))
}
