//! # Built-in Forms
//!
//! The catalog shipped with the crate: display, LED, input, pin and music
//! statements for the micro:bit dialect, plus the expression and variable
//! forms the statements take as arguments.
//!
//! Registration order matters. Assignments come first so that
//! `x = led.point(1, 2)` decodes as an assignment rather than a bare
//! `led.point` expression, and the catch-all expression forms
//! (`text`, `math_number`, `variables_get`) come last.
//!
//! Forms with value slots carry their argument as source text in the decoded
//! field map, keyed by the slot name. The construct function turns that text
//! into an expression node through `Registry::expression_for`.

mod basic;
mod input;
mod led;
mod logic;
mod math;
mod music;
mod pins;
mod variables;

pub use basic::{icon_rows, ICONS};
pub use logic::{add_else, add_else_if, arms};
pub use math::split_binary;

use regex::Captures;
use tracing::{debug, warn};

use crate::graph::Graph;
use crate::model::{FieldMap, NodeId, Value};
use crate::registry::{Form, Registry};
use crate::{Error, Result};

type Builder = fn() -> Result<Form>;

const BUILTIN: [Builder; 30] = [
    variables::math_change,
    variables::variables_set,
    basic::show_string,
    basic::show_number,
    basic::basic_show_leds,
    basic::pause,
    led::plot_led,
    led::unplot_led,
    led::show_leds,
    basic::show_icon,
    led::plot_led_brightness,
    led::toggle_led,
    led::point_led,
    logic::controls_if,
    input::on_button_pressed,
    input::button_is_pressed,
    basic::forever,
    basic::on_start,
    input::microbit_accelerometer,
    pins::microbit_pin_read,
    pins::microbit_pin_write,
    music::music_play_tone,
    music::music_ring_tone,
    music::music_rest,
    math::text,
    logic::logic_compare,
    math::math_arithmetic,
    logic::logic_boolean,
    math::math_number,
    variables::variables_get,
];

/// Register the built-in catalog into `registry`, in precedence order.
pub fn register_builtin(registry: &mut Registry) -> Result<()> {
    for build in BUILTIN {
        registry.register(build()?)?;
    }
    debug!(forms = registry.len(), "registered built-in forms");
    Ok(())
}

// ============================================================================
// Decode helpers
// ============================================================================

pub(crate) fn decode_error(type_name: &str, message: impl Into<String>) -> Error {
    Error::Decode { type_name: type_name.to_string(), message: message.into() }
}

/// Capture group `i` as text; empty when the group did not take part.
pub(crate) fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

pub(crate) fn parse_int(type_name: &str, caps: &Captures<'_>, i: usize) -> Result<Value> {
    let raw = group(caps, i);
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|e| decode_error(type_name, format!("'{raw}': {e}")))
}

pub(crate) fn parse_number(type_name: &str, raw: &str) -> Result<Value> {
    raw.trim()
        .parse::<f64>()
        .map(number_value)
        .map_err(|e| decode_error(type_name, format!("'{raw}': {e}")))
}

/// Whole numbers are stored as integers so they print without a fraction.
pub(crate) fn number_value(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        Value::Int(v as i64)
    } else {
        Value::Float(v)
    }
}

// ============================================================================
// Construct helpers
// ============================================================================

/// Create the node, then turn every value-slot argument carried in `fields`
/// into an attached expression.
pub(crate) fn construct_with_arguments(
    graph: &mut Graph,
    registry: &Registry,
    form: &Form,
    mut fields: FieldMap,
) -> Result<NodeId> {
    let arguments: Vec<(String, String)> = form
        .template()
        .value_slots()
        .filter_map(|(slot, _)| fields.remove(slot).map(|v| (slot.to_string(), v.to_string())))
        .collect();

    let id = graph.create_node(registry, form.type_name(), fields)?;
    let attached = arguments
        .iter()
        .try_for_each(|(slot, text)| attach_argument(graph, registry, id, slot, text).map(drop));
    discard_on_err(graph, id, attached)?;
    Ok(id)
}

/// On error, remove `id` together with everything attached to it, so a
/// failed construct leaves no partial nodes behind.
pub(crate) fn discard_on_err<T>(graph: &mut Graph, id: NodeId, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        debug!(node = %id, error = %e, "discarding partially built node");
        if let Err(cleanup) = graph.remove_node(id) {
            warn!(node = %id, error = %cleanup, "partial node could not be removed");
        }
    }
    result
}

/// Decode `text` with the first expression form spanning all of it and plug
/// the result into `slot`. Text no form understands, or an expression the
/// slot refuses, leaves the slot empty.
pub(crate) fn attach_argument(
    graph: &mut Graph,
    registry: &Registry,
    parent: NodeId,
    slot: &str,
    text: &str,
) -> Result<Option<NodeId>> {
    let text = strip_parens(text.trim());
    if text.is_empty() {
        return Ok(None);
    }
    let Some((form, caps)) = registry.expression_for(text) else {
        debug!(node = %parent, slot, text, "no expression form for argument");
        return Ok(None);
    };
    let fields = form.decode(&caps)?;
    let child = form.construct(graph, registry, fields)?;
    if let Err(e) = graph.connect_value(parent, slot, child) {
        warn!(node = %parent, slot, text, error = %e, "argument rejected by slot");
        graph.remove_node(child)?;
        return Ok(None);
    }
    Ok(Some(child))
}

/// Attach a shadow literal of `type_name` to `slot`.
pub(crate) fn attach_shadow(
    graph: &mut Graph,
    registry: &Registry,
    parent: NodeId,
    slot: &str,
    type_name: &str,
    fields: FieldMap,
) -> Result<NodeId> {
    let literal = graph.create_shadow(registry, type_name, fields)?;
    let connected = graph.connect_value(parent, slot, literal);
    discard_on_err(graph, literal, connected)?;
    Ok(literal)
}

/// Drop one pair of parentheses wrapping the whole of `text`.
pub(crate) fn strip_parens(text: &str) -> &str {
    let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        return text;
    };
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                // `(a) + (b)`: the outer pair does not belong together.
                if depth < 0 {
                    return text;
                }
            }
            _ => {}
        }
    }
    if depth == 0 { strip_parens(inner.trim()) } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fields, Slot};

    fn setup() -> (Registry, Graph) {
        (Registry::builtin().unwrap(), Graph::new())
    }

    #[test]
    fn test_builtin_registers_thirty_forms() {
        let (reg, _) = setup();
        assert_eq!(reg.len(), 30);
        let expected_head = ["math_change", "variables_set", "show_string", "show_number"];
        let head: Vec<_> = reg.forms().take(4).map(Form::type_name).collect();
        assert_eq!(head, expected_head);
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut reg = Registry::builtin().unwrap();
        assert!(matches!(register_builtin(&mut reg), Err(Error::DuplicateType(_))));
    }

    #[test]
    fn test_strip_parens() {
        assert_eq!(strip_parens("(1 + 2)"), "1 + 2");
        assert_eq!(strip_parens("((x))"), "x");
        assert_eq!(strip_parens("(a) + (b)"), "(a) + (b)");
        assert_eq!(strip_parens("f(x)"), "f(x)");
    }

    #[test]
    fn test_attach_argument_builds_expression() {
        let (reg, mut g) = setup();
        let set = g.create_node(&reg, "variables_set", fields([("VAR", "x")])).unwrap();
        let child = attach_argument(&mut g, &reg, set, "VALUE", "led.point(1, 2)").unwrap().unwrap();
        let node = g.get(child).unwrap();
        assert_eq!(node.type_name, "point_led");
        assert_eq!(node.get("X"), Some(&Value::Int(1)));
        assert_eq!(g.get(set).unwrap().value_child("VALUE"), Some(child));
    }

    #[test]
    fn test_attach_argument_refused_by_capability() {
        let (reg, mut g) = setup();
        let show = g.create_node(&reg, "show_number", FieldMap::new()).unwrap();
        // A string cannot go into a Number slot; nothing is left behind.
        let before = g.len();
        assert_eq!(attach_argument(&mut g, &reg, show, "NUM", "\"hi\"").unwrap(), None);
        assert_eq!(g.len(), before);
        assert!(matches!(g.get(show).unwrap().slot("NUM"), Some(Slot::Value { child: None, .. })));
    }

    #[test]
    fn test_failed_argument_discards_whole_construct() {
        let (reg, mut g) = setup();
        let form = reg.get("controls_if").unwrap();
        let caps = form.matches("if x == None:").unwrap();
        let map = form.decode(&caps).unwrap();
        assert!(matches!(form.construct(&mut g, &reg, map), Err(Error::Decode { .. })));
        assert!(g.is_empty());
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(3.0), Value::Int(3));
        assert_eq!(number_value(-0.5), Value::Float(-0.5));
    }
}
