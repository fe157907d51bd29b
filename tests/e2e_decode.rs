//! End-to-end tests for text → graph conversion.
//!
//! Each test decodes a document with the built-in registry and inspects the
//! resulting nodes, their fields, slot contents and chain links.

use blockbridge::{
    fields, DecodeOutcome, Decoder, Form, Graph, NodeId, Registry, Template, Transducer, Value,
};
use blockbridge::{EncodeInput, Fragment};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// Helper: decode with the built-in catalog
// ============================================================================

fn decode(text: &str) -> (Graph, DecodeOutcome) {
    init_tracing();
    let bridge = Transducer::builtin().unwrap();
    let mut graph = Graph::new();
    let outcome = bridge.decode(&mut graph, text);
    (graph, outcome)
}

fn type_of(graph: &Graph, id: NodeId) -> String {
    graph.get(id).unwrap().type_name.clone()
}

// ============================================================================
// 1. Sequencing
// ============================================================================

#[test]
fn test_two_lines_are_chained() {
    let (graph, out) = decode("basic.pause(1000)\nled.plot(0, 0)");

    assert_eq!(out.nodes.len(), 2);
    let first = graph.get(out.nodes[0]).unwrap();
    assert_eq!(first.type_name, "pause");
    assert_eq!(first.get("TIME"), Some(&Value::Int(1000)));
    assert_eq!(first.next, Some(out.nodes[1]));
    assert_eq!(graph.get(out.nodes[1]).unwrap().parent, Some(out.nodes[0]));
    assert_eq!(graph.roots(), vec![out.nodes[0]]);
}

#[test]
fn test_long_program_forms_one_chain() {
    let text = "\
basic.show_string(\"Hello\")
basic.show_number(42)
led.toggle(4, 4)
music.play_tone(262, 0.5)
pin0.write_analog(1023)
";
    let (graph, out) = decode(text);

    let kinds: Vec<_> = out.nodes.iter().map(|id| type_of(&graph, *id)).collect();
    assert_eq!(
        kinds,
        ["show_string", "show_number", "toggle_led", "music_play_tone", "microbit_pin_write"]
    );
    assert_eq!(graph.chain(out.nodes[0]), out.nodes);
    assert!(out.is_clean());
}

// ============================================================================
// 2. Unrecognised input
// ============================================================================

#[test]
fn test_not_code_yields_empty_graph() {
    let (graph, out) = decode("this is not code");
    assert!(graph.is_empty());
    assert!(out.nodes.is_empty());
    assert!(out.failures.is_empty());
}

#[test]
fn test_unsupported_lines_are_skipped_between_statements() {
    let (graph, out) = decode("led.plot(1, 1)\nimport random\nfor i in range(3):\nled.plot(2, 2)");
    assert_eq!(out.nodes.len(), 2);
    assert_eq!(out.unmatched, vec![2, 3]);
    assert_eq!(graph.get(out.nodes[0]).unwrap().next, Some(out.nodes[1]));
}

#[test]
fn test_comments_and_blank_lines() {
    let (_, out) = decode("# show something\n\n   # indented comment\nbasic.pause(5)\n");
    assert_eq!(out.nodes.len(), 1);
    assert!(out.unmatched.is_empty());
}

// ============================================================================
// 2b. Failed lines leave nothing behind
// ============================================================================

fn encoded(graph: &Graph) -> String {
    Transducer::builtin().unwrap().encode_graph(graph).unwrap()
}

#[test]
fn test_rejected_argument_fails_the_whole_line() {
    for (text, type_name) in [("x = None", "variables_set"), ("if x == None:", "controls_if")] {
        let (graph, out) = decode(text);
        assert!(out.nodes.is_empty(), "{text}");
        assert_eq!(out.failures.len(), 1, "{text}");
        assert_eq!(out.failures[0].type_name, type_name);
        assert_eq!(graph.len(), 0, "{text}");
        assert_eq!(encoded(&graph), "");
    }
}

#[test]
fn test_failed_line_between_statements() {
    let (graph, out) = decode("music.rest(2)\nx = None\nmusic.rest(1)");
    assert_eq!(out.nodes.len(), 2);
    assert_eq!(out.failures[0].line, 2);
    assert_eq!(graph.len(), 2);
    assert_eq!(encoded(&graph), "music.rest(2)\nmusic.rest(1)\n");
}

#[test]
fn test_chained_comparison_is_not_mistranslated() {
    for text in ["x = 0 < y <= 3", "if 0 < x < 5:"] {
        let (graph, out) = decode(text);
        assert!(out.nodes.is_empty(), "{text}");
        assert_eq!(out.failures.len(), 1, "{text}");
        assert!(graph.is_empty(), "{text}");
    }
    // A bracketed inner comparison is an ordinary operand.
    let (graph, out) = decode("ok = x == (y < 5)");
    assert_eq!(out.nodes.len(), 1);
    assert_eq!(encoded(&graph), "ok = x == (y < 5)\n");
}

// ============================================================================
// 3. Arguments become expression nodes
// ============================================================================

#[test]
fn test_show_string_literal_is_text_shadow() {
    let (graph, out) = decode("basic.show_string('Hi there')");
    let show = graph.get(out.nodes[0]).unwrap();
    let literal = graph.get(show.value_child("TEXT").unwrap()).unwrap();
    assert_eq!(literal.type_name, "text");
    assert!(literal.shadow);
    assert_eq!(literal.get("TEXT"), Some(&Value::from("Hi there")));
}

#[test]
fn test_assignment_takes_precedence_over_its_value() {
    let (graph, out) = decode("lit = led.point(1, 2)");
    assert_eq!(out.nodes.len(), 1);
    let set = graph.get(out.nodes[0]).unwrap();
    assert_eq!(set.type_name, "variables_set");
    assert_eq!(set.get("VAR"), Some(&Value::from("lit")));
    assert_eq!(type_of(&graph, set.value_child("VALUE").unwrap()), "point_led");
}

#[test]
fn test_compound_assignment_with_arithmetic() {
    let (graph, out) = decode("total += score * 2");
    let change = graph.get(out.nodes[0]).unwrap();
    assert_eq!(change.type_name, "math_change");
    let delta = graph.get(change.value_child("DELTA").unwrap()).unwrap();
    assert_eq!(delta.type_name, "math_arithmetic");
    assert_eq!(delta.get("OP"), Some(&Value::from("MULTIPLY")));
    assert_eq!(type_of(&graph, delta.value_child("A").unwrap()), "variables_get");
    assert_eq!(type_of(&graph, delta.value_child("B").unwrap()), "math_number");
}

#[test]
fn test_if_condition_is_attached() {
    let (graph, out) = decode("if input.button_is_pressed(Button.A):");
    let cond = graph.get(out.nodes[0]).unwrap().value_child("IF0").unwrap();
    let cond = graph.get(cond).unwrap();
    assert_eq!(cond.type_name, "button_is_pressed");
    assert_eq!(cond.get("BUTTON"), Some(&Value::from("A")));
}

#[test]
fn test_handler_headers() {
    let (graph, out) = decode("def on_button_pressed_b():\ndef on_forever():\nwhile True:\ndef on_start():");
    let kinds: Vec<_> = out.nodes.iter().map(|id| type_of(&graph, *id)).collect();
    assert_eq!(kinds, ["on_button_pressed", "forever", "forever", "on_start"]);
    assert_eq!(graph.get(out.nodes[0]).unwrap().get("BUTTON"), Some(&Value::from("B")));
}

#[test]
fn test_unknown_icon_falls_back_to_heart() {
    let (graph, out) = decode("display.show(Image.GIRAFFE)");
    assert_eq!(graph.get(out.nodes[0]).unwrap().get("ICON"), Some(&Value::from("HEART")));
}

// ============================================================================
// 4. Precedence and targeted conversion
// ============================================================================

fn noop(_: &EncodeInput<'_>) -> blockbridge::Result<Fragment> {
    Ok(Fragment::statement(""))
}

#[test]
fn test_earlier_registration_wins() {
    init_tracing();
    let mut registry = Registry::new();
    registry
        .register(Form::new("first", Template::statement("first"), r"go\(\d+\)", noop).unwrap())
        .unwrap();
    registry
        .register(Form::new("second", Template::statement("second"), r"^go\(1\)$", noop).unwrap())
        .unwrap();

    let mut graph = Graph::new();
    let out = Decoder::new(&registry).decode(&mut graph, "go(1)");
    assert_eq!(type_of(&graph, out.nodes[0]), "first");
    assert_eq!(registry.matching("go(1)").len(), 2);
}

#[test]
fn test_decode_as_bypasses_precedence() {
    let registry = Registry::builtin().unwrap();
    let mut graph = Graph::new();
    let id = Decoder::new(&registry)
        .decode_as(&mut graph, "x = led.point(3, 4)", "point_led")
        .unwrap()
        .unwrap();
    let node = graph.get(id).unwrap();
    assert_eq!(node.get("X"), Some(&Value::Int(3)));
    assert_eq!(node.get("Y"), Some(&Value::Int(4)));
}

#[test]
fn test_decode_into_existing_graph_keeps_old_nodes() {
    let registry = Registry::builtin().unwrap();
    let mut graph = Graph::new();
    let existing = graph
        .create_node(&registry, "music_rest", fields([("DURATION", "2")]))
        .unwrap();
    let out = Decoder::new(&registry).decode(&mut graph, "music.rest(1)");
    assert_eq!(graph.roots(), vec![existing, out.nodes[0]]);
}
