//! # Decoder
//!
//! Line-oriented, best-effort conversion of source text into nodes.
//!
//! Each trimmed, non-comment line is offered to the registry; the first
//! form whose pattern matches builds one node. Lines nothing matches are
//! dropped. A line whose decode or construct step fails is logged and
//! skipped without affecting the others. Finally every produced node is
//! linked after its predecessor, permissively: a pair that cannot be
//! chained is simply left apart.

use tracing::{debug, trace, warn};

use crate::config::DecoderOptions;
use crate::graph::Graph;
use crate::model::NodeId;
use crate::registry::{Form, Registry};
use crate::Result;

/// What a call to `Decoder::decode` produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Nodes built, in line order.
    pub nodes: Vec<NodeId>,
    /// 1-based numbers of lines no form matched.
    pub unmatched: Vec<usize>,
    pub failures: Vec<LineFailure>,
    /// Consecutive pairs that could not be chained.
    pub unlinked: usize,
}

/// A line that matched a form but could not be turned into a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: usize,
    pub type_name: String,
    pub message: String,
}

impl DecodeOutcome {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.failures.is_empty() && self.unlinked == 0
    }
}

/// Text → graph converter bound to a registry.
#[derive(Debug, Clone)]
pub struct Decoder<'r> {
    registry: &'r Registry,
    options: DecoderOptions,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, DecoderOptions::default())
    }

    pub fn with_options(registry: &'r Registry, options: DecoderOptions) -> Self {
        Self { registry, options }
    }

    /// Decode a whole document into `graph`. Never fails; see `DecodeOutcome`
    /// for what was kept and what was dropped.
    pub fn decode(&self, graph: &mut Graph, text: &str) -> DecodeOutcome {
        let mut outcome = DecodeOutcome::default();
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

        for (index, raw) in normalized.split('\n').enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if self.is_ignorable(line) {
                continue;
            }
            let Some((form, caps)) = self.registry.first_match(line) else {
                trace!(line = line_no, text = line, "no form matches; line dropped");
                outcome.unmatched.push(line_no);
                continue;
            };
            match self.build(graph, form, &caps) {
                Ok(id) => {
                    debug!(line = line_no, type_name = form.type_name(), node = %id, "decoded line");
                    outcome.nodes.push(id);
                }
                Err(e) => {
                    warn!(line = line_no, type_name = form.type_name(), error = %e, "failed to decode line");
                    outcome.failures.push(LineFailure {
                        line: line_no,
                        type_name: form.type_name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        for pair in outcome.nodes.windows(2) {
            if !graph.append_to_chain(pair[0], pair[1]) {
                outcome.unlinked += 1;
            }
        }
        outcome
    }

    /// Decode one line with the first matching form. `Ok(None)` when nothing
    /// matches or the line is a comment.
    pub fn decode_line(&self, graph: &mut Graph, line: &str) -> Result<Option<NodeId>> {
        let line = line.trim();
        if self.is_ignorable(line) {
            return Ok(None);
        }
        match self.registry.first_match(line) {
            Some((form, caps)) => self.build(graph, form, &caps).map(Some),
            None => Ok(None),
        }
    }

    /// Decode `text` with a named form, bypassing match precedence.
    /// `Ok(None)` when the form's pattern does not match.
    pub fn decode_as(&self, graph: &mut Graph, text: &str, type_name: &str) -> Result<Option<NodeId>> {
        let form = self.registry.get(type_name)?;
        match form.matches(text) {
            Some(caps) => self.build(graph, form, &caps).map(Some),
            None => Ok(None),
        }
    }

    fn build(&self, graph: &mut Graph, form: &Form, caps: &regex::Captures<'_>) -> Result<NodeId> {
        let fields = form.decode(caps)?;
        form.construct(graph, self.registry, fields)
    }

    fn is_ignorable(&self, line: &str) -> bool {
        line.is_empty()
            || (!self.options.comment_prefix.is_empty() && line.starts_with(&self.options.comment_prefix))
            || self.options.skip_lines.iter().any(|s| s == line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::Error;

    fn decode(text: &str) -> (Graph, DecodeOutcome) {
        let reg = Registry::builtin().unwrap();
        let mut g = Graph::new();
        let outcome = Decoder::new(&reg).decode(&mut g, text);
        (g, outcome)
    }

    #[test]
    fn test_consecutive_statements_are_chained() {
        let (g, out) = decode("basic.pause(1000)\nled.plot(0, 0)");
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(g.get(out.nodes[0]).unwrap().next, Some(out.nodes[1]));
        assert!(out.is_clean());
    }

    #[test]
    fn test_unmatched_lines_are_dropped() {
        let (g, out) = decode("this is not code");
        assert!(g.is_empty());
        assert_eq!(out.unmatched, vec![1]);
        assert!(out.failures.is_empty());
    }

    #[test]
    fn test_comments_blanks_and_placeholders_skipped() {
        let (g, out) = decode("# header\n\r\n   \n    pass\nmusic.rest(2)\r\n");
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(g.len(), 1);
        assert!(out.unmatched.is_empty());
    }

    #[test]
    fn test_failed_line_does_not_stop_others() {
        // Out of i64 range: the pause pattern matches but decoding fails.
        let (g, out) = decode("basic.pause(99999999999999999999)\nled.toggle(1, 2)");
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].line, 1);
        assert_eq!(out.failures[0].type_name, "pause");
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(g.get(out.nodes[0]).unwrap().type_name, "toggle_led");
    }

    #[test]
    fn test_expression_breaks_chain() {
        let (g, out) = decode("led.point(1, 1)\nled.plot(1, 1)");
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(out.unlinked, 1);
        assert!(g.get(out.nodes[1]).unwrap().is_root());
    }

    #[test]
    fn test_decode_line_and_decode_as() {
        let reg = Registry::builtin().unwrap();
        let dec = Decoder::new(&reg);
        let mut g = Graph::new();

        assert_eq!(dec.decode_line(&mut g, "# note").unwrap(), None);
        let id = dec.decode_line(&mut g, "  pin1.write_analog(700)  ").unwrap().unwrap();
        assert_eq!(g.get(id).unwrap().get("VALUE"), Some(&Value::Int(700)));

        // "x = 'hi'" would be an assignment; asking for `text` takes the literal.
        let id = dec.decode_as(&mut g, "x = 'hi'", "text").unwrap().unwrap();
        assert_eq!(g.get(id).unwrap().get("TEXT"), Some(&Value::from("hi")));
        assert_eq!(dec.decode_as(&mut g, "nothing", "pause").unwrap(), None);
        assert!(matches!(dec.decode_as(&mut g, "x", "nope"), Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_custom_comment_prefix() {
        let reg = Registry::builtin().unwrap();
        let options = DecoderOptions { comment_prefix: "//".into(), ..Default::default() };
        let mut g = Graph::new();
        let out = Decoder::with_options(&reg, options).decode(&mut g, "// led.plot(0, 0)\nled.plot(1, 1)");
        assert_eq!(out.nodes.len(), 1);
    }
}
