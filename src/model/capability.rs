//! Capability tags for value slots and expression outputs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of value an expression produces or a value slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Number,
    String,
    Boolean,
}

impl Capability {
    /// Slot/output compatibility. An unchecked side (`None`) accepts anything.
    pub fn compatible(slot: Option<Capability>, output: Option<Capability>) -> bool {
        match (slot, output) {
            (Some(s), Some(o)) => s == o,
            _ => true,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Number => f.write_str("Number"),
            Capability::String => f.write_str("String"),
            Capability::Boolean => f.write_str("Boolean"),
        }
    }
}
