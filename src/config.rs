//! # Configuration
//!
//! Every knob has a default matching the dialect's conventions, so
//! `Config::default()` is a working setup and a JSON document only needs the
//! fields it changes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Value;
use crate::palette::{CategoryDescriptor, Colour};
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderOptions,
    pub encoder: EncoderOptions,
    pub palette: PaletteOptions,
}

impl Config {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Decoder
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// Trimmed lines starting with this are comments.
    pub comment_prefix: String,
    /// Trimmed lines equal to one of these carry no meaning of their own
    /// (the encoder's empty-body placeholder) and are skipped.
    pub skip_lines: Vec<String>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            comment_prefix: "#".into(),
            skip_lines: vec!["pass".into()],
        }
    }
}

// ============================================================================
// Encoder
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// One level of indentation.
    pub indent: String,
    /// Statement emitted for an empty body.
    pub empty_body: String,
    /// Name used for a variable reference that cannot be resolved.
    pub fallback_variable: String,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            indent: "    ".into(),
            empty_body: "pass".into(),
            fallback_variable: "x".into(),
        }
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Literal placed in empty value slots of a palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowSpec {
    pub type_name: String,
    pub field: String,
    pub value: Value,
}

impl ShadowSpec {
    pub fn new(type_name: &str, field: &str, value: impl Into<Value>) -> Self {
        Self { type_name: type_name.into(), field: field.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteOptions {
    /// Categories in display order.
    pub categories: Vec<CategoryDescriptor>,
    /// Category for forms that declare none.
    pub default_category: String,
    /// Colour of categories that appear only because a form names them.
    pub default_colour: Colour,
    pub number_shadow: ShadowSpec,
    pub text_shadow: ShadowSpec,
    /// Shadows for specific `type name → slot`, taking priority over the
    /// Number/String defaults. Unchecked slots get a shadow only from here.
    pub slot_shadows: IndexMap<String, IndexMap<String, ShadowSpec>>,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            categories: CategoryDescriptor::builtin(),
            default_category: "Uncategorized".into(),
            default_colour: Colour::Hex("#999999ff".into()),
            number_shadow: ShadowSpec::new("math_number", "NUM", 0),
            text_shadow: ShadowSpec::new("text", "TEXT", "Hello!"),
            slot_shadows: default_slot_shadows(),
        }
    }
}

/// Comparisons are offered as `0 == 0` with editable numbers on both sides.
fn default_slot_shadows() -> IndexMap<String, IndexMap<String, ShadowSpec>> {
    let zero = ShadowSpec::new("math_number", "NUM", 0);
    let compare = IndexMap::from([("A".to_string(), zero.clone()), ("B".to_string(), zero)]);
    IndexMap::from([("logic_compare".to_string(), compare)])
}
