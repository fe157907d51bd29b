//! # Block Graph Model
//!
//! Plain DTOs shared by the registry, the graph, the decoder, the encoder
//! and the palette projection.
//!
//! Design rule: this module is pure data. No regexes, no I/O, no logging.

pub mod node;
pub mod value;
pub mod field_map;
pub mod capability;
pub mod template;

pub use node::{Node, NodeId, Slot};
pub use value::Value;
pub use field_map::{FieldMap, fields};
pub use capability::Capability;
pub use template::{Arg, Shape, Template};
