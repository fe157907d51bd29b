//! # blockbridge: Text ⇄ Block Graph Transducer
//!
//! Converts a line-oriented scripting dialect (the micro:bit flavour of
//! Python) into a typed graph of blocks and back, and projects the set of
//! known block forms into a palette for a visual editor.
//!
//! ## Design Principles
//!
//! 1. **One registry, passed explicitly**: forms are registered once and
//!    the registry is shared by reference; there is no global state
//! 2. **Forms are data plus function pointers**: match pattern, decode,
//!    construct and encode live on the `Form` record
//! 3. **Best-effort decode**: unknown lines are dropped, a failing line
//!    never aborts the document
//! 4. **Gated encode**: hardware statements only produce code under an
//!    entry point
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blockbridge::{Graph, Transducer};
//!
//! # fn example() -> blockbridge::Result<()> {
//! let bridge = Transducer::builtin()?;
//! let mut graph = Graph::new();
//!
//! let outcome = bridge.decode(&mut graph, "basic.pause(100)\nmusic.rest(1)");
//! assert_eq!(outcome.nodes.len(), 2);
//!
//! println!("{}", bridge.encode_graph(&graph)?);
//! println!("{}", bridge.palette().to_toolbox_xml());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod registry;
pub mod forms;
pub mod decoder;
pub mod encoder;
pub mod palette;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Arg, Capability, FieldMap, Node, NodeId, Shape, Slot, Template, Value, fields};
pub use graph::Graph;
pub use registry::{Form, Registry, Role};
pub use decoder::{DecodeOutcome, Decoder, LineFailure};
pub use encoder::{EncodeInput, Encoder, Fragment, Precedence};
pub use palette::{Catalog, CategoryDescriptor, Colour};
pub use config::{Config, DecoderOptions, EncoderOptions, PaletteOptions};

// ============================================================================
// Top-level handle
// ============================================================================

/// The primary entry point: a registry plus configuration, exposing the
/// three conversions.
#[derive(Debug, Clone)]
pub struct Transducer {
    registry: Registry,
    config: Config,
}

impl Transducer {
    pub fn new(registry: Registry, config: Config) -> Self {
        Self { registry, config }
    }

    /// Built-in forms, default configuration.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Registry::builtin()?, Config::default()))
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::with_options(&self.registry, self.config.decoder.clone())
    }

    pub fn encoder(&self) -> Encoder<'_> {
        Encoder::with_options(&self.registry, self.config.encoder.clone())
    }

    /// Text → nodes in `graph`.
    pub fn decode(&self, graph: &mut Graph, text: &str) -> DecodeOutcome {
        self.decoder().decode(graph, text)
    }

    /// One node (and its slots) → text.
    pub fn encode(&self, graph: &Graph, id: NodeId) -> Result<String> {
        self.encoder().encode(graph, id)
    }

    /// Every root of `graph` → text.
    pub fn encode_graph(&self, graph: &Graph) -> Result<String> {
        self.encoder().encode_graph(graph)
    }

    pub fn palette(&self) -> Catalog {
        palette::project(&self.registry, &self.config.palette)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Form already registered: {0}")]
    DuplicateType(String),

    #[error("Unknown form type: {0}")]
    UnknownType(String),

    #[error("Slot '{slot}' on node {node} is occupied")]
    SlotOccupied { node: NodeId, slot: String },

    #[error("Node {node} has no slot '{slot}'")]
    UnknownSlot { node: NodeId, slot: String },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Slot '{slot}' accepts {expected}, got {got}")]
    CapabilityMismatch { slot: String, expected: String, got: String },

    #[error("Node {0} is already attached")]
    AlreadyAttached(NodeId),

    #[error("Connecting {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid pattern for form {type_name}: {source}")]
    InvalidPattern {
        type_name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Decode error in {type_name}: {message}")]
    Decode { type_name: String, message: String },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
