//! Template annotator.
//!
//! Keeps derived renderings of traffic-measure templates in sync with the
//! templates and variables stored in a triplestore. Placeholders of the form
//! `${name}` are replaced by RDFa markup (the annotated artifact) or left
//! intact apart from embedded instructions (the preview artifact).
//!
//! Three triggers drive it: a full rebuild, a bulk clear, and incremental
//! delta notifications that also refresh templates embedding the changed ones.

pub mod bindings;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod markup;
pub mod materializer;
pub mod model;
pub mod pipeline;
pub mod propagation;
pub mod renderer;
pub mod sparql;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

pub use config::ServiceConfig;
pub use engine::{AnnotationEngine, ChangeAck, EngineSettings, RebuildOutcome};
pub use error::{AnnotationError, Result};
pub use model::{ArtifactKind, RenderedTemplate, Template, Variable, VariableType};
