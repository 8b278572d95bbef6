//! Node field templates and the parameter grid projection
//!
//! `nodeparam-fields` is the schema half of the node parameter editor. It
//! models node records and their field templates, decides which fields are
//! user-editable, and turns a template into rows for a renderer. It holds no
//! session state; see `nodeparam-session` for drafts and commits.
//!
//! # Architecture
//!
//! - **Opaque values**: templates keep values as raw JSON; rows carry a
//!   [`FieldValue`] tagged by field kind
//! - **Pure projection**: rows are recomputed from the template on every call
//! - **Configurable type set**: the supported field types come from
//!   [`EditorConfig`] (defaults, file, `NODEPARAM_*` environment)

pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod projection;
pub mod types;
pub mod value;

pub use config::{EditorConfig, ReopenPolicy};
pub use error::{FieldsError, Result};
pub use filter::{is_projectable, FieldFilter, SupportedTypes};
pub use logging::{Pretty, TemplateChanges};
pub use projection::{build_projections, FieldProjection, ProjectionBuilder};
pub use types::{FieldDescriptor, FieldKind, FieldProxy, NodeId, NodeRecord, NodeTemplate};
pub use value::FieldValue;
