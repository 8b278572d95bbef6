//! Editing sessions for node parameters
//!
//! `nodeparam-session` is the stateful half of the node parameter editor.
//! A session copies a node's template into a draft, applies the renderer's
//! edits to that draft only, and on close either writes the whole draft back
//! to the [`TemplateStore`] in one step or drops it.
//!
//! ```rust,ignore
//! let store = Arc::new(TemplateStore::from_records(records));
//! let mut editor = NodeEditor::from_config(store, &EditorConfig::load()?);
//!
//! let header = editor.on_session_open_requested(&record)?;
//! for row in editor.rows()? { /* render */ }
//! editor.dispatch(EditorEvent::AdvancedToggled { key: "stream".into() })?;
//! editor.on_session_close_requested(true)?;
//! ```

pub mod controller;
pub mod draft;
pub mod error;
pub mod host;
pub mod store;

pub use controller::{CommitController, SessionOutcome, SessionState};
pub use draft::{DraftSession, SessionId};
pub use error::{Result, SessionError};
pub use host::{EditorEvent, NodeEditor, SessionHeader};
pub use store::TemplateStore;
