//! Commit controller: the editing-session state machine.
//!
//! ```text
//!            open / open_record
//!   Idle ───────────────────────▶ Editing ──┐ set_value / toggle_advanced /
//!    ▲                              │  ▲    │ set_load_from_source / reopen
//!    │   commit ▶ Committed         │  └────┘
//!    └──────────────────────────────┘
//!        discard ▶ Discarded
//! ```
//!
//! The controller owns at most one [`DraftSession`]. `commit` is the only
//! place the draft reaches the [`TemplateStore`].

use std::sync::Arc;

use nodeparam_fields::{
    EditorConfig, FieldProjection, FieldValue, NodeId, NodeRecord, Pretty, ProjectionBuilder,
};
use serde::Serialize;
use tracing::{info, trace, warn};

use crate::draft::{DraftSession, SessionId};
use crate::error::{Result, SessionError};
use crate::store::TemplateStore;

/// Whether a session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Editing,
}

/// How a session ended. The controller is `Idle` again once this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    Committed {
        node_id: NodeId,
        session_id: SessionId,
    },
    Discarded {
        node_id: NodeId,
        session_id: SessionId,
    },
}

impl SessionOutcome {
    pub fn node_id(&self) -> &NodeId {
        match self {
            SessionOutcome::Committed { node_id, .. } | SessionOutcome::Discarded { node_id, .. } => {
                node_id
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, SessionOutcome::Committed { .. })
    }
}

/// Drives one editing session at a time against a shared template store.
#[derive(Debug)]
pub struct CommitController {
    store: Arc<TemplateStore>,
    projector: ProjectionBuilder,
    session: Option<DraftSession>,
}

impl CommitController {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self::with_projection_builder(store, ProjectionBuilder::default())
    }

    pub fn with_projection_builder(store: Arc<TemplateStore>, projector: ProjectionBuilder) -> Self {
        Self {
            store,
            projector,
            session: None,
        }
    }

    pub fn from_config(store: Arc<TemplateStore>, config: &EditorConfig) -> Self {
        Self::with_projection_builder(store, config.projection_builder())
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Editing
        } else {
            SessionState::Idle
        }
    }

    pub fn session(&self) -> Option<&DraftSession> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    pub fn projector(&self) -> &ProjectionBuilder {
        &self.projector
    }

    /// Open a session on the store's current record for `node_id`.
    pub fn open(&mut self, node_id: &NodeId) -> Result<&DraftSession> {
        self.ensure_idle()?;
        let record = self.store.get(node_id)?.ok_or_else(|| {
            SessionError::invalid_source(format!("node {node_id} is not in the template store"))
        })?;
        self.start(&record)
    }

    /// Open a session on a record supplied by the host.
    pub fn open_record(&mut self, record: &NodeRecord) -> Result<&DraftSession> {
        self.ensure_idle()?;
        self.start(record)
    }

    /// Restart the session from `record`, dropping any in-progress edits.
    /// Opens a fresh session when idle.
    pub fn reopen(&mut self, record: &NodeRecord) -> Result<&DraftSession> {
        if self.session.is_none() {
            return self.start(record);
        }
        let session = self.active_mut()?;
        session.reset(record)?;
        Ok(&*session)
    }

    pub fn set_value(&mut self, key: &str, value: FieldValue) -> Result<()> {
        self.active_mut()?.set_value(key, value)
    }

    pub fn toggle_advanced(&mut self, key: &str) -> Result<bool> {
        self.active_mut()?.toggle_advanced(key)
    }

    pub fn set_load_from_source(&mut self, key: &str, flag: bool) -> Result<()> {
        self.active_mut()?.set_load_from_source(key, flag)
    }

    /// Rows for the open draft, rebuilt on every call.
    pub fn projections(&self) -> Result<Vec<FieldProjection>> {
        Ok(self.active()?.projections(&self.projector))
    }

    /// Whether the open draft has any row to show.
    pub fn has_editable_fields(&self) -> Result<bool> {
        Ok(self.projector.has_editable_fields(self.active()?.template()))
    }

    /// Write the draft over the source record's template and end the session.
    ///
    /// When the source node is gone from the store the error is returned and
    /// the session stays open with its edits intact.
    pub fn commit(&mut self) -> Result<SessionOutcome> {
        let session = self.active()?;
        let node_id = session.source_node_id().clone();
        let session_id = session.id();
        trace!(%session_id, "committing changes: {}", Pretty(session.changes()));

        if let Err(error) = self
            .store
            .replace_template(&node_id, session.template().clone())
        {
            warn!(%session_id, %node_id, %error, "commit rejected");
            return Err(error);
        }
        let dirty = session.is_dirty();
        self.session = None;

        info!(%session_id, %node_id, dirty, "editing session committed");
        Ok(SessionOutcome::Committed {
            node_id,
            session_id,
        })
    }

    /// Drop the draft without touching the store and end the session.
    pub fn discard(&mut self) -> Result<SessionOutcome> {
        let session = self.session.take().ok_or_else(|| {
            warn!("discard requested with no active session");
            SessionError::NoActiveSession
        })?;
        info!(
            session_id = %session.id(),
            node_id = %session.source_node_id(),
            dirty = session.is_dirty(),
            "editing session discarded"
        );
        Ok(SessionOutcome::Discarded {
            node_id: session.source_node_id().clone(),
            session_id: session.id(),
        })
    }

    fn start(&mut self, record: &NodeRecord) -> Result<&DraftSession> {
        let session = DraftSession::open(record)?;
        Ok(&*self.session.insert(session))
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.session {
            Some(session) => {
                warn!(node_id = %session.source_node_id(), "open requested while editing");
                Err(SessionError::SessionAlreadyActive {
                    node_id: session.source_node_id().clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn active(&self) -> Result<&DraftSession> {
        self.session.as_ref().ok_or_else(|| {
            warn!("operation requested with no active session");
            SessionError::NoActiveSession
        })
    }

    fn active_mut(&mut self) -> Result<&mut DraftSession> {
        self.session.as_mut().ok_or_else(|| {
            warn!("mutation requested with no active session");
            SessionError::NoActiveSession
        })
    }
}
