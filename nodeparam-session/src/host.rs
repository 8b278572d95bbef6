//! Host-facing editor surface.
//!
//! [`NodeEditor`] receives the session host's open/close signals and the
//! renderer's edit events and routes them into a [`CommitController`]. It is
//! the only type a UI layer needs to hold.

use std::sync::Arc;

use nodeparam_fields::{
    EditorConfig, FieldProjection, FieldValue, NodeId, NodeRecord, ReopenPolicy,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::{CommitController, SessionOutcome, SessionState};
use crate::error::{Result, SessionError};
use crate::store::TemplateStore;

/// Input forwarded by the renderer for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    ValueChanged { key: String, value: FieldValue },
    AdvancedToggled { key: String },
    LoadFromSourceChanged { key: String, flag: bool },
}

impl EditorEvent {
    pub fn key(&self) -> &str {
        match self {
            EditorEvent::ValueChanged { key, .. }
            | EditorEvent::AdvancedToggled { key }
            | EditorEvent::LoadFromSourceChanged { key, .. } => key,
        }
    }
}

/// What the dialog chrome shows above the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHeader {
    pub node_id: NodeId,
    pub node_type: String,
    pub description: Option<String>,
    /// False when the grid would be empty and can be hidden.
    pub has_editable_fields: bool,
}

/// Routes host lifecycle signals and renderer events into a controller.
#[derive(Debug)]
pub struct NodeEditor {
    controller: CommitController,
    reopen_policy: ReopenPolicy,
}

impl NodeEditor {
    pub fn new(controller: CommitController, reopen_policy: ReopenPolicy) -> Self {
        Self {
            controller,
            reopen_policy,
        }
    }

    pub fn from_config(store: Arc<TemplateStore>, config: &EditorConfig) -> Self {
        Self::new(
            CommitController::from_config(store, config),
            config.reopen_policy,
        )
    }

    pub fn controller(&self) -> &CommitController {
        &self.controller
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    /// The host wants the editor shown for `record`.
    ///
    /// With [`ReopenPolicy::Reset`] an open session is restarted from
    /// `record`; with [`ReopenPolicy::Reject`] it fails with
    /// `SessionAlreadyActive`.
    pub fn on_session_open_requested(&mut self, record: &NodeRecord) -> Result<SessionHeader> {
        debug!(node_id = %record.id, policy = ?self.reopen_policy, "session open requested");
        match self.reopen_policy {
            ReopenPolicy::Reset => self.controller.reopen(record)?,
            ReopenPolicy::Reject => self.controller.open_record(record)?,
        };
        self.header()
    }

    /// The host is closing the editor; `commit` selects save or cancel.
    pub fn on_session_close_requested(&mut self, commit: bool) -> Result<SessionOutcome> {
        debug!(commit, "session close requested");
        if commit {
            self.controller.commit()
        } else {
            self.controller.discard()
        }
    }

    /// Apply one renderer event to the draft.
    pub fn dispatch(&mut self, event: EditorEvent) -> Result<()> {
        match event {
            EditorEvent::ValueChanged { key, value } => self.controller.set_value(&key, value),
            EditorEvent::AdvancedToggled { key } => {
                self.controller.toggle_advanced(&key).map(|_| ())
            }
            EditorEvent::LoadFromSourceChanged { key, flag } => {
                self.controller.set_load_from_source(&key, flag)
            }
        }
    }

    /// Current rows for the renderer.
    pub fn rows(&self) -> Result<Vec<FieldProjection>> {
        self.controller.projections()
    }

    pub fn header(&self) -> Result<SessionHeader> {
        let has_editable_fields = self.controller.has_editable_fields()?;
        let session = self
            .controller
            .session()
            .ok_or(SessionError::NoActiveSession)?;
        Ok(SessionHeader {
            node_id: session.source_node_id().clone(),
            node_type: session.node_type().to_string(),
            description: session.description().map(str::to_string),
            has_editable_fields,
        })
    }
}
