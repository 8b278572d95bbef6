//! Draft sessions: isolated working copies of a node template.
//!
//! A [`DraftSession`] deep-copies the source template when it is opened and
//! only ever changes through its mutation methods. Each mutation touches the
//! single named entry; a mutation that fails leaves the draft as it was.

use nodeparam_fields::{
    FieldDescriptor, FieldProjection, FieldValue, NodeId, NodeRecord, NodeTemplate,
    ProjectionBuilder, TemplateChanges,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{Result, SessionError};

/// Identifier of one editing session, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Ulid);

impl SessionId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable copy of a node's template for the duration of an edit.
#[derive(Debug, Clone)]
pub struct DraftSession {
    id: SessionId,
    source_node_id: NodeId,
    node_type: String,
    description: Option<String>,
    baseline: NodeTemplate,
    draft: NodeTemplate,
}

impl DraftSession {
    /// Deep-copy `source`'s template into a new draft.
    pub fn open(source: &NodeRecord) -> Result<Self> {
        validate_source(source)?;
        let session = Self {
            id: SessionId::new(),
            source_node_id: source.id.clone(),
            node_type: source.node_type.clone(),
            description: source.description.clone(),
            baseline: source.template.clone(),
            draft: source.template.clone(),
        };
        debug!(
            session_id = %session.id,
            node_id = %session.source_node_id,
            fields = session.draft.len(),
            "draft session opened"
        );
        Ok(session)
    }

    /// Open from a JSON record document; see [`NodeRecord::from_json`].
    pub fn open_json(source: serde_json::Value) -> Result<Self> {
        let record = NodeRecord::from_json(source)?;
        Self::open(&record)
    }

    /// Re-copy from `source`, dropping every in-progress edit. The source may
    /// be a different node than the one the draft was opened on.
    pub fn reset(&mut self, source: &NodeRecord) -> Result<()> {
        validate_source(source)?;
        self.source_node_id = source.id.clone();
        self.node_type = source.node_type.clone();
        self.description = source.description.clone();
        self.baseline = source.template.clone();
        self.draft = source.template.clone();
        debug!(session_id = %self.id, node_id = %self.source_node_id, "draft session reset");
        Ok(())
    }

    /// Replace the value of `key`. Non-finite floats have no JSON form and
    /// fail with [`SessionError::NonFiniteValue`].
    pub fn set_value(&mut self, key: &str, value: FieldValue) -> Result<()> {
        if !value.is_representable() {
            warn!(session_id = %self.id, key, "non-finite value rejected");
            return Err(SessionError::NonFiniteValue {
                node_id: self.source_node_id.clone(),
                key: key.to_string(),
            });
        }
        let field = self.field_mut(key)?;
        field.value = value.into_raw();
        debug!(session_id = %self.id, key, "field value changed");
        Ok(())
    }

    /// Flip the `advanced` flag of `key`, returning the new value.
    pub fn toggle_advanced(&mut self, key: &str) -> Result<bool> {
        let field = self.field_mut(key)?;
        field.advanced = !field.advanced;
        let advanced = field.advanced;
        debug!(session_id = %self.id, key, advanced, "advanced toggled");
        Ok(advanced)
    }

    pub fn set_load_from_source(&mut self, key: &str, flag: bool) -> Result<()> {
        let field = self.field_mut(key)?;
        field.load_from_source = flag;
        debug!(session_id = %self.id, key, flag, "load-from-source changed");
        Ok(())
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source_node_id(&self) -> &NodeId {
        &self.source_node_id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn template(&self) -> &NodeTemplate {
        &self.draft
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.draft.get(key)
    }

    /// Whether the draft differs from the template it was copied from.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.baseline
    }

    /// Fields edited since the draft was opened or last reset.
    pub fn changes(&self) -> TemplateChanges<'_> {
        TemplateChanges::between(&self.baseline, &self.draft)
    }

    /// Rows for the current draft.
    pub fn projections(&self, builder: &ProjectionBuilder) -> Vec<FieldProjection> {
        builder.build(&self.draft)
    }

    pub fn into_template(self) -> NodeTemplate {
        self.draft
    }

    fn field_mut(&mut self, key: &str) -> Result<&mut FieldDescriptor> {
        let node_id = &self.source_node_id;
        self.draft
            .get_mut(key)
            .ok_or_else(|| SessionError::UnknownField {
                node_id: node_id.clone(),
                key: key.to_string(),
            })
    }
}

fn validate_source(source: &NodeRecord) -> Result<()> {
    if source.id.as_str().is_empty() {
        return Err(SessionError::invalid_source("node id is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> NodeRecord {
        let mut template = NodeTemplate::new();
        template.insert("api_key".into(), FieldDescriptor::new("str").with_value(""));
        template.insert(
            "temperature".into(),
            FieldDescriptor::new("float").with_value(json!(0.7)).with_advanced(true),
        );
        template.insert(
            "_type".into(),
            FieldDescriptor::new("str").with_value("OpenAI").with_visible(false),
        );
        NodeRecord::new("OpenAI-1", "OpenAI", template).with_description("Large language model")
    }

    #[test]
    fn open_copies_template_and_header() {
        let record = source();
        let draft = DraftSession::open(&record).unwrap();
        assert_eq!(draft.template(), &record.template);
        assert_eq!(draft.source_node_id().as_str(), "OpenAI-1");
        assert_eq!(draft.node_type(), "OpenAI");
        assert_eq!(draft.description(), Some("Large language model"));
        assert!(!draft.is_dirty());
    }

    #[test]
    fn open_rejects_empty_node_id() {
        let mut record = source();
        record.id = NodeId::new("");
        let err = DraftSession::open(&record).unwrap_err();
        assert!(matches!(err, SessionError::InvalidSource { .. }));
    }

    #[test]
    fn open_json_without_template_is_invalid_source() {
        let err = DraftSession::open_json(json!({"id": "n", "type": "OpenAI"})).unwrap_err();
        assert!(matches!(err, SessionError::InvalidSource { .. }));
    }

    #[test]
    fn set_value_changes_only_named_field() {
        let record = source();
        let mut draft = DraftSession::open(&record).unwrap();
        draft.set_value("api_key", FieldValue::Str("sk-123".into())).unwrap();

        assert_eq!(draft.field("api_key").unwrap().value, json!("sk-123"));
        assert_eq!(draft.field("temperature"), record.template.get("temperature"));
        assert_eq!(draft.field("_type"), record.template.get("_type"));
        assert!(draft.is_dirty());
        assert_eq!(record.template["api_key"].value, json!(""));
        assert_eq!(draft.changes().keys().collect::<Vec<_>>(), vec!["api_key"]);
    }

    #[test]
    fn unknown_key_fails_and_leaves_draft_unchanged() {
        let mut draft = DraftSession::open(&source()).unwrap();
        let before = draft.template().clone();

        let err = draft.set_value("api_kye", FieldValue::Str("x".into())).unwrap_err();
        assert!(matches!(err, SessionError::UnknownField { ref key, .. } if key == "api_kye"));
        assert!(draft.toggle_advanced("missing").is_err());
        assert!(draft.set_load_from_source("missing", true).is_err());

        assert_eq!(draft.template(), &before);
        assert!(!draft.is_dirty());
    }

    #[test]
    fn non_finite_float_fails_and_leaves_draft_unchanged() {
        let mut draft = DraftSession::open(&source()).unwrap();
        let before = draft.template().clone();

        for number in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = draft
                .set_value("temperature", FieldValue::Float(number))
                .unwrap_err();
            assert!(
                matches!(err, SessionError::NonFiniteValue { ref key, .. } if key == "temperature")
            );
        }

        assert_eq!(draft.template(), &before);
        assert_eq!(draft.field("temperature").unwrap().value, json!(0.7));
        assert!(!draft.is_dirty());

        draft.set_value("temperature", FieldValue::Float(1.0)).unwrap();
        assert_eq!(draft.field("temperature").unwrap().value, json!(1));
    }

    #[test]
    fn toggle_advanced_twice_restores() {
        let mut draft = DraftSession::open(&source()).unwrap();
        assert!(!draft.toggle_advanced("temperature").unwrap());
        assert!(draft.is_dirty());
        assert!(draft.toggle_advanced("temperature").unwrap());
        assert!(!draft.is_dirty());
    }

    #[test]
    fn set_load_from_source_sets_flag() {
        let mut draft = DraftSession::open(&source()).unwrap();
        draft.set_load_from_source("api_key", true).unwrap();
        assert!(draft.field("api_key").unwrap().load_from_source);
    }

    #[test]
    fn mutations_apply_to_hidden_fields_too() {
        let mut draft = DraftSession::open(&source()).unwrap();
        draft.set_value("_type", FieldValue::Str("AzureOpenAI".into())).unwrap();
        assert_eq!(draft.field("_type").unwrap().value, json!("AzureOpenAI"));
    }

    #[test]
    fn reset_discards_edits_and_retargets() {
        let mut draft = DraftSession::open(&source()).unwrap();
        let id = draft.id();
        draft.set_value("api_key", FieldValue::Str("sk-123".into())).unwrap();

        let mut other_template = NodeTemplate::new();
        other_template.insert("input_value".into(), FieldDescriptor::new("str").with_value("hi"));
        let other = NodeRecord::new("ChatInput-1", "ChatInput", other_template.clone());
        draft.reset(&other).unwrap();

        assert_eq!(draft.id(), id);
        assert_eq!(draft.source_node_id().as_str(), "ChatInput-1");
        assert_eq!(draft.node_type(), "ChatInput");
        assert_eq!(draft.description(), None);
        assert_eq!(draft.template(), &other_template);
        assert!(!draft.is_dirty());
    }

    #[test]
    fn projections_reflect_latest_draft() {
        let builder = ProjectionBuilder::default();
        let mut draft = DraftSession::open(&source()).unwrap();

        let rows = draft.projections(&builder);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows, draft.projections(&builder));

        draft.set_value("api_key", FieldValue::Str("sk-123".into())).unwrap();
        let rows = draft.projections(&builder);
        assert_eq!(rows[0].value, FieldValue::Str("sk-123".into()));
    }
}
