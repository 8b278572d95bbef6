//! In-process template store.
//!
//! Holds the authoritative [`NodeRecord`] for every node. Reads hand out
//! whole-record snapshots and [`TemplateStore::replace_template`] swaps a
//! template under a single write guard, so a concurrent reader observes
//! either the old template or the new one and never a mix.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use nodeparam_fields::{NodeId, NodeRecord, NodeTemplate};
use tracing::debug;

use crate::error::{Result, SessionError};

/// Node records keyed by node id, safe to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct TemplateStore {
    records: RwLock<HashMap<NodeId, NodeRecord>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `records`.
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Self {
        let records: HashMap<NodeId, NodeRecord> = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Insert or replace a record, returning the previous one.
    pub fn insert(&self, record: NodeRecord) -> Result<Option<NodeRecord>> {
        let mut records = self.write()?;
        debug!(node_id = %record.id, fields = record.template.len(), "storing node record");
        Ok(records.insert(record.id.clone(), record))
    }

    /// Snapshot of a record.
    pub fn get(&self, id: &NodeId) -> Result<Option<NodeRecord>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Snapshot of a record's template.
    pub fn template(&self, id: &NodeId) -> Result<Option<NodeTemplate>> {
        Ok(self.read()?.get(id).map(|record| record.template.clone()))
    }

    pub fn remove(&self, id: &NodeId) -> Result<Option<NodeRecord>> {
        Ok(self.write()?.remove(id))
    }

    pub fn contains(&self, id: &NodeId) -> Result<bool> {
        Ok(self.read()?.contains_key(id))
    }

    /// Node ids in sorted order.
    pub fn ids(&self) -> Result<Vec<NodeId>> {
        let mut ids: Vec<NodeId> = self.read()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Replace the template of `id` wholesale, leaving every other record
    /// attribute untouched. Returns the template that was replaced.
    pub fn replace_template(&self, id: &NodeId, template: NodeTemplate) -> Result<NodeTemplate> {
        let mut records = self.write()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| SessionError::NodeNotFound {
                node_id: id.clone(),
            })?;
        Ok(std::mem::replace(&mut record.template, template))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<NodeId, NodeRecord>>> {
        self.records.read().map_err(|_| SessionError::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<NodeId, NodeRecord>>> {
        self.records.write().map_err(|_| SessionError::StorePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeparam_fields::FieldDescriptor;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn record(id: &str, value: &str) -> NodeRecord {
        let mut template = NodeTemplate::new();
        template.insert(
            "api_key".into(),
            FieldDescriptor::new("str").with_value(value),
        );
        template.insert(
            "model_name".into(),
            FieldDescriptor::new("str").with_value(value),
        );
        NodeRecord::new(id, "OpenAI", template).with_description("LLM node")
    }

    #[test]
    fn insert_get_remove() {
        let store = TemplateStore::new();
        assert!(store.is_empty().unwrap());

        let id = NodeId::new("OpenAI-1");
        assert!(store.insert(record("OpenAI-1", "")).unwrap().is_none());
        assert!(store.contains(&id).unwrap());
        assert_eq!(store.get(&id).unwrap().unwrap().node_type, "OpenAI");

        let removed = store.remove(&id).unwrap();
        assert!(removed.is_some());
        assert!(store.get(&id).unwrap().is_none());
    }

    #[test]
    fn ids_are_sorted() {
        let store = TemplateStore::from_records([record("b", ""), record("a", ""), record("c", "")]);
        let ids: Vec<String> = store
            .ids()
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn replace_template_keeps_other_attributes() {
        let store = TemplateStore::from_records([record("OpenAI-1", "")]);
        let id = NodeId::new("OpenAI-1");

        let mut replacement = NodeTemplate::new();
        replacement.insert("api_key".into(), FieldDescriptor::new("str").with_value("sk-9"));
        let previous = store.replace_template(&id, replacement.clone()).unwrap();

        assert_eq!(previous["api_key"].value, json!(""));
        let stored = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.template, replacement);
        assert_eq!(stored.node_type, "OpenAI");
        assert_eq!(stored.description.as_deref(), Some("LLM node"));
    }

    #[test]
    fn replace_template_on_missing_node_fails() {
        let store = TemplateStore::new();
        let err = store
            .replace_template(&NodeId::new("gone"), NodeTemplate::new())
            .unwrap_err();
        assert!(matches!(err, SessionError::NodeNotFound { .. }));
    }

    #[test]
    fn readers_never_see_partial_templates() {
        let store = Arc::new(TemplateStore::from_records([record("n", "old")]));
        let id = NodeId::new("n");

        thread::scope(|scope| {
            for _ in 0..4 {
                let store = Arc::clone(&store);
                let id = id.clone();
                scope.spawn(move || {
                    for _ in 0..500 {
                        let template = store.template(&id).unwrap().unwrap();
                        let api_key = &template["api_key"].value;
                        let model = &template["model_name"].value;
                        assert_eq!(api_key, model, "observed a half-applied template");
                    }
                });
            }

            for i in 0..200 {
                let value = format!("v{i}");
                store.replace_template(&id, record("n", &value).template).unwrap();
            }
        });
    }
}
