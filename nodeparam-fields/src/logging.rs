//! Log formatting helpers.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Debug, Display};

use crate::types::{FieldDescriptor, NodeTemplate};

/// Renders a serializable value as YAML inside tracing output.
///
/// ```ignore
/// use nodeparam_fields::{Pretty, TemplateChanges};
/// tracing::trace!("committing: {}", Pretty(TemplateChanges::between(&before, &after)));
/// ```
///
/// The YAML starts on a new line. If serialization fails the value's
/// `Debug` form is printed instead.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> Display for Pretty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{yaml}"),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> Debug for Pretty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// The entries of `after` that differ from `before`, keyed by field.
///
/// Templates keep their key set for the life of a session, so this is the
/// full record of what an edit changed. Serializes as a plain map.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TemplateChanges<'a>(IndexMap<&'a str, &'a FieldDescriptor>);

impl<'a> TemplateChanges<'a> {
    pub fn between(before: &NodeTemplate, after: &'a NodeTemplate) -> Self {
        Self(
            after
                .iter()
                .filter(|(key, descriptor)| before.get(key.as_str()) != Some(*descriptor))
                .map(|(key, descriptor)| (key.as_str(), descriptor))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.0.keys().copied()
    }
}
