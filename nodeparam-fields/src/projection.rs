//! Row projection for the parameter grid.
//!
//! Rows are rebuilt from the template on every call. Nothing is cached, so a
//! renderer that asks again after an edit always sees the current draft.

use serde::Serialize;

use crate::filter::FieldFilter;
use crate::types::{FieldKind, NodeTemplate};
use crate::value::FieldValue;

/// One editable field as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldProjection {
    pub key: String,
    pub display_label: String,
    pub description: String,
    pub value: FieldValue,
    pub advanced: bool,
    /// Known kind of the field; `None` for extra type names enabled
    /// through configuration.
    pub kind: Option<FieldKind>,
    /// Type name from the descriptor, as written.
    pub field_type: String,
    pub load_from_source: bool,
}

impl FieldProjection {
    /// The "Show" column is the inverse of `advanced`.
    pub fn show(&self) -> bool {
        !self.advanced
    }
}

/// Builds rows from a template through a [`FieldFilter`].
#[derive(Debug, Clone, Default)]
pub struct ProjectionBuilder {
    filter: FieldFilter,
}

impl ProjectionBuilder {
    pub fn new(filter: FieldFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &FieldFilter {
        &self.filter
    }

    /// Rows for every projectable field, in template iteration order.
    pub fn build(&self, template: &NodeTemplate) -> Vec<FieldProjection> {
        template
            .iter()
            .filter(|(key, descriptor)| self.filter.is_projectable(key, descriptor))
            .map(|(key, descriptor)| FieldProjection {
                key: key.clone(),
                display_label: descriptor.label(key).to_string(),
                description: descriptor.description.clone().unwrap_or_default(),
                value: FieldValue::from_type_name(&descriptor.type_, &descriptor.value),
                advanced: descriptor.advanced,
                kind: descriptor.kind(),
                field_type: descriptor.type_.clone(),
                load_from_source: descriptor.load_from_source,
            })
            .collect()
    }

    /// Whether `build` would produce at least one row.
    pub fn has_editable_fields(&self, template: &NodeTemplate) -> bool {
        template
            .iter()
            .any(|(key, descriptor)| self.filter.is_projectable(key, descriptor))
    }
}

/// Rows for `template` using the default supported type set.
pub fn build_projections(template: &NodeTemplate) -> Vec<FieldProjection> {
    ProjectionBuilder::default().build(template)
}
