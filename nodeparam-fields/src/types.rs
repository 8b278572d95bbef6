//! Core node and field types.
//!
//! A node record owns a template: a mapping from field key to the descriptor
//! of that field. Descriptors serialize with the attribute names used by flow
//! documents (`show`, `info`, `load_from_db`, `proxy`), and any attribute the
//! model does not name is kept in `extra` so a template survives a round trip
//! through an editing session untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldsError, Result};

/// Identifier of a node in the owning flow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Field kinds the editor knows how to hand to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Str,
    Bool,
    Float,
    Code,
    Prompt,
    File,
    Int,
    Dict,
    #[serde(rename = "NestedDict")]
    NestedDict,
}

impl FieldKind {
    /// Every kind, in the order the default supported set lists them.
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Str,
        FieldKind::Bool,
        FieldKind::Float,
        FieldKind::Code,
        FieldKind::Prompt,
        FieldKind::File,
        FieldKind::Int,
        FieldKind::Dict,
        FieldKind::NestedDict,
    ];

    /// The type name as it appears in a descriptor's `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Str => "str",
            FieldKind::Bool => "bool",
            FieldKind::Float => "float",
            FieldKind::Code => "code",
            FieldKind::Prompt => "prompt",
            FieldKind::File => "file",
            FieldKind::Int => "int",
            FieldKind::Dict => "dict",
            FieldKind::NestedDict => "NestedDict",
        }
    }

    /// Parse a descriptor type name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a proxy field to the field it mirrors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldProxy {
    pub field: String,
    pub id: String,
}

/// One entry of a node template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "show", default)]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub advanced: bool,
    #[serde(rename = "load_from_db", default, skip_serializing_if = "is_false")]
    pub load_from_source: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "info", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<FieldProxy>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub password: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Attributes not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldDescriptor {
    /// A visible, non-advanced descriptor of the given type with a null value.
    pub fn new(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_proxy(mut self, proxy: FieldProxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// The field kind, if the type name is one the editor knows.
    pub fn kind(&self) -> Option<FieldKind> {
        FieldKind::parse(&self.type_)
    }

    /// Whether this field mirrors another field through a proxy reference.
    pub fn is_code_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Row label: a non-empty `display_name`, else `name`, else the key.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.name.as_deref())
            .unwrap_or(key)
    }
}

/// Field key to descriptor. Iteration follows insertion order, which is
/// deterministic but carries no meaning.
pub type NodeTemplate = IndexMap<String, FieldDescriptor>;

/// The authoritative record of one node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub template: NodeTemplate,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>, template: NodeTemplate) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            description: None,
            display_name: None,
            template,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a flat record `{id, type, description, template}`.
    ///
    /// A missing or non-object `template` and any shape mismatch are
    /// reported as [`FieldsError::InvalidSource`].
    pub fn from_json(value: Value) -> Result<Self> {
        match value.get("template") {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(FieldsError::invalid_source("template is not an object")),
            None => return Err(FieldsError::invalid_source("missing template")),
        }
        serde_json::from_value(value).map_err(|e| FieldsError::invalid_source(e.to_string()))
    }

    /// Parse a flat record from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(value)
    }

    /// Parse node data as it appears in a flow document:
    /// `{id, type, node: {template, description, display_name, ..}}`.
    pub fn from_node_data(data: &Value) -> Result<Self> {
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| FieldsError::invalid_source("missing node id"))?;
        let node_type = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| FieldsError::invalid_source("missing node type"))?;
        let node = data
            .get("node")
            .and_then(Value::as_object)
            .ok_or_else(|| FieldsError::invalid_source("missing node body"))?;
        let template = match node.get("template") {
            Some(Value::Object(fields)) => {
                serde_json::from_value::<NodeTemplate>(Value::Object(fields.clone()))
                    .map_err(|e| FieldsError::invalid_source(e.to_string()))?
            }
            Some(_) => return Err(FieldsError::invalid_source("template is not an object")),
            None => return Err(FieldsError::invalid_source("missing template")),
        };

        Ok(Self {
            id: NodeId::new(id),
            node_type: node_type.to_string(),
            description: node
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            display_name: node
                .get("display_name")
                .and_then(Value::as_str)
                .map(str::to_string),
            template,
        })
    }
}
