//! Editor configuration loaded with Figment.
//!
//! Sources are merged in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. An optional configuration file (YAML, TOML or JSON, by extension)
//! 3. Environment variables prefixed with `NODEPARAM_`

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::filter::{FieldFilter, SupportedTypes};
use crate::projection::ProjectionBuilder;
use crate::types::FieldKind;

/// What an open request does when a session is already editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReopenPolicy {
    /// Drop the in-progress draft and restart from the new source.
    #[default]
    Reset,
    /// Refuse the request; the caller must close the session first.
    Reject,
}

/// Configuration for the parameter editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Field type names the grid renders.
    #[serde(default = "default_supported_types")]
    pub supported_types: Vec<String>,
    #[serde(default)]
    pub reopen_policy: ReopenPolicy,
}

fn default_supported_types() -> Vec<String> {
    FieldKind::ALL
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            supported_types: default_supported_types(),
            reopen_policy: ReopenPolicy::default(),
        }
    }
}

impl EditorConfig {
    pub const ENV_PREFIX: &'static str = "NODEPARAM_";

    /// Load defaults overlaid with environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load defaults, then `path` if given, then environment variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract()?;
        debug!(
            supported_types = config.supported_types.len(),
            reopen_policy = ?config.reopen_policy,
            "editor configuration loaded"
        );
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(file_figment(path)?);
        }
        Ok(figment.merge(Env::prefixed(Self::ENV_PREFIX)))
    }

    pub fn supported_types(&self) -> SupportedTypes {
        SupportedTypes::new(self.supported_types.iter().cloned())
    }

    pub fn field_filter(&self) -> FieldFilter {
        FieldFilter::new(self.supported_types())
    }

    pub fn projection_builder(&self) -> ProjectionBuilder {
        ProjectionBuilder::new(self.field_filter())
    }
}

fn file_figment(path: &Path) -> Result<Figment> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(FieldsError::UnsupportedConfigFormat {
            path: path.to_path_buf(),
        }),
    }
}
