//! Metadata Configuration - Directive Source of Truth
//!
//! Loads the declarative directive mapping and enforces the three legal
//! value shapes up front. A malformed value aborts the load; it is never
//! silently dropped from the rendered header.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Reserved key: a rendering mode switch consumed at load time,
/// never emitted as a directive.
pub const COMPAT_KEY: &str = "GM3Compat";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("directive `{key}` has an unsupported shape: expected string, boolean, or array of strings")]
    UnsupportedShape { key: String },

    #[error("`GM3Compat` must be a boolean")]
    CompatFlagShape,

    #[error("failed to read metadata file: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A directive value. These three shapes are the whole contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

/// The directive mapping, in declaration order.
///
/// Order is semantic: the rendered header lists directives exactly as the
/// source document declares them, so the backing store is an ordered list,
/// not a hash map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataConfig {
    directives: Vec<(String, DirectiveValue)>,
    gm3_compat: bool,
}

impl MetadataConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directive, preserving declaration order. Re-setting an
    /// existing key replaces its value in place and keeps its original
    /// position. The reserved compat key routes to the mode switch instead.
    pub fn set(&mut self, name: &str, value: DirectiveValue) {
        if name == COMPAT_KEY {
            match value {
                DirectiveValue::Flag(enabled) => self.gm3_compat = enabled,
                _ => warn!("ignoring non-boolean `GM3Compat`"),
            }
            return;
        }

        match self.directives.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.directives.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveValue> {
        self.directives
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Directives in declaration order.
    pub fn directives(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.directives.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Whether legacy `GM_*` grant lines are emitted alongside the
    /// namespaced `GM.*` form.
    pub fn gm3_compat(&self) -> bool {
        self.gm3_compat
    }

    /// Shape-checked conversion from a parsed JSON document. Fails on the
    /// first malformed value.
    pub fn from_json_value(doc: Value) -> Result<Self, MetadataError> {
        let map = match doc {
            Value::Object(map) => map,
            other => return Err(MetadataError::NotAnObject(json_type_name(&other))),
        };

        let mut config = Self::new();
        for (key, value) in map {
            if key == COMPAT_KEY {
                match value {
                    Value::Bool(enabled) => config.gm3_compat = enabled,
                    _ => return Err(MetadataError::CompatFlagShape),
                }
                continue;
            }

            let value = match value {
                Value::String(s) => DirectiveValue::Text(s),
                Value::Bool(b) => DirectiveValue::Flag(b),
                Value::Array(items) => {
                    let mut list = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(s) => list.push(s),
                            _ => return Err(MetadataError::UnsupportedShape { key }),
                        }
                    }
                    DirectiveValue::List(list)
                }
                _ => return Err(MetadataError::UnsupportedShape { key }),
            };
            config.directives.push((key, value));
        }

        debug!(
            directives = config.directives.len(),
            gm3_compat = config.gm3_compat,
            "metadata loaded"
        );
        Ok(config)
    }

    pub fn from_json_str(document: &str) -> Result<Self, MetadataError> {
        Self::from_json_value(serde_json::from_str(document)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, MetadataError> {
        debug!(path = %path.display(), "reading metadata file");
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
