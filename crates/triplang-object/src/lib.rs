//! `.tripc` object-file model and JSON codec.
//!
//! An object file is a JSON document with four top-level keys: `module`,
//! `exports`, `imports`, and `definitions`. Definitions keep their source
//! order, so serialization is deterministic for a given compilation. Big
//! integers inside literal terms travel as `{"__trip_bigint__": "<decimal>"}`
//! objects in both directions.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triplang_core::Def;


/// File extension of compiled modules.
pub const EXTENSION: &str = "tripc";

/// Errors from reading or writing object files.
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("invalid object file JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object file schema violation: {0}")]
    Schema(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One `imports` entry: `name` imported from module `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub name: String,
    pub from: String,
}

/// A compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectModule {
    pub module: String,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub imports: Vec<ImportEntry>,
    #[serde(default)]
    pub definitions: IndexMap<String, Def>,
}

impl ObjectModule {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            exports: Vec::new(),
            imports: Vec::new(),
            definitions: IndexMap::new(),
        }
    }

    /// Parse and validate an object file.
    pub fn from_json(text: &str) -> Result<Self, ObjectError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        validate_schema(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to the canonical JSON form.
    pub fn to_json(&self) -> Result<String, ObjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate an object file from disk.
    pub fn read(path: &Path) -> Result<Self, ObjectError> {
        let text = std::fs::read_to_string(path).map_err(|source| ObjectError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Write the canonical JSON form to disk.
    pub fn write(&self, path: &Path) -> Result<(), ObjectError> {
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|source| ObjectError::Io {
            path: path.to_owned(),
            source,
        })
    }
}

/// Check the top-level shape before handing the document to serde, so schema
/// problems are reported in the object file's own vocabulary.
fn validate_schema(value: &serde_json::Value) -> Result<(), ObjectError> {
    let Some(obj) = value.as_object() else {
        return Err(ObjectError::Schema("document is not an object".to_owned()));
    };
    if !obj.get("module").is_some_and(serde_json::Value::is_string) {
        return Err(ObjectError::Schema("'module' must be a string".to_owned()));
    }
    if let Some(exports) = obj.get("exports") {
        let Some(entries) = exports.as_array() else {
            return Err(ObjectError::Schema("'exports' must be an array".to_owned()));
        };
        if entries.iter().any(|e| !e.is_string()) {
            return Err(ObjectError::Schema(
                "'exports' entries must be strings".to_owned(),
            ));
        }
    }
    if let Some(imports) = obj.get("imports") {
        let Some(entries) = imports.as_array() else {
            return Err(ObjectError::Schema("'imports' must be an array".to_owned()));
        };
        for entry in entries {
            let well_formed = entry.as_object().is_some_and(|e| {
                e.get("name").is_some_and(serde_json::Value::is_string)
                    && e.get("from").is_some_and(serde_json::Value::is_string)
            });
            if !well_formed {
                return Err(ObjectError::Schema(
                    "'imports' entries must have string 'name' and 'from'".to_owned(),
                ));
            }
        }
    }
    if let Some(definitions) = obj.get("definitions")
        && !definitions.is_object()
    {
        return Err(ObjectError::Schema(
            "'definitions' must be an object".to_owned(),
        ));
    }
    Ok(())
}
