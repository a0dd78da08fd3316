//! The JSON store: a previous JSON rendering kept by the calling shell in
//! the `DOCOPTS_JSON` environment variable.

use crate::config::StoreFormat;
use crate::output::RenderError;
use crate::value::json_to_shell;
use serde_json::{Map, Value as JsonValue};
use std::io::Write;
use thiserror::Error;

/// Name of the environment variable holding the store.
pub const STORE_VAR: &str = "DOCOPTS_JSON";

/// Errors that can occur while reading the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DOCOPTS_JSON is not set")]
    Missing,

    #[error("DOCOPTS_JSON is empty")]
    Empty,

    #[error("DOCOPTS_JSON is not valid JSON: {0}")]
    Invalid(#[source] serde_json::Error),

    #[error("DOCOPTS_JSON must hold a JSON object")]
    NotAnObject,

    #[error("key '{0}' not found in DOCOPTS_JSON")]
    KeyNotFound(String),
}

/// Parsed contents of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStore {
    entries: Map<String, JsonValue>,
}

impl JsonStore {
    /// Load the store from the raw environment value.
    pub fn load(raw: Option<&str>) -> Result<JsonStore, StoreError> {
        let raw = raw.ok_or(StoreError::Missing)?;
        if raw.trim().is_empty() {
            return Err(StoreError::Empty);
        }
        Self::from_json(raw)
    }

    /// Parse a JSON object.
    pub fn from_json(json: &str) -> Result<JsonStore, StoreError> {
        match serde_json::from_str(json).map_err(StoreError::Invalid)? {
            JsonValue::Object(entries) => Ok(JsonStore { entries }),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Look up a stored value.
    pub fn get(&self, key: &str) -> Result<&JsonValue, StoreError> {
        self.entries
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Merge in values from another object.
    ///
    /// Stored values win; `other` only fills keys that are missing or null.
    pub fn merge(&mut self, other: JsonStore) {
        for (key, value) in other.entries {
            match self.entries.get(&key) {
                Some(existing) if !existing.is_null() => {}
                _ => {
                    self.entries.insert(key, value);
                }
            }
        }
    }

    /// Write the store in a file format; JSON is pretty-printed.
    pub fn write<W: Write + ?Sized>(&self, out: &mut W, format: StoreFormat) -> Result<(), RenderError> {
        match format {
            StoreFormat::Json => self.write_json(out, true),
            StoreFormat::Ini => Err(RenderError::NotSupported("ini")),
        }
    }

    /// Write the store as JSON.
    pub fn write_json<W: Write + ?Sized>(&self, out: &mut W, pretty: bool) -> Result<(), RenderError> {
        let encoded = if pretty {
            serde_json::to_string_pretty(&self.entries)?
        } else {
            serde_json::to_string(&self.entries)?
        };
        out.write_all(encoded.as_bytes())?;
        Ok(())
    }
}

/// Print the shell rendering of one stored value, followed by a newline.
pub fn print_value<W: Write + ?Sized>(
    out: &mut W,
    store: &JsonStore,
    key: &str,
) -> anyhow::Result<()> {
    let value = store.get(key)?;
    let text = json_to_shell(value)?;
    writeln!(out, "{}", text)?;
    Ok(())
}

/// Print all stored keys on one line, separated by spaces.
pub fn print_keys<W: Write + ?Sized>(out: &mut W, store: &JsonStore) -> anyhow::Result<()> {
    writeln!(out, "{}", store.keys().join(" "))?;
    Ok(())
}
