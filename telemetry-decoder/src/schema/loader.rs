//! Schema document loading
//!
//! Reads a schema document from disk and returns its entries. The document
//! is a top-level map from `"0x<hex>"` identifier to schema entry; JSON and
//! TOML carry the same shape and are selected by file extension.

use crate::schema::document::{canonical_identifier, MeasurementSchema};
use crate::types::{DecoderError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parse a schema document file and return its identifier/schema entries
pub fn load_schema_file(path: &Path) -> Result<Vec<(String, MeasurementSchema)>> {
    log::info!("Loading schema document: {:?}", path);

    let content = std::fs::read_to_string(path).map_err(|e| {
        DecoderError::SchemaParse(format!("Failed to read file {:?}: {}", path, e))
    })?;

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    let document: HashMap<String, MeasurementSchema> = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|e| {
            DecoderError::SchemaParse(format!("Failed to parse JSON schema {:?}: {}", path, e))
        })?,
        Some("toml") => toml::from_str(&content).map_err(|e| {
            DecoderError::SchemaParse(format!("Failed to parse TOML schema {:?}: {}", path, e))
        })?,
        _ => {
            return Err(DecoderError::SchemaParse(format!(
                "Unsupported schema format: {:?}",
                extension
            )))
        }
    };

    let mut entries: Vec<(String, MeasurementSchema)> = document
        .into_iter()
        .map(|(key, schema)| (canonical_identifier(&key), schema))
        .collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    log::info!("Parsed {} schema entries from {:?}", entries.len(), path);

    Ok(entries)
}
