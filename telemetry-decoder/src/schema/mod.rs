//! Measurement schema documents and lookup
//!
//! A schema document maps frame identifiers to named, typed measurement
//! specs. It is loaded once at startup and read-only afterwards.

pub mod document;
pub mod loader;

// Re-export key types for convenience
pub use document::{
    canonical_identifier, FieldSpec, MeasurementSchema, Measurements, SchemaSet, SchemaStats,
};
pub use loader::load_schema_file;
