//! Core types for the telemetry decoder library
//!
//! This module defines the types the decoder emits when processing frames
//! from the vehicle bus, together with the error taxonomy. The decoder is
//! stateless and only outputs decoded measurements - it does not aggregate
//! or track values across frames.

use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur during decoding
///
/// None of these are fatal to the stream: the surrounding read loop drops
/// the offending frame and continues.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Frame is {actual} bytes, expected {expected}")]
    FrameFormat { expected: usize, actual: usize },

    #[error("Frame field `{field}` is not valid ASCII hex")]
    FrameEncoding { field: &'static str },

    #[error("No schema entry for identifier {identifier}")]
    SchemaNotFound { identifier: String },

    #[error("Bit range [{low}, {high}] outside payload of {bit_len} bits")]
    BitRange {
        low: usize,
        high: usize,
        bit_len: usize,
    },

    #[error("Unknown measurement type tag: {type_tag}")]
    UnknownType { type_tag: String },

    #[error("Type `{type_tag}` needs a {expected}-bit field, got {actual} bits")]
    FieldWidth {
        type_tag: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("Failed to parse schema document: {0}")]
    SchemaParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Measurement value types produced by the decoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementValue {
    /// Boolean value (single-bit flags)
    Boolean(bool),
    /// Signed integer value
    Integer(i64),
    /// Floating-point value (after fixed-point scaling)
    Float(f64),
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            MeasurementValue::Integer(v) => write!(f, "{}", v),
            MeasurementValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl MeasurementValue {
    /// Convert to f64 regardless of variant
    pub fn as_f64(&self) -> f64 {
        match self {
            MeasurementValue::Boolean(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            MeasurementValue::Integer(v) => *v as f64,
            MeasurementValue::Float(v) => *v,
        }
    }

    /// Convert to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MeasurementValue::Boolean(v) => Some(if *v { 1 } else { 0 }),
            MeasurementValue::Integer(v) => Some(*v),
            MeasurementValue::Float(v) => Some(*v as i64),
        }
    }

    /// Truthiness of the value
    pub fn as_bool(&self) -> bool {
        match self {
            MeasurementValue::Boolean(v) => *v,
            MeasurementValue::Integer(v) => *v != 0,
            MeasurementValue::Float(v) => *v != 0.0,
        }
    }
}

/// A single decoded physical value with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Measurement name from the schema (e.g., "state_of_charge")
    pub name: String,
    /// Where the data came from (schema `source`, e.g., "battery")
    pub source: String,
    /// Class label of the containing message (schema `name`, e.g., "BMS")
    pub class: String,
    /// Decoded value
    pub value: MeasurementValue,
}

/// A fully decoded frame - the primary output of the decoder
///
/// Measurements appear in schema-declared order; that order is part of the
/// output contract.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Bus-relative timestamp from the wire record
    pub timestamp: u32,
    /// Frame identifier
    pub identifier: u16,
    /// Canonical hex form of the identifier (the schema key, e.g., "0x100")
    pub hex_identifier: String,
    /// Declared data length nibble from the wire record
    pub declared_length: u8,
    /// Decoded measurements, in schema-declared order
    pub measurements: Vec<Measurement>,
}

impl DecodedFrame {
    /// Look up a measurement by name
    pub fn measurement(&self, name: &str) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.name == name)
    }
}
