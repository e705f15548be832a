//! Value decoders
//!
//! Maps a schema type tag to the numeric reconstruction applied to an
//! extracted bit field. Dispatch is an exhaustive enum rather than a lookup
//! table of functions; an unknown tag is an explicit error at resolution
//! time. Every decoder is a pure function of the field bits.

use crate::bitfield::BitField;
use crate::types::{DecoderError, MeasurementValue, Result};
use std::fmt;

/// Fixed-point scale applied by the `incremental` decoder (tenths of a unit)
const INCREMENTAL_SCALE: f64 = 0.1;

/// Measurement value types supported by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Single-bit flag
    Bool,
    /// Unsigned base-2 integer of any width
    Unsigned,
    /// 8-bit two's-complement integer
    Signed8,
    /// 16-bit two's-complement integer
    Signed16,
    /// Unsigned integer scaled to tenths
    Incremental,
}

impl ValueType {
    /// Resolve a schema type tag
    pub fn from_tag(tag: &str) -> Result<ValueType> {
        match tag {
            "bool" => Ok(ValueType::Bool),
            "unsigned" => Ok(ValueType::Unsigned),
            "signed_8" => Ok(ValueType::Signed8),
            "signed_16" => Ok(ValueType::Signed16),
            "incremental" => Ok(ValueType::Incremental),
            _ => Err(DecoderError::UnknownType {
                type_tag: tag.to_string(),
            }),
        }
    }

    /// Canonical tag for this type
    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Unsigned => "unsigned",
            ValueType::Signed8 => "signed_8",
            ValueType::Signed16 => "signed_16",
            ValueType::Incremental => "incremental",
        }
    }

    /// Decode an extracted bit field into a measurement value
    pub fn decode(&self, field: &BitField) -> Result<MeasurementValue> {
        match self {
            ValueType::Bool => {
                self.require_width(field, 1)?;
                Ok(MeasurementValue::Boolean(field.raw() != 0))
            }
            ValueType::Unsigned => Ok(MeasurementValue::Integer(field.raw() as i64)),
            ValueType::Signed8 => Ok(MeasurementValue::Integer(decode_signed(self, field, 8)?)),
            ValueType::Signed16 => Ok(MeasurementValue::Integer(decode_signed(self, field, 16)?)),
            ValueType::Incremental => Ok(MeasurementValue::Float(
                field.raw() as f64 * INCREMENTAL_SCALE,
            )),
        }
    }

    fn require_width(&self, field: &BitField, expected: u8) -> Result<()> {
        if field.width() != expected {
            return Err(DecoderError::FieldWidth {
                type_tag: self.tag(),
                expected,
                actual: field.width(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Two's-complement reconstruction, parametrized by width
///
/// The leading bit of the field is the sign. For negative values the
/// magnitude is recovered by invert-and-increment on the remaining bits:
/// `-((ceiling - tail) + 1)` where `ceiling = 2^(width-1) - 1`.
fn decode_signed(value_type: &ValueType, field: &BitField, width: u8) -> Result<i64> {
    value_type.require_width(field, width)?;

    let raw = field.raw();
    let sign = (raw >> (width - 1)) & 0x01;
    let ceiling = (1u64 << (width - 1)) - 1;
    let tail = raw & ceiling;

    if sign == 1 {
        Ok(-(((ceiling - tail) + 1) as i64))
    } else {
        Ok(tail as i64)
    }
}
