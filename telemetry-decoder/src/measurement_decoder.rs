//! Measurement assembly
//!
//! Turns a parsed frame plus its schema entry into the finished measurement
//! set: per declared measurement, slice the payload bits, decode by type
//! tag, and attach provenance. A failure on any field drops the whole
//! frame - partial measurement sets are never produced.

use crate::frame::TelemetryFrame;
use crate::schema::{MeasurementSchema, SchemaSet};
use crate::types::{DecodedFrame, DecoderError, Measurement, Result};
use crate::value::ValueType;

/// Measurement decoder - assembles measurements from parsed frames
pub struct MeasurementDecoder;

impl MeasurementDecoder {
    /// Decode a frame against the schema table
    ///
    /// Looks up the frame's identifier; absence is a recoverable
    /// `SchemaNotFound`. Field-level failures (`UnknownType`, `BitRange`,
    /// `FieldWidth`) propagate unchanged and abort the frame.
    pub fn decode_frame(frame: &TelemetryFrame, schemas: &SchemaSet) -> Result<DecodedFrame> {
        let schema = schemas
            .get(&frame.hex_identifier)
            .ok_or_else(|| DecoderError::SchemaNotFound {
                identifier: frame.hex_identifier.clone(),
            })?;

        let measurements = Self::assemble(frame, schema)?;

        log::trace!(
            "Decoded {} measurement(s) from {}",
            measurements.len(),
            frame.hex_identifier
        );

        Ok(DecodedFrame {
            timestamp: frame.timestamp,
            identifier: frame.identifier,
            hex_identifier: frame.hex_identifier.clone(),
            declared_length: frame.declared_length,
            measurements,
        })
    }

    /// Extract and decode every declared measurement, in schema order
    fn assemble(frame: &TelemetryFrame, schema: &MeasurementSchema) -> Result<Vec<Measurement>> {
        let mut measurements = Vec::with_capacity(schema.measurements.len());

        for (name, spec) in schema.measurements.iter() {
            let value_type = ValueType::from_tag(&spec.type_tag)?;
            let field = frame.payload.slice(&spec.bits)?;
            let value = value_type.decode(&field)?;

            measurements.push(Measurement {
                name: name.clone(),
                source: schema.source.clone(),
                class: schema.name.clone(),
                value,
            });
        }

        Ok(measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitfield::BitRange;
    use crate::schema::{FieldSpec, Measurements};
    use crate::types::MeasurementValue;

    fn frame_with_payload(identifier: u16, payload: [u8; 8]) -> TelemetryFrame {
        let mut raw = format!("{:08X}{:04X}", 0x1000u32, identifier);
        for byte in payload {
            raw.push_str(&format!("{:02X}", byte));
        }
        raw.push_str("8\n");
        TelemetryFrame::parse(raw.as_bytes()).unwrap()
    }

    fn schema_set(identifier: &str, entries: Vec<(&str, BitRange, &str)>) -> SchemaSet {
        let measurements = Measurements::new(
            entries
                .into_iter()
                .map(|(name, bits, tag)| {
                    (
                        name.to_string(),
                        FieldSpec {
                            bits,
                            type_tag: tag.to_string(),
                        },
                    )
                })
                .collect(),
        );
        let mut set = SchemaSet::new();
        set.add_schema(
            identifier,
            MeasurementSchema {
                name: "BMS".to_string(),
                source: "battery".to_string(),
                measurements,
            },
        );
        set
    }

    #[test]
    fn test_end_to_end_assembly() {
        // schema: soc over the first payload byte; frame carries 0x64
        let schemas = schema_set("0x100", vec![("soc", BitRange::Span(0, 7), "unsigned")]);
        let frame = frame_with_payload(0x100, [0x64, 0, 0, 0, 0, 0, 0, 0]);

        let decoded = MeasurementDecoder::decode_frame(&frame, &schemas).unwrap();
        assert_eq!(decoded.measurements.len(), 1);

        let soc = decoded.measurement("soc").unwrap();
        assert_eq!(soc.source, "battery");
        assert_eq!(soc.class, "BMS");
        assert_eq!(soc.value, MeasurementValue::Integer(100));
    }

    #[test]
    fn test_measurements_keep_schema_order() {
        let schemas = schema_set(
            "0x100",
            vec![
                ("voltage", BitRange::Span(0, 15), "signed_16"),
                ("current", BitRange::Span(16, 31), "signed_16"),
                ("fault", BitRange::Single(32), "bool"),
            ],
        );
        let frame = frame_with_payload(0x100, [0x00, 0x10, 0xFF, 0xFF, 0x80, 0, 0, 0]);

        let decoded = MeasurementDecoder::decode_frame(&frame, &schemas).unwrap();
        let names: Vec<&str> = decoded
            .measurements
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["voltage", "current", "fault"]);

        assert_eq!(decoded.measurements[0].value, MeasurementValue::Integer(16));
        assert_eq!(decoded.measurements[1].value, MeasurementValue::Integer(-1));
        assert_eq!(decoded.measurements[2].value, MeasurementValue::Boolean(true));
    }

    #[test]
    fn test_unknown_identifier_is_recoverable() {
        let schemas = schema_set("0x100", vec![("soc", BitRange::Span(0, 7), "unsigned")]);
        let stray = frame_with_payload(0x999, [0; 8]);

        assert!(matches!(
            MeasurementDecoder::decode_frame(&stray, &schemas),
            Err(DecoderError::SchemaNotFound { ref identifier }) if identifier == "0x999"
        ));

        // a following valid frame still decodes - no residual state
        let frame = frame_with_payload(0x100, [0x64, 0, 0, 0, 0, 0, 0, 0]);
        assert!(MeasurementDecoder::decode_frame(&frame, &schemas).is_ok());
    }

    #[test]
    fn test_field_failure_drops_whole_frame() {
        let schemas = schema_set(
            "0x100",
            vec![
                ("soc", BitRange::Span(0, 7), "unsigned"),
                ("bogus", BitRange::Span(60, 70), "unsigned"),
            ],
        );
        let frame = frame_with_payload(0x100, [0x64, 0, 0, 0, 0, 0, 0, 0]);

        // first field would decode fine, but the bad one aborts everything
        assert!(matches!(
            MeasurementDecoder::decode_frame(&frame, &schemas),
            Err(DecoderError::BitRange { .. })
        ));
    }

    #[test]
    fn test_unknown_type_tag_propagates() {
        let schemas = schema_set("0x100", vec![("soc", BitRange::Span(0, 7), "float32")]);
        let frame = frame_with_payload(0x100, [0; 8]);

        assert!(matches!(
            MeasurementDecoder::decode_frame(&frame, &schemas),
            Err(DecoderError::UnknownType { ref type_tag }) if type_tag == "float32"
        ));
    }
}
