//! Measurement sinks
//!
//! Decoded measurements leave the process as InfluxDB line protocol, one
//! point per measurement: the schema `source` is the measurement name,
//! `car` and `class` are tags, and the decoded value is the field. Points
//! are stamped with receive time; the wire timestamp is bus-relative and
//! only appears in the printed frame summaries.

use chrono::{DateTime, Utc};
use std::io::{self, Write};
use telemetry_decoder::{DecodedFrame, MeasurementValue};

/// Destination for decoded measurement sets
pub trait MeasurementSink {
    fn write_frame(&mut self, frame: &DecodedFrame, received_at: DateTime<Utc>) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// InfluxDB line-protocol writer
pub struct LineProtocolSink<W: Write> {
    out: W,
    car: String,
}

impl<W: Write> LineProtocolSink<W> {
    pub fn new(out: W, car: impl Into<String>) -> Self {
        Self {
            out,
            car: car.into(),
        }
    }
}

impl<W: Write> MeasurementSink for LineProtocolSink<W> {
    fn write_frame(&mut self, frame: &DecodedFrame, received_at: DateTime<Utc>) -> io::Result<()> {
        let timestamp_ns = received_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| received_at.timestamp_millis().saturating_mul(1_000_000));

        for m in &frame.measurements {
            writeln!(
                self.out,
                "{},car={},class={} {}={} {}",
                escape(&m.source),
                escape(&self.car),
                escape(&m.class),
                escape(&m.name),
                field_value(&m.value),
                timestamp_ns
            )?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Line-protocol field value rendering
///
/// Integers carry the `i` suffix; booleans and floats are written plain.
fn field_value(value: &MeasurementValue) -> String {
    match value {
        MeasurementValue::Boolean(v) => (if *v { "true" } else { "false" }).to_string(),
        MeasurementValue::Integer(v) => format!("{}i", v),
        MeasurementValue::Float(v) => format!("{}", v),
    }
}

/// Escape measurement names and tag values (commas, spaces, equals)
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, ',' | ' ' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use telemetry_decoder::Measurement;

    fn frame() -> DecodedFrame {
        DecodedFrame {
            timestamp: 0x2000,
            identifier: 0x100,
            hex_identifier: "0x100".to_string(),
            declared_length: 8,
            measurements: vec![
                Measurement {
                    name: "soc".to_string(),
                    source: "battery".to_string(),
                    class: "BMS".to_string(),
                    value: MeasurementValue::Integer(100),
                },
                Measurement {
                    name: "pack_voltage".to_string(),
                    source: "battery".to_string(),
                    class: "BMS".to_string(),
                    value: MeasurementValue::Float(123.5),
                },
                Measurement {
                    name: "charging".to_string(),
                    source: "battery".to_string(),
                    class: "BMS".to_string(),
                    value: MeasurementValue::Boolean(true),
                },
            ],
        }
    }

    #[test]
    fn test_line_protocol_output() {
        let mut out = Vec::new();
        let received = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        LineProtocolSink::new(&mut out, "daybreak")
            .write_frame(&frame(), received)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "battery,car=daybreak,class=BMS soc=100i 1700000000000000000"
        );
        assert_eq!(
            lines[1],
            "battery,car=daybreak,class=BMS pack_voltage=123.5 1700000000000000000"
        );
        assert_eq!(
            lines[2],
            "battery,car=daybreak,class=BMS charging=true 1700000000000000000"
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape("pack voltage"), "pack\\ voltage");
        assert_eq!(escape("a,b=c"), "a\\,b\\=c");
        assert_eq!(escape("plain"), "plain");
    }
}
