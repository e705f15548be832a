//! Wire frame parsing
//!
//! The bus bridge emits fixed-width ASCII-hex records, one frame per line:
//! 8 hex chars of timestamp, 4 of identifier, 16 of payload (8 bytes),
//! 1 declared-length nibble, and the line terminator. The terminator is
//! counted in the expected length but never inspected.

use crate::bitfield::{PayloadBits, PAYLOAD_BYTES};
use crate::types::{DecoderError, Result};
use std::fmt;

/// Expected wire record length in bytes, terminator included
pub const FRAME_LEN: usize = 30;

const TIMESTAMP_RANGE: std::ops::Range<usize> = 0..8;
const IDENTIFIER_RANGE: std::ops::Range<usize> = 8..12;
const PAYLOAD_RANGE: std::ops::Range<usize> = 12..28;
const DECLARED_LEN_RANGE: std::ops::Range<usize> = 28..29;

/// One telemetry frame, decomposed from its wire record
///
/// Pure data: parsing performs no IO and holds no state between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Bus-relative timestamp
    pub timestamp: u32,
    /// Frame identifier
    pub identifier: u16,
    /// Canonical hex form of the identifier, used as the schema key
    pub hex_identifier: String,
    /// Declared data length nibble; carried through, never used to truncate
    pub declared_length: u8,
    /// Payload bit sequence, fixed at 8 bytes by the wire format
    pub payload: PayloadBits,
}

impl TelemetryFrame {
    /// Parse a raw wire record
    ///
    /// The record must be exactly [`FRAME_LEN`] bytes. Any other length
    /// fails before any field is parsed.
    pub fn parse(raw: &[u8]) -> Result<TelemetryFrame> {
        if raw.len() != FRAME_LEN {
            return Err(DecoderError::FrameFormat {
                expected: FRAME_LEN,
                actual: raw.len(),
            });
        }

        let timestamp = parse_hex_field(&raw[TIMESTAMP_RANGE], "timestamp")? as u32;
        let identifier = parse_hex_field(&raw[IDENTIFIER_RANGE], "identifier")? as u16;
        let declared_length = parse_hex_field(&raw[DECLARED_LEN_RANGE], "declared_length")? as u8;

        let mut bytes = [0u8; PAYLOAD_BYTES];
        let payload_hex = &raw[PAYLOAD_RANGE];
        for (i, pair) in payload_hex.chunks_exact(2).enumerate() {
            bytes[i] = parse_hex_field(pair, "payload")? as u8;
        }

        Ok(TelemetryFrame {
            timestamp,
            identifier,
            hex_identifier: format!("{:#x}", identifier),
            declared_length,
            payload: PayloadBits::new(bytes),
        })
    }
}

fn parse_hex_field(digits: &[u8], field: &'static str) -> Result<u64> {
    let text = std::str::from_utf8(digits)
        .map_err(|_| DecoderError::FrameEncoding { field })?;
    u64::from_str_radix(text, 16).map_err(|_| DecoderError::FrameEncoding { field })
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} t={} len={} data={}",
            self.hex_identifier, self.timestamp, self.declared_length, self.payload
        )
    }
}
