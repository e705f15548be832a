//! Payload bit sequence and bit-field extraction
//!
//! The wire payload is a fixed 8 bytes. Schema field specs address it as a
//! 64-bit sequence where bit 0 is the MSB of payload byte 0 and bits run in
//! wire order, MSB first within each byte. Extraction packs the selected
//! bits MSB-first into a `BitField` for the value decoders.

use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload size fixed by the wire format
pub const PAYLOAD_BYTES: usize = 8;

/// Payload width in bits
pub const PAYLOAD_BITS: usize = PAYLOAD_BYTES * 8;

/// Bit bounds of a schema field: a single bit index or an inclusive range
///
/// Serialized as a 1- or 2-element array, matching the schema document
/// (`bits = [3]` or `bits = [0, 7]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub enum BitRange {
    /// A single bit
    Single(usize),
    /// An inclusive [low, high] span
    Span(usize, usize),
}

impl BitRange {
    /// Lowest bit index addressed by this range
    pub fn low(&self) -> usize {
        match self {
            BitRange::Single(i) => *i,
            BitRange::Span(low, _) => *low,
        }
    }

    /// Highest bit index addressed by this range
    pub fn high(&self) -> usize {
        match self {
            BitRange::Single(i) => *i,
            BitRange::Span(_, high) => *high,
        }
    }

    /// Number of bits selected (both bounds inclusive)
    pub fn width(&self) -> usize {
        self.high() - self.low() + 1
    }
}

impl TryFrom<Vec<usize>> for BitRange {
    type Error = String;

    fn try_from(bounds: Vec<usize>) -> std::result::Result<Self, Self::Error> {
        match bounds.as_slice() {
            [index] => Ok(BitRange::Single(*index)),
            [low, high] => Ok(BitRange::Span(*low, *high)),
            _ => Err(format!(
                "`bits` must have 1 or 2 elements, got {}",
                bounds.len()
            )),
        }
    }
}

impl From<BitRange> for Vec<usize> {
    fn from(range: BitRange) -> Self {
        match range {
            BitRange::Single(i) => vec![i],
            BitRange::Span(low, high) => vec![low, high],
        }
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitRange::Single(i) => write!(f, "[{}]", i),
            BitRange::Span(low, high) => write!(f, "[{}, {}]", low, high),
        }
    }
}

/// A contiguous bit slice extracted from the payload
///
/// Bits are packed MSB-first into `raw`: the bit at the range's low index
/// ends up as the most significant bit of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    raw: u64,
    width: u8,
}

impl BitField {
    /// Raw unsigned interpretation of the slice
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// Slice width in bits (1..=64)
    pub fn width(&self) -> u8 {
        self.width
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64, width: u8) -> Self {
        Self { raw, width }
    }
}

/// The fixed-width payload bit sequence of one telemetry frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadBits {
    bytes: [u8; PAYLOAD_BYTES],
}

impl PayloadBits {
    /// Wrap the payload bytes in wire order
    pub fn new(bytes: [u8; PAYLOAD_BYTES]) -> Self {
        Self { bytes }
    }

    /// Payload bytes in wire order
    pub fn bytes(&self) -> &[u8; PAYLOAD_BYTES] {
        &self.bytes
    }

    /// Total bit length of the sequence
    pub fn bit_len(&self) -> usize {
        PAYLOAD_BITS
    }

    /// Read a single bit; index 0 is the MSB of payload byte 0
    pub fn bit(&self, index: usize) -> Result<bool> {
        if index >= PAYLOAD_BITS {
            return Err(DecoderError::BitRange {
                low: index,
                high: index,
                bit_len: PAYLOAD_BITS,
            });
        }
        let byte = self.bytes[index / 8];
        let bit_in_byte = 7 - (index % 8); // Bit 0 = MSB
        Ok((byte >> bit_in_byte) & 0x01 != 0)
    }

    /// Extract the bit slice addressed by a schema field spec
    pub fn slice(&self, range: &BitRange) -> Result<BitField> {
        let (low, high) = (range.low(), range.high());
        if low > high || high >= PAYLOAD_BITS {
            return Err(DecoderError::BitRange {
                low,
                high,
                bit_len: PAYLOAD_BITS,
            });
        }

        let mut raw: u64 = 0;
        for index in low..=high {
            let byte = self.bytes[index / 8];
            let bit_in_byte = 7 - (index % 8);
            let bit = (byte >> bit_in_byte) & 0x01;
            raw = (raw << 1) | bit as u64;
        }

        Ok(BitField {
            raw,
            width: (high - low + 1) as u8,
        })
    }
}

impl fmt::Display for PayloadBits {
    /// Renders the full bit sequence, MSB first per byte, in wire order
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:08b}", byte)?;
        }
        Ok(())
    }
}
