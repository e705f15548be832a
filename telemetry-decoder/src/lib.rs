//! Telemetry Link Decoder Library
//!
//! A stateless, reusable library for decoding fixed-length ASCII-hex
//! telemetry frames from a vehicle bus into named, typed physical
//! measurements, guided by a per-identifier schema document.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Validates and decomposes raw wire records into frames
//! - Extracts schema-addressed bit fields from the frame payload
//! - Reconstructs typed values (bool, unsigned, two's-complement signed,
//!   fixed-point incremental)
//! - Assembles ordered measurement sets with provenance attached
//!
//! The library does NOT:
//! - Own the transport (any `BufRead` over newline-delimited records works)
//! - Buffer or aggregate measurements across frames
//! - Write measurements anywhere
//!
//! All higher-level functionality is in the application layer
//! (telemetry-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use telemetry_decoder::{Decoder, DecoderConfig};
//! use std::io::BufReader;
//! use std::path::Path;
//!
//! // Create decoder and load the schema document
//! let mut decoder = Decoder::new();
//! decoder.add_schema_file(Path::new("bus.json")).unwrap();
//!
//! // Decode a captured frame stream
//! let capture = std::fs::File::open("frames.log").unwrap();
//! let config = DecoderConfig::new().with_skip_unknown(true);
//!
//! for result in decoder.decode_stream(BufReader::new(capture), config) {
//!     match result {
//!         Ok(frame) => {
//!             for m in &frame.measurements {
//!                 println!("{}/{}: {} = {}", m.source, m.class, m.name, m.value);
//!             }
//!         }
//!         Err(e) => eprintln!("Dropped frame: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod bitfield;
pub mod config;
pub mod decoder;
pub mod frame;
pub mod measurement_decoder;
pub mod schema;
pub mod stream;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use bitfield::{BitField, BitRange, PayloadBits};
pub use config::DecoderConfig;
pub use decoder::{Decoder, DecodingIterator};
pub use frame::{TelemetryFrame, FRAME_LEN};
pub use measurement_decoder::MeasurementDecoder;
pub use schema::{FieldSpec, MeasurementSchema, SchemaSet, SchemaStats};
pub use stream::FrameStream;
pub use types::{DecodedFrame, DecoderError, Measurement, MeasurementValue, Result};
pub use value::ValueType;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create a decoder
        let decoder = Decoder::new();
        let stats = decoder.schema_stats();
        assert_eq!(stats.num_schemas, 0);
    }
}
