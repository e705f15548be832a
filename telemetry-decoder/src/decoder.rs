//! Main decoder API
//!
//! The `Decoder` struct is the entry point: load schema documents once,
//! then decode single records or a whole frame stream against the
//! read-only schema table.

use crate::config::DecoderConfig;
use crate::frame::TelemetryFrame;
use crate::measurement_decoder::MeasurementDecoder;
use crate::schema::{SchemaSet, SchemaStats};
use crate::stream::FrameStream;
use crate::types::{DecodedFrame, DecoderError, Result};
use std::io::BufRead;
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    /// Schema table (loaded from schema documents)
    schemas: SchemaSet,
}

impl Decoder {
    /// Create a decoder with an empty schema table
    pub fn new() -> Self {
        Self {
            schemas: SchemaSet::new(),
        }
    }

    /// Create a decoder around an already-built schema table
    pub fn with_schemas(schemas: SchemaSet) -> Self {
        Self { schemas }
    }

    /// Load a schema document and add its entries to the schema table
    ///
    /// # Example
    /// ```no_run
    /// use telemetry_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let mut decoder = Decoder::new();
    /// decoder.add_schema_file(Path::new("bus.json")).unwrap();
    /// ```
    pub fn add_schema_file(&mut self, path: &Path) -> Result<()> {
        let entries = crate::schema::load_schema_file(path)?;

        for (identifier, schema) in entries {
            self.schemas.add_schema(&identifier, schema);
        }

        log::info!("Schema document loaded successfully: {:?}", path);
        Ok(())
    }

    /// The loaded schema table
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Statistics about the loaded schema table
    pub fn schema_stats(&self) -> SchemaStats {
        self.schemas.stats()
    }

    /// Decode one raw wire record in a single shot
    ///
    /// Parses the record and assembles its measurements. Pure: no state is
    /// carried between calls, so any error leaves the decoder untouched.
    pub fn decode_record(&self, raw: &[u8]) -> Result<DecodedFrame> {
        let frame = TelemetryFrame::parse(raw)?;
        MeasurementDecoder::decode_frame(&frame, &self.schemas)
    }

    /// Decode a stream of newline-delimited wire records
    ///
    /// Returns an iterator of decode results. Every yielded error is
    /// recoverable: the iterator continues with the next record, so one
    /// malformed or unknown frame never blocks the frames behind it.
    pub fn decode_stream<R: BufRead>(
        &self,
        reader: R,
        config: DecoderConfig,
    ) -> DecodingIterator<'_, R> {
        DecodingIterator {
            frames: FrameStream::new(reader),
            schemas: &self.schemas,
            config,
            decoded: 0,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that decodes a frame stream into measurement sets
pub struct DecodingIterator<'a, R: BufRead> {
    frames: FrameStream<R>,
    schemas: &'a SchemaSet,
    config: DecoderConfig,
    decoded: usize,
}

impl<'a, R: BufRead> Iterator for DecodingIterator<'a, R> {
    type Item = Result<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(max) = self.config.max_frames {
            if self.decoded >= max {
                return None;
            }
        }

        loop {
            let frame = match self.frames.next()? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e)),
            };

            if !self.config.should_process(frame.identifier) {
                log::trace!("Filtered out frame {}", frame.hex_identifier);
                continue;
            }

            match MeasurementDecoder::decode_frame(&frame, self.schemas) {
                Ok(decoded) => {
                    self.decoded += 1;
                    return Some(Ok(decoded));
                }
                Err(DecoderError::SchemaNotFound { identifier }) if self.config.skip_unknown => {
                    log::debug!("No schema entry for {}, skipping frame", identifier);
                    continue;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
