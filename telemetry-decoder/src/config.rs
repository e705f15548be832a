//! Decoder configuration
//!
//! The decoder itself is stateless; configuration only shapes which frames
//! the stream iterator decodes and how unknown identifiers are handled.

use serde::{Deserialize, Serialize};

/// Configuration for stream decoding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Optional: only decode frames with these identifiers
    #[serde(default)]
    pub identifier_filter: Option<Vec<u16>>,

    /// Skip frames with no schema entry instead of reporting them
    ///
    /// Off by default: a missing schema entry usually means the schema
    /// document needs a new entry, and the caller wants to hear about it.
    #[serde(default)]
    pub skip_unknown: bool,

    /// Stop after decoding this many frames
    #[serde(default)]
    pub max_frames: Option<usize>,
}

impl DecoderConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the identifier filter
    pub fn with_identifier_filter(mut self, identifiers: Vec<u16>) -> Self {
        self.identifier_filter = Some(identifiers);
        self
    }

    /// Builder method: skip unknown identifiers silently
    pub fn with_skip_unknown(mut self, enabled: bool) -> Self {
        self.skip_unknown = enabled;
        self
    }

    /// Builder method: cap the number of decoded frames
    pub fn with_max_frames(mut self, count: usize) -> Self {
        self.max_frames = Some(count);
        self
    }

    /// Check if a frame identifier passes the filter
    pub fn should_process(&self, identifier: u16) -> bool {
        match &self.identifier_filter {
            Some(identifiers) => identifiers.contains(&identifier),
            None => true,
        }
    }
}
