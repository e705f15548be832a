//! Frame stream reader
//!
//! Iterates raw wire records from a line-oriented transport (serial
//! capture, file, stdin) and parses each into a `TelemetryFrame`. Records
//! are read with their terminator attached, since the wire length counts
//! it. A malformed record yields an error and the stream keeps going; one
//! bad frame never ends the read loop.

use crate::frame::TelemetryFrame;
use crate::types::Result;
use std::io::BufRead;

/// Iterator over telemetry frames from a buffered reader
pub struct FrameStream<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> FrameStream<R> {
    /// Wrap a line-oriented transport
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(crate::frame::FRAME_LEN),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for FrameStream<R> {
    type Item = Result<TelemetryFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    // transport failure ends the stream after reporting it
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }

            // normalize CRLF so the record length matches the wire format
            if self.buf.ends_with(b"\r\n") {
                let len = self.buf.len();
                self.buf.truncate(len - 2);
                self.buf.push(b'\n');
            }

            if self.buf == b"\n" {
                continue;
            }

            return Some(TelemetryFrame::parse(&self.buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecoderError;
    use std::io::Cursor;

    fn record(identifier: u16, first_byte: u8) -> String {
        format!(
            "{:08X}{:04X}{:02X}00000000000000{:01X}\n",
            0x2000u32, identifier, first_byte, 8
        )
    }

    #[test]
    fn test_stream_yields_frames_in_order() {
        let input = format!("{}{}", record(0x100, 0x64), record(0x200, 0x01));
        let frames: Vec<_> = FrameStream::new(Cursor::new(input)).collect();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref().unwrap().hex_identifier, "0x100");
        assert_eq!(frames[1].as_ref().unwrap().hex_identifier, "0x200");
    }

    #[test]
    fn test_bad_record_does_not_end_stream() {
        let input = format!("{}short\n{}", record(0x100, 0x64), record(0x200, 0x01));
        let frames: Vec<_> = FrameStream::new(Cursor::new(input)).collect();

        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_ok());
        assert!(matches!(
            frames[1],
            Err(DecoderError::FrameFormat { actual: 6, .. })
        ));
        assert!(frames[2].is_ok());
    }

    #[test]
    fn test_crlf_records_accepted() {
        let mut input = record(0x100, 0x64);
        input.pop();
        input.push_str("\r\n");
        let frames: Vec<_> = FrameStream::new(Cursor::new(input)).collect();

        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_ok());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let input = format!("\n{}\n", record(0x100, 0x64));
        let frames: Vec<_> = FrameStream::new(Cursor::new(input)).collect();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_unterminated_final_record_is_short() {
        let mut input = record(0x100, 0x64);
        input.pop(); // 29 bytes, no terminator
        let frames: Vec<_> = FrameStream::new(Cursor::new(input)).collect();

        assert_eq!(frames.len(), 1);
        assert!(matches!(
            frames[0],
            Err(DecoderError::FrameFormat {
                expected: 30,
                actual: 29,
            })
        ));
    }
}
