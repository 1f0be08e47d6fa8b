//! `OutputBuffer`: Single-write output buffer for ANSI sequences.

use super::{Stream, Terminal};
use crate::actor::MessageKind;
use std::io;

/// Pre-allocated buffer for building one terminal write.
///
/// Output that must appear as a unit (a message header, an echo after a
/// typing transition) is accumulated here, then handed to the terminal in a
/// single `write()` so the other worker cannot land bytes in the middle.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a couple of lines.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Write a single character.
    #[inline]
    pub fn write_char(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.data.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    /// Start a new line.
    #[inline]
    pub fn newline(&mut self) {
        self.data.push(b'\n');
    }

    /// Select the color of a message kind.
    #[inline]
    pub fn set_kind_color(&mut self, kind: MessageKind) {
        self.write_str(kind.color_code());
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Erase `columns` cells to the left of the cursor.
    pub fn erase_back(&mut self, columns: usize) {
        for _ in 0..columns {
            self.data.extend_from_slice(b"\x08 \x08");
        }
    }

    /// Hand the contents to the terminal in one write, then clear.
    ///
    /// Does nothing when empty.
    pub fn flush_to(&mut self, terminal: &dyn Terminal, stream: Stream) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        let result = terminal.write(stream, &self.data);
        self.data.clear();
        result
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
