//! Terminal device abstraction.
//!
//! Both workers talk to the terminal only through [`Terminal`]. The real
//! backend is [`CrosstermTerminal`]; tests substitute an in-memory device.

mod backend;
mod output;
mod raw_mode;

#[cfg(test)]
pub(crate) mod memory;

pub use backend::CrosstermTerminal;
pub use output::OutputBuffer;
pub use raw_mode::RawModeGuard;

use crate::actor::KeyCode;
use std::io;
use std::time::Duration;

/// Destination stream for terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// A character terminal shared by the render and input workers.
pub trait Terminal: Send + Sync {
    /// Write bytes to a stream and flush them.
    fn write(&self, stream: Stream, bytes: &[u8]) -> io::Result<()>;

    /// Wait up to `timeout` for one key press.
    ///
    /// Returns `Ok(None)` when nothing arrived in time or the event was not a
    /// key the line editor understands.
    fn poll_key(&self, timeout: Duration) -> io::Result<Option<KeyCode>>;

    /// Drop any input that arrived outside the key stream.
    ///
    /// Called by the render worker before each animated character. Key
    /// presses must survive this call.
    fn discard_typeahead(&self) -> io::Result<()>;
}
