//! Raw mode terminal wrapper for crossterm
//!
//! Ensures terminal is restored to normal mode on drop (even on panic).

use crossterm::terminal;
use std::io;

/// Guard that enables raw mode and restores normal mode on drop.
///
/// # Example
/// ```no_run
/// use danheng::terminal::RawModeGuard;
///
/// let _guard = RawModeGuard::enable()?;
/// // Terminal is now in raw mode
/// // ... do work ...
/// // Raw mode automatically disabled when guard is dropped
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct RawModeGuard;

impl RawModeGuard {
    /// Enable raw mode for the terminal.
    ///
    /// Raw mode disables line buffering and local echo, so the input worker
    /// sees every key as it is pressed and decides itself what to echo.
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        tracing::debug!("raw mode enabled");
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Best-effort restore - ignore errors during cleanup
        let _ = terminal::disable_raw_mode();
    }
}
