//! Console: Coordinator that ties the two actors together.
//!
//! The Console is the entry point for applications. It owns the typing
//! flag, both workers, and (on a real terminal) raw mode, and shuts them
//! down in the right order.

use super::capture::{CaptureConfig, InputCapturer};
use super::messages::MessageKind;
use super::publisher::{OutputPublisher, Publisher, PublisherConfig};
use super::typing::TypingFlag;
use crate::error::Result;
use crate::terminal::{CrosstermTerminal, RawModeGuard, Stream, Terminal};
use std::sync::Arc;

/// Configuration for the Console.
#[derive(Debug, Clone, Default)]
pub struct ConsoleConfig {
    /// Render thread settings.
    pub publisher: PublisherConfig,
    /// Input thread settings.
    pub capture: CaptureConfig,
}

/// Animated output and line input sharing one terminal.
pub struct Console {
    typing: TypingFlag,
    output: OutputPublisher,
    input: InputCapturer,
    terminal: Arc<dyn Terminal>,
    /// Restores cooked mode when dropped; `None` for injected terminals.
    raw_mode: Option<RawModeGuard>,
}

impl Console {
    /// Create a console on the process terminal, switching it to raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn new(config: ConsoleConfig) -> Result<Self> {
        let raw_mode = RawModeGuard::enable()?;
        let terminal: Arc<dyn Terminal> = Arc::new(CrosstermTerminal::new());
        Ok(Self::build(terminal, config, Some(raw_mode)))
    }

    /// Create a console on any terminal device. Raw mode is left alone.
    pub fn with_terminal(terminal: Arc<dyn Terminal>, config: ConsoleConfig) -> Self {
        Self::build(terminal, config, None)
    }

    fn build(terminal: Arc<dyn Terminal>, config: ConsoleConfig, raw_mode: Option<RawModeGuard>) -> Self {
        let typing = TypingFlag::new();
        let output = OutputPublisher::new(Arc::clone(&terminal), typing.clone(), config.publisher);
        let input = InputCapturer::new(Arc::clone(&terminal), typing.clone(), config.capture);

        Self {
            typing,
            output,
            input,
            terminal,
            raw_mode,
        }
    }

    /// Start both threads. Calling it again is a no-op.
    pub fn start(&self) -> Result<()> {
        self.output.start()?;
        self.input.start()?;
        Ok(())
    }

    /// Get a handle for publishing from other threads.
    pub fn publisher(&self) -> Publisher {
        self.output.handle()
    }

    /// Queue a message for rendering.
    pub fn publish(&self, content: impl Into<String>, kind: MessageKind) {
        self.output.publish(content, kind);
    }

    /// Block until the user completes a line.
    ///
    /// Returns `None` once input has stopped (shutdown or Ctrl+C).
    pub fn read_line(&self) -> Option<String> {
        self.input.read_line()
    }

    /// The shared typing flag.
    pub const fn typing(&self) -> &TypingFlag {
        &self.typing
    }

    /// The render side.
    pub const fn output(&self) -> &OutputPublisher {
        &self.output
    }

    /// The input side.
    pub const fn input(&self) -> &InputCapturer {
        &self.input
    }

    /// Stop input, render everything still queued, join both threads, and
    /// restore the terminal.
    ///
    /// Input goes first so no new line is accepted while output drains.
    /// Returns the first worker error, if any.
    pub fn shutdown(&mut self) -> Result<()> {
        let input = self.input.shutdown();
        let output = self.output.shutdown();

        if let Some(raw_mode) = self.raw_mode.take() {
            // Leave the shell prompt on a clean line.
            let _ = self.terminal.write(Stream::Stdout, b"\n");
            drop(raw_mode);
        }
        input.and(output)
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
