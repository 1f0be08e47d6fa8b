//! Message types for actor communication.
//!
//! These types define the protocol between callers, the render worker,
//! and the input worker.

/// Category of a console message.
///
/// Each kind maps to a fixed color and prefix, and decides whether the
/// content is typed out character by character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Operation completed.
    Success,
    /// Something failed. Rendered on stderr.
    Error,
    /// Something needs attention.
    Warning,
    /// Plain status report.
    Info,
    /// Uncolored, unprefixed text written in one go.
    Newline,
    /// Menu or command echo.
    Command,
}

impl MessageKind {
    /// ANSI SGR sequence that selects this kind's foreground color.
    ///
    /// `Newline` has no color.
    pub const fn color_code(self) -> &'static str {
        match self {
            Self::Success => "\x1b[32m",
            Self::Error => "\x1b[31m",
            Self::Warning => "\x1b[33m",
            Self::Info => "\x1b[36m",
            Self::Command => "\x1b[37m",
            Self::Newline => "",
        }
    }

    /// Textual prefix printed before the content, including the trailing space.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Success => "[SUCCESS] ",
            Self::Error => "[ERROR] ",
            Self::Warning => "[WARN] ",
            Self::Info => "[INFO] ",
            Self::Command => "[Command] ",
            Self::Newline => "",
        }
    }

    /// Whether the content is typed out with the animation delay.
    ///
    /// `Newline` is the only kind written atomically.
    pub const fn is_animated(self) -> bool {
        !matches!(self, Self::Newline)
    }

    /// Whether a color reset follows the content.
    pub const fn needs_reset(self) -> bool {
        !matches!(self, Self::Newline)
    }

    /// Whether this kind is written to the error stream.
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// One unit of text destined for the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Text to render.
    pub content: String,
    /// Category tag.
    pub kind: MessageKind,
}

impl Message {
    /// Create a new message.
    pub fn new(content: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }
}

/// Key codes the line editor understands.
///
/// This is a deliberately small subset of crossterm's `KeyCode`; every other
/// key is dropped before it reaches the input worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Ctrl+C or Ctrl+D.
    Interrupt,
}

/// Commands sent to the render thread.
#[derive(Debug)]
pub enum RenderCommand {
    /// Render one message.
    Render(Message),

    /// Shutdown the render thread once everything queued ahead is rendered.
    Shutdown,
}
