//! Actor Model: the terminal concurrency engine.
//!
//! Two long-lived threads share one terminal:
//! - **Render Actor**: dequeues published messages and types them out
//! - **Input Actor**: polls keys and assembles lines for `read_line`
//!
//! The only thing they share is the typing flag, raised by the render actor
//! for the duration of each message.
//!
//! # Architecture
//!
//! ```text
//!  any thread ── publish ──▶ ┌───────────────┐
//!                            │ Render Thread │ ── bytes ──▶ terminal
//!                            └───────┬───────┘
//!                                    │ typing flag
//!                                    ▼
//!  terminal ──── keys ─────▶ ┌───────────────┐
//!                            │ Input Thread  │ ── lines ──▶ read_line
//!                            └───────────────┘
//! ```

mod capture;
mod console;
mod messages;
mod publisher;
mod typing;

pub use capture::{CaptureConfig, CaptureState, InputCapturer};
pub use console::{Console, ConsoleConfig};
pub use messages::{KeyCode, Message, MessageKind, RenderCommand};
pub use publisher::{OutputPublisher, Publisher, PublisherConfig};
pub use typing::TypingFlag;
