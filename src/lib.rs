//! # Danheng Console
//!
//! An interactive admin console for a remote game server.
//!
//! The heart of the crate is a small terminal concurrency engine: messages
//! published from any thread are typed out with color and animation by one
//! render thread, while an input thread assembles the line the user is
//! typing, without the two streams corrupting each other.
//!
//! ## Core Concepts
//!
//! - **Ordered output**: one render thread, FIFO queue, no interleaving
//! - **Typing flag**: raised for each render; the only link between threads
//! - **Shadow buffering**: keys typed during a render are held back unechoed
//!   and replayed into the line when the render ends
//! - **Graceful teardown**: every thread is joined on shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use danheng::{Console, ConsoleConfig, MessageKind};
//!
//! let mut console = Console::new(ConsoleConfig::default())?;
//! console.start()?;
//!
//! console.publish("connected", MessageKind::Success);
//! if let Some(line) = console.read_line() {
//!     console.publish(format!("you typed {line}"), MessageKind::Info);
//! }
//! console.shutdown()?;
//! # Ok::<(), danheng::ConsoleError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod command;
pub mod config;
pub mod error;
pub mod menu;
pub mod snapshot;
pub mod terminal;

// Re-exports for convenience
pub use actor::{Console, ConsoleConfig, InputCapturer, KeyCode, Message, MessageKind, OutputPublisher, Publisher};
pub use command::{CommandResponse, CommandSubmitter, OfflineSubmitter, Relic, RelicKind};
pub use config::AppConfig;
pub use error::{ConfigError, ConsoleError, SubmitError};
pub use snapshot::{SnapshotConfig, SnapshotWorker};
pub use terminal::{CrosstermTerminal, Terminal};
