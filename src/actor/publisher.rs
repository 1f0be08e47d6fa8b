//! Output Publisher: Dedicated thread for rendering messages to the terminal.
//!
//! Any thread may publish; exactly one render thread dequeues messages in
//! FIFO order and writes them out with color, prefix and the typing
//! animation. The typing flag is raised for the whole of each render.

use super::messages::{Message, MessageKind, RenderCommand};
use super::typing::{TypingFlag, TypingGuard};
use crate::error::{ConsoleError, Result};
use crate::terminal::{OutputBuffer, Stream, Terminal};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Configuration for the render thread.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Pause inserted after every `animation_stride` visible graphemes.
    pub animation_delay: Duration,
    /// Number of visible graphemes between pauses.
    pub animation_stride: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            animation_delay: Duration::from_millis(6),
            animation_stride: 3,
        }
    }
}

/// Cloneable handle for publishing messages from any thread.
///
/// Publishing never blocks. Once the publisher has been shut down, further
/// messages are dropped silently.
#[derive(Debug, Clone)]
pub struct Publisher {
    sender: Sender<RenderCommand>,
    closed: Arc<AtomicBool>,
}

impl Publisher {
    /// Queue a message for rendering.
    pub fn publish(&self, content: impl Into<String>, kind: MessageKind) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        // Only fails once the render thread is gone, which is the closed case.
        let _ = self
            .sender
            .send(RenderCommand::Render(Message::new(content, kind)));
    }

    /// Publish a `Success` message.
    pub fn success(&self, content: impl Into<String>) {
        self.publish(content, MessageKind::Success);
    }

    /// Publish an `Error` message.
    pub fn error(&self, content: impl Into<String>) {
        self.publish(content, MessageKind::Error);
    }

    /// Publish a `Warning` message.
    pub fn warn(&self, content: impl Into<String>) {
        self.publish(content, MessageKind::Warning);
    }

    /// Publish an `Info` message.
    pub fn info(&self, content: impl Into<String>) {
        self.publish(content, MessageKind::Info);
    }

    /// Publish a `Command` message.
    pub fn command(&self, content: impl Into<String>) {
        self.publish(content, MessageKind::Command);
    }

    /// Publish a `Newline` message.
    pub fn newline(&self, content: impl Into<String>) {
        self.publish(content, MessageKind::Newline);
    }

    /// Whether the publisher has stopped accepting messages.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Owner of the output queue and the render thread.
pub struct OutputPublisher {
    /// Producer side, shared with every [`Publisher`] handle.
    publisher: Publisher,
    /// Consumer side, moved into the render thread by `start`.
    receiver: Mutex<Option<Receiver<RenderCommand>>>,
    /// Handle to the render thread.
    handle: Mutex<Option<JoinHandle<io::Result<()>>>>,
    terminal: Arc<dyn Terminal>,
    typing: TypingFlag,
    config: PublisherConfig,
    /// Messages fully rendered so far.
    rendered: Arc<AtomicU64>,
}

/// Render-thread state.
struct Renderer<'a> {
    terminal: &'a dyn Terminal,
    typing: &'a TypingFlag,
    config: &'a PublisherConfig,
    /// Reused for the header and trailer of each message.
    output: OutputBuffer,
}

impl<'a> Renderer<'a> {
    fn new(terminal: &'a dyn Terminal, typing: &'a TypingFlag, config: &'a PublisherConfig) -> Self {
        Self {
            terminal,
            typing,
            config,
            output: OutputBuffer::new(),
        }
    }

    /// Render one message from leading blank line to color reset.
    fn render(&mut self, message: &Message) -> io::Result<()> {
        let _typing = TypingGuard::raise(self.typing);
        let kind = message.kind;
        let stream = if kind.is_error() {
            Stream::Stderr
        } else {
            Stream::Stdout
        };

        self.output.newline();
        self.output.set_kind_color(kind);
        self.output.write_str(kind.prefix());

        if kind.is_animated() {
            self.output.flush_to(self.terminal, stream)?;
            self.type_write(&message.content, stream)?;
        } else {
            self.output.write_str(&message.content);
        }

        if kind.needs_reset() {
            self.output.reset_attrs();
        }
        self.output.flush_to(self.terminal, stream)
    }

    /// Type the content out one grapheme at a time.
    fn type_write(&self, content: &str, stream: Stream) -> io::Result<()> {
        let delay = self.config.animation_delay;

        for stroke in strokes(content, self.config.animation_stride) {
            self.terminal.discard_typeahead()?;
            self.terminal.write(stream, stroke.grapheme.as_bytes())?;

            if stroke.pause && !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        Ok(())
    }
}

/// One step of the typing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stroke<'s> {
    grapheme: &'s str,
    /// Sleep after writing this grapheme.
    pause: bool,
}

/// Split `content` into graphemes, marking every `stride`-th visible one.
///
/// Line breaks are written but not counted.
fn strokes(content: &str, stride: usize) -> impl Iterator<Item = Stroke<'_>> {
    let stride = stride.max(1);
    let mut visible = 0usize;

    content.graphemes(true).map(move |grapheme| {
        let pause = if matches!(grapheme, "\n" | "\r" | "\r\n") {
            false
        } else {
            visible += 1;
            visible % stride == 0
        };
        Stroke { grapheme, pause }
    })
}

impl OutputPublisher {
    /// Create a publisher writing to `terminal` and raising `typing` while it renders.
    ///
    /// Nothing is rendered until [`start`](Self::start) is called, but
    /// messages may be published right away.
    pub fn new(terminal: Arc<dyn Terminal>, typing: TypingFlag, config: PublisherConfig) -> Self {
        let (sender, receiver) = unbounded();

        Self {
            publisher: Publisher {
                sender,
                closed: Arc::new(AtomicBool::new(false)),
            },
            receiver: Mutex::new(Some(receiver)),
            handle: Mutex::new(None),
            terminal,
            typing,
            config,
            rendered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a handle for publishing from other threads.
    pub fn handle(&self) -> Publisher {
        self.publisher.clone()
    }

    /// Queue a message for rendering.
    pub fn publish(&self, content: impl Into<String>, kind: MessageKind) {
        self.publisher.publish(content, kind);
    }

    /// Number of messages rendered so far.
    pub fn rendered_count(&self) -> u64 {
        self.rendered.load(Ordering::Acquire)
    }

    /// Spawn the render thread.
    ///
    /// Returns `Ok(true)` if this call launched it and `Ok(false)` if it was
    /// already started (or the publisher was shut down before starting).
    pub fn start(&self) -> Result<bool> {
        let mut receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(receiver) = receiver.take() else {
            return Ok(false);
        };

        let terminal = Arc::clone(&self.terminal);
        let typing = self.typing.clone();
        let config = self.config.clone();
        let closed = Arc::clone(&self.publisher.closed);
        let rendered = Arc::clone(&self.rendered);

        let handle = thread::Builder::new()
            .name("danheng-render".to_string())
            .spawn(move || {
                let result = Self::run_loop(&receiver, terminal.as_ref(), &typing, &config, &rendered);
                closed.store(true, Ordering::Release);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "render thread stopped on terminal error");
                }
                result
            })
            .map_err(|source| ConsoleError::Spawn {
                worker: "render",
                source,
            })?;

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        tracing::debug!("render thread started");
        Ok(true)
    }

    /// Stop accepting messages, render everything already queued, and join
    /// the render thread.
    ///
    /// Returns the terminal error that stopped the thread early, if any.
    pub fn shutdown(&self) -> Result<()> {
        if !self.publisher.closed.swap(true, Ordering::AcqRel) {
            // Everything queued before this marker still gets rendered.
            let _ = self.publisher.sender.send(RenderCommand::Shutdown);
        }
        // Never started: queued messages are dropped with the receiver.
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle
                .join()
                .map_err(|_| ConsoleError::WorkerPanicked("render"))??;
            tracing::debug!(rendered = self.rendered_count(), "render thread joined");
        }
        Ok(())
    }

    /// Main render loop.
    fn run_loop(
        receiver: &Receiver<RenderCommand>,
        terminal: &dyn Terminal,
        typing: &TypingFlag,
        config: &PublisherConfig,
        rendered: &AtomicU64,
    ) -> io::Result<()> {
        let mut renderer = Renderer::new(terminal, typing, config);

        // Blocks while the queue is empty
        while let Ok(command) = receiver.recv() {
            match command {
                RenderCommand::Render(message) => {
                    renderer.render(&message)?;
                    rendered.fetch_add(1, Ordering::AcqRel);
                }
                RenderCommand::Shutdown => break,
            }
        }
        Ok(())
    }
}

impl Drop for OutputPublisher {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
