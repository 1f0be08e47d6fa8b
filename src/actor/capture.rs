//! Input Capturer: Dedicated thread for assembling typed lines.
//!
//! The input thread polls the terminal for keys and edits the current line.
//! While the render thread is typing a message out, keys are diverted into a
//! shadow buffer without echo and replayed once the render finishes, so the
//! user's typing never lands in the middle of an animation.

use super::messages::KeyCode;
use super::typing::TypingFlag;
use crate::error::{ConsoleError, Result};
use crate::terminal::{OutputBuffer, Stream, Terminal};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

/// Shortest keyboard wait; a zero interval would spin the input thread.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the input thread.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// How long one keyboard poll may wait; bounds how stale the typing flag
    /// can be and how long shutdown takes.
    pub poll_interval: Duration,
    /// Marker printed when a fresh prompt line starts.
    pub prompt: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5),
            prompt: String::from("> "),
        }
    }
}

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No render in progress: keys edit the line and are echoed.
    Idle,
    /// A render owns the terminal: keys go to the shadow buffer unechoed.
    Suspended,
}

/// What a key did to the line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    /// Keep editing.
    Continue,
    /// Enter completed a line.
    Line(String),
    /// The user asked to stop.
    Interrupt,
}

/// Line-editing state machine run by the input thread.
#[derive(Debug)]
pub(crate) struct LineEditor {
    state: CaptureState,
    /// Line being typed; only the input thread touches it.
    line: String,
    /// Keys typed while suspended.
    shadow: Arc<Mutex<String>>,
    prompt: String,
}

impl LineEditor {
    pub(crate) fn new(shadow: Arc<Mutex<String>>, prompt: String) -> Self {
        Self {
            state: CaptureState::Idle,
            line: String::new(),
            shadow,
            prompt,
        }
    }

    #[cfg(test)]
    pub(crate) const fn state(&self) -> CaptureState {
        self.state
    }

    fn shadow(&self) -> std::sync::MutexGuard<'_, String> {
        self.shadow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Follow the typing flag, echoing into `out` on suspended -> idle.
    pub(crate) fn observe_typing(&mut self, typing: bool, out: &mut OutputBuffer) {
        match (self.state, typing) {
            (CaptureState::Idle, true) => {
                self.state = CaptureState::Suspended;
            }
            (CaptureState::Suspended, false) => {
                self.state = CaptureState::Idle;
                {
                    let mut shadow = self.shadow.lock().unwrap_or_else(PoisonError::into_inner);
                    self.line.push_str(&shadow);
                    shadow.clear();
                }
                // The render scrolled the old prompt away; redraw the whole line.
                out.newline();
                out.write_str(&self.prompt);
                out.write_str(&self.line);
            }
            _ => {}
        }
    }

    /// Apply one key, echoing into `out` when idle.
    pub(crate) fn handle_key(&mut self, key: KeyCode, out: &mut OutputBuffer) -> KeyOutcome {
        match (self.state, key) {
            (_, KeyCode::Interrupt) => KeyOutcome::Interrupt,

            // Cannot complete a line while a render owns the terminal.
            (CaptureState::Suspended, KeyCode::Enter) => KeyOutcome::Continue,
            (CaptureState::Suspended, KeyCode::Backspace) => {
                let popped = self.shadow().pop();
                if popped.is_none() {
                    self.line.pop();
                }
                KeyOutcome::Continue
            }
            (CaptureState::Suspended, KeyCode::Char(c)) => {
                if !c.is_control() {
                    self.shadow().push(c);
                }
                KeyOutcome::Continue
            }

            (CaptureState::Idle, KeyCode::Enter) => {
                out.newline();
                KeyOutcome::Line(std::mem::take(&mut self.line))
            }
            (CaptureState::Idle, KeyCode::Backspace) => {
                if let Some(c) = self.line.pop() {
                    out.erase_back(c.width().unwrap_or(0));
                }
                KeyOutcome::Continue
            }
            (CaptureState::Idle, KeyCode::Char(c)) => {
                if !c.is_control() {
                    self.line.push(c);
                    out.write_char(c);
                }
                KeyOutcome::Continue
            }
        }
    }
}

/// Owner of the input thread and the queue of completed lines.
pub struct InputCapturer {
    terminal: Arc<dyn Terminal>,
    typing: TypingFlag,
    config: CaptureConfig,
    shadow: Arc<Mutex<String>>,
    /// Producer side of the line queue, moved into the input thread by `start`.
    line_sender: Mutex<Option<Sender<String>>>,
    lines: Receiver<String>,
    /// Handle to the input thread.
    handle: Mutex<Option<JoinHandle<io::Result<()>>>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputCapturer {
    /// Create a capturer reading keys from `terminal` and watching `typing`.
    pub fn new(terminal: Arc<dyn Terminal>, typing: TypingFlag, config: CaptureConfig) -> Self {
        let (sender, lines) = unbounded();

        Self {
            terminal,
            typing,
            config,
            shadow: Arc::new(Mutex::new(String::new())),
            line_sender: Mutex::new(Some(sender)),
            lines,
            handle: Mutex::new(None),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the input thread.
    ///
    /// Returns `Ok(true)` if this call launched it and `Ok(false)` if it was
    /// already started (or the capturer was shut down before starting).
    pub fn start(&self) -> Result<bool> {
        let mut sender = self
            .line_sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.take() else {
            return Ok(false);
        };

        let terminal = Arc::clone(&self.terminal);
        let typing = self.typing.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let poll_interval = self.config.poll_interval;
        let editor = LineEditor::new(Arc::clone(&self.shadow), self.config.prompt.clone());

        let handle = thread::Builder::new()
            .name("danheng-input".to_string())
            .spawn(move || {
                let result =
                    Self::run_loop(terminal.as_ref(), &typing, editor, &sender, &shutdown, poll_interval);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "input thread stopped on terminal error");
                }
                result
            })
            .map_err(|source| ConsoleError::Spawn {
                worker: "input",
                source,
            })?;

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        tracing::debug!("input thread started");
        Ok(true)
    }

    /// Block until a completed line is available and return it.
    ///
    /// Returns `None` once the input thread has stopped and every completed
    /// line has been read.
    pub fn read_line(&self) -> Option<String> {
        self.lines.recv().ok()
    }

    /// Like [`read_line`](Self::read_line), but gives up after `timeout`.
    pub fn read_line_timeout(&self, timeout: Duration) -> Option<String> {
        self.lines.recv_timeout(timeout).ok()
    }

    /// What the user has typed during the current render, if one is running.
    pub fn typing_shadow(&self) -> String {
        self.shadow
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Signal the input thread to stop and wait for it.
    ///
    /// Takes at most about one poll interval; no final keystroke is needed.
    pub fn shutdown(&self) -> Result<()> {
        self.shutdown.store(true, Ordering::Release);
        // Never started: release readers blocked in read_line.
        self.line_sender
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
                .map_err(|_| ConsoleError::WorkerPanicked("input"))??;
            tracing::debug!("input thread joined");
        }
        Ok(())
    }

    /// Main input polling loop.
    fn run_loop(
        terminal: &dyn Terminal,
        typing: &TypingFlag,
        mut editor: LineEditor,
        lines: &Sender<String>,
        shutdown: &AtomicBool,
        poll_interval: Duration,
    ) -> io::Result<()> {
        let mut out = OutputBuffer::new();
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            editor.observe_typing(typing.is_typing(), &mut out);
            out.flush_to(terminal, Stream::Stdout)?;

            // Waits at most one poll interval, then loops to re-check the flags.
            let Some(key) = terminal.poll_key(poll_interval)? else {
                continue;
            };

            // The flag may have flipped while we waited for the key.
            editor.observe_typing(typing.is_typing(), &mut out);
            let outcome = editor.handle_key(key, &mut out);
            out.flush_to(terminal, Stream::Stdout)?;

            match outcome {
                KeyOutcome::Continue => {}
                KeyOutcome::Line(line) => {
                    tracing::trace!(len = line.len(), "line completed");
                    if lines.send(line).is_err() {
                        break;
                    }
                }
                KeyOutcome::Interrupt => {
                    tracing::info!("input interrupted");
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Drop for InputCapturer {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
