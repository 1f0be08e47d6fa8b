//! In-memory terminal for tests.

use super::{Stream, Terminal};
use crate::actor::KeyCode;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Records every write and serves scripted keys.
#[derive(Debug, Default)]
pub struct MemoryTerminal {
    writes: Mutex<Vec<(Stream, Vec<u8>)>>,
    keys: Mutex<VecDeque<KeyCode>>,
    discards: AtomicUsize,
    polls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue keys for the input worker.
    pub fn push_keys(&self, keys: impl IntoIterator<Item = KeyCode>) {
        self.keys.lock().unwrap().extend(keys);
    }

    /// Queue every character of `text` as a key, mapping `\r` to Enter and
    /// `\x08` to Backspace.
    pub fn type_str(&self, text: &str) {
        self.push_keys(text.chars().map(|c| match c {
            '\r' => KeyCode::Enter,
            '\x08' => KeyCode::Backspace,
            c => KeyCode::Char(c),
        }));
    }

    /// Whether every scripted key has been consumed.
    pub fn keys_drained(&self) -> bool {
        self.keys.lock().unwrap().is_empty()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn discard_count(&self) -> usize {
        self.discards.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn text_of(&self, stream: Stream) -> String {
        let writes = self.writes.lock().unwrap();
        let bytes: Vec<u8> = writes
            .iter()
            .filter(|(s, _)| *s == stream)
            .flat_map(|(_, b)| b.iter().copied())
            .collect();
        String::from_utf8(bytes).unwrap()
    }

    pub fn stdout_text(&self) -> String {
        self.text_of(Stream::Stdout)
    }

    pub fn stderr_text(&self) -> String {
        self.text_of(Stream::Stderr)
    }

    /// Everything written, in write order, regardless of stream.
    pub fn all_text(&self) -> String {
        let writes = self.writes.lock().unwrap();
        let bytes: Vec<u8> = writes.iter().flat_map(|(_, b)| b.iter().copied()).collect();
        String::from_utf8(bytes).unwrap()
    }

    /// What a 24x80 VT100 would show after all stdout writes.
    pub fn screen(&self) -> String {
        let text = self.stdout_text().replace('\n', "\r\n");
        let mut parser = vt100::Parser::new(24, 80, 0);
        parser.process(text.as_bytes());
        parser.screen().contents()
    }

    /// Poll `condition` until it holds or `timeout` passes.
    pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        condition()
    }
}

impl Terminal for MemoryTerminal {
    fn write(&self, stream: Stream, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"));
        }
        self.writes.lock().unwrap().push((stream, bytes.to_vec()));
        Ok(())
    }

    fn poll_key(&self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if let Some(key) = self.keys.lock().unwrap().pop_front() {
            return Ok(Some(key));
        }
        thread::sleep(timeout);
        Ok(None)
    }

    fn discard_typeahead(&self) -> io::Result<()> {
        self.discards.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
