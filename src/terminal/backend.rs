//! Crossterm-backed terminal.

use super::{Stream, Terminal};
use crate::actor::KeyCode;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Where terminal events come from.
trait EventSource: Send + Sync {
    /// Whether an event is ready within `timeout`.
    fn poll(&self, timeout: Duration) -> io::Result<bool>;

    /// Take the next event; only called after `poll` returned `true`.
    fn read(&self) -> io::Result<Event>;
}

/// Crossterm's global event queue.
#[derive(Debug, Default)]
struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn poll(&self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read(&self) -> io::Result<Event> {
        event::read()
    }
}

/// Turns raw events into line-editor keys for two readers.
///
/// The input worker reads through [`poll_key`](Self::poll_key); the render
/// worker empties the event queue through [`drain`](Self::drain). Key
/// presses found by a drain are parked and served to `poll_key` first, in
/// arrival order.
#[derive(Debug)]
struct KeyReader<E> {
    events: E,
    /// Keys drained by the render worker, oldest first.
    pending: Mutex<VecDeque<KeyCode>>,
}

impl<E: EventSource> KeyReader<E> {
    const fn new(events: E) -> Self {
        Self {
            events,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    fn poll_key(&self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        // Held across the poll so a concurrent drain cannot reorder keys.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = pending.pop_front() {
            return Ok(Some(key));
        }

        if !self.events.poll(timeout)? {
            return Ok(None);
        }
        Ok(CrosstermTerminal::convert_event(self.events.read()?))
    }

    fn drain(&self) -> io::Result<()> {
        // The input worker is reading right now; it already filters events.
        let Ok(mut pending) = self.pending.try_lock() else {
            return Ok(());
        };

        while self.events.poll(Duration::ZERO)? {
            if let Some(key) = CrosstermTerminal::convert_event(self.events.read()?) {
                pending.push_back(key);
            }
        }
        Ok(())
    }
}

/// The process's real terminal, read through crossterm's event queue.
///
/// Key presses picked up by [`Terminal::discard_typeahead`] are parked in a
/// FIFO that [`Terminal::poll_key`] serves before reading new events, so the
/// render worker's drain never steals a keystroke from the input worker.
#[derive(Debug)]
pub struct CrosstermTerminal {
    keys: KeyReader<CrosstermEvents>,
    /// Translate `\n` to `\r\n` on write (needed in raw mode).
    crlf: bool,
}

impl CrosstermTerminal {
    /// Create a terminal for use in raw mode.
    pub fn new() -> Self {
        Self::with_crlf(true)
    }

    /// Create a terminal, choosing whether line feeds become CRLF.
    pub const fn with_crlf(crlf: bool) -> Self {
        Self {
            keys: KeyReader::new(CrosstermEvents),
            crlf,
        }
    }

    /// Convert a crossterm event to a line-editor key.
    fn convert_event(event: Event) -> Option<KeyCode> {
        match event {
            Event::Key(key_event) => Self::convert_key(key_event),
            // Mouse, resize, focus and paste are not line input
            _ => None,
        }
    }

    fn convert_key(key: KeyEvent) -> Option<KeyCode> {
        // Only process key press events (not release or repeat)
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            event::KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyCode::Interrupt)
            }
            event::KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
            event::KeyCode::Char(c) => Some(KeyCode::Char(c)),
            event::KeyCode::Enter => Some(KeyCode::Enter),
            event::KeyCode::Backspace => Some(KeyCode::Backspace),
            _ => None,
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert `\r` before every `\n` that lacks one.
fn to_crlf(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 8);
    let mut prev = 0u8;
    for &b in bytes {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}

impl Terminal for CrosstermTerminal {
    fn write(&self, stream: Stream, bytes: &[u8]) -> io::Result<()> {
        let translated;
        let bytes = if self.crlf && bytes.contains(&b'\n') {
            translated = to_crlf(bytes);
            translated.as_slice()
        } else {
            bytes
        };

        match stream {
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            Stream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(bytes)?;
                err.flush()
            }
        }
    }

    fn poll_key(&self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        self.keys.poll_key(timeout)
    }

    fn discard_typeahead(&self) -> io::Result<()> {
        self.keys.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    fn press(code: event::KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_crlf_translation() {
        assert_eq!(to_crlf(b"a\nb"), b"a\r\nb");
        assert_eq!(to_crlf(b"a\r\nb"), b"a\r\nb");
        assert_eq!(to_crlf(b"\n\n"), b"\r\n\r\n");
    }

    #[test]
    fn test_key_conversion() {
        let none = KeyModifiers::NONE;
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Char('x'), none)),
            Some(KeyCode::Char('x'))
        );
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(KeyCode::Char('X'))
        );
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Enter, none)),
            Some(KeyCode::Enter)
        );
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Backspace, none)),
            Some(KeyCode::Backspace)
        );
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyCode::Interrupt)
        );
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Char('a'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(
            CrosstermTerminal::convert_event(press(event::KeyCode::Left, none)),
            None
        );
    }

    #[test]
    fn test_out_of_band_events_dropped() {
        let release = Event::Key(KeyEvent {
            code: event::KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(CrosstermTerminal::convert_event(release), None);
        assert_eq!(CrosstermTerminal::convert_event(Event::Resize(80, 24)), None);
        assert_eq!(
            CrosstermTerminal::convert_event(Event::Paste("text".to_string())),
            None
        );
        let mouse = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(CrosstermTerminal::convert_event(mouse), None);
    }

    /// Scripted event queue.
    #[derive(Debug, Default)]
    struct ScriptedEvents {
        queue: Mutex<VecDeque<Event>>,
    }

    impl ScriptedEvents {
        fn push(&self, events: impl IntoIterator<Item = Event>) {
            self.queue.lock().unwrap().extend(events);
        }

        fn len(&self) -> usize {
            self.queue.lock().unwrap().len()
        }
    }

    impl EventSource for ScriptedEvents {
        fn poll(&self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.queue.lock().unwrap().is_empty())
        }

        fn read(&self) -> io::Result<Event> {
            self.queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::WouldBlock, "no event"))
        }
    }

    fn char_press(c: char) -> Event {
        press(event::KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_drained_keys_served_in_order() {
        let reader = KeyReader::new(ScriptedEvents::default());
        reader.events.push([
            char_press('a'),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved,
                column: 3,
                row: 4,
                modifiers: KeyModifiers::NONE,
            }),
            Event::Resize(100, 40),
            Event::Key(KeyEvent {
                code: event::KeyCode::Char('z'),
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Release,
                state: KeyEventState::NONE,
            }),
            char_press('b'),
            Event::Paste("pasted".to_string()),
            press(event::KeyCode::Enter, KeyModifiers::NONE),
        ]);

        reader.drain().unwrap();
        assert_eq!(reader.events.len(), 0);

        // Arrives after the drain; parked keys still come first.
        reader.events.push([char_press('c')]);

        let mut keys = Vec::new();
        while let Some(key) = reader.poll_key(Duration::ZERO).unwrap() {
            keys.push(key);
        }
        assert_eq!(
            keys,
            vec![
                KeyCode::Char('a'),
                KeyCode::Char('b'),
                KeyCode::Enter,
                KeyCode::Char('c'),
            ]
        );
    }

    #[test]
    fn test_drain_skipped_while_input_reads() {
        let reader = KeyReader::new(ScriptedEvents::default());
        reader.events.push([char_press('x'), Event::Resize(80, 24)]);

        {
            let _reading = reader.pending.lock().unwrap();
            reader.drain().unwrap();
            assert_eq!(reader.events.len(), 2);
        }

        assert_eq!(reader.poll_key(Duration::ZERO).unwrap(), Some(KeyCode::Char('x')));
        // The resize is filtered on the input side.
        assert_eq!(reader.poll_key(Duration::ZERO).unwrap(), None);
        assert_eq!(reader.events.len(), 0);
    }

    #[test]
    fn test_repeated_drains_keep_order() {
        let reader = KeyReader::new(ScriptedEvents::default());
        reader.events.push([char_press('1')]);
        reader.drain().unwrap();
        reader.events.push([char_press('2'), Event::FocusLost]);
        reader.drain().unwrap();
        reader.drain().unwrap();

        assert_eq!(reader.poll_key(Duration::ZERO).unwrap(), Some(KeyCode::Char('1')));
        assert_eq!(reader.poll_key(Duration::ZERO).unwrap(), Some(KeyCode::Char('2')));
        assert_eq!(reader.poll_key(Duration::ZERO).unwrap(), None);
    }
}
