//! Typing flag: the one coordination point between the two workers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "a render is in progress" flag.
///
/// Written only by the render worker, read by the input worker. Clones share
/// the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct TypingFlag(Arc<AtomicBool>);

impl TypingFlag {
    /// Create a flag in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a render is currently in progress.
    #[inline]
    pub fn is_typing(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set(&self, typing: bool) {
        self.0.store(typing, Ordering::Release);
    }
}

/// Holds the flag raised for the lifetime of one render.
///
/// Lowering happens on drop so an early return still releases the input
/// worker.
pub(crate) struct TypingGuard<'a>(&'a TypingFlag);

impl<'a> TypingGuard<'a> {
    pub(crate) fn raise(flag: &'a TypingFlag) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
