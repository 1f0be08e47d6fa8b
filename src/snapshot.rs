//! Snapshot worker: periodic copies of a data file into rotating slots.
//!
//! Runs on its own timer thread, independent of terminal I/O, and reports
//! every attempt through a [`Publisher`].

use crate::actor::Publisher;
use crate::error::{ConsoleError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Longest uninterrupted sleep, so shutdown never waits a whole interval.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Snapshot settings.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// File to copy.
    pub source: PathBuf,
    /// Directory holding `slot_<n>` subdirectories.
    pub root: PathBuf,
    /// Time between snapshots.
    pub interval: Duration,
    /// Number of slots to rotate through.
    pub slot_count: u32,
    /// Take one snapshot as soon as the worker starts.
    pub save_immediately: bool,
}

/// Result of one snapshot attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The source was copied into a slot.
    Saved {
        /// Slot index.
        slot: u32,
        /// Copy that was written.
        path: PathBuf,
    },
    /// The source file does not exist.
    SourceMissing,
    /// Copying failed.
    Failed {
        /// Slot index.
        slot: u32,
        /// What went wrong.
        error: String,
    },
}

/// Slot rotation; one attempt at a time.
#[derive(Debug)]
struct Slots {
    config: SnapshotConfig,
    next: u32,
}

impl Slots {
    fn slot_path(&self, slot: u32) -> PathBuf {
        let file_name = self.config.source.file_name().unwrap_or_default();
        self.config.root.join(format!("slot_{slot}")).join(file_name)
    }

    fn copy_into(source: &Path, target: &Path) -> io::Result<()> {
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::copy(source, target)?;
        Ok(())
    }

    /// Take one snapshot, report it, and advance to the next slot.
    fn save(&mut self, publisher: &Publisher) -> SnapshotOutcome {
        let slot = self.next;
        let target = self.slot_path(slot);

        let outcome = if !self.config.source.exists() {
            SnapshotOutcome::SourceMissing
        } else {
            match Self::copy_into(&self.config.source, &target) {
                Ok(()) => SnapshotOutcome::Saved { slot, path: target },
                Err(e) => SnapshotOutcome::Failed {
                    slot,
                    error: e.to_string(),
                },
            }
        };

        match &outcome {
            SnapshotOutcome::Saved { slot, path } => {
                let stamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |d| d.as_secs());
                tracing::debug!(slot, path = %path.display(), "snapshot saved");
                publisher.info(format!("snapshot saved: #{slot} @{stamp}"));
            }
            SnapshotOutcome::SourceMissing => {
                tracing::warn!(source = %self.config.source.display(), "snapshot source missing");
                publisher.warn(format!(
                    "snapshot source does not exist: {}",
                    self.config.source.display()
                ));
            }
            SnapshotOutcome::Failed { slot, error } => {
                tracing::warn!(slot, %error, "snapshot failed");
                publisher.error(format!("snapshot failed (slot #{slot}): {error}"));
            }
        }

        self.next = (self.next + 1) % self.config.slot_count.max(1);
        outcome
    }
}

/// Timer thread taking periodic snapshots.
pub struct SnapshotWorker {
    /// Handle to the timer thread.
    handle: Mutex<Option<JoinHandle<()>>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    slots: Arc<Mutex<Slots>>,
    publisher: Publisher,
    interval: Duration,
    save_immediately: bool,
}

impl SnapshotWorker {
    /// Create a worker; nothing happens until [`start`](Self::start).
    pub fn new(config: SnapshotConfig, publisher: Publisher) -> Self {
        let interval = config.interval;
        let save_immediately = config.save_immediately;

        Self {
            handle: Mutex::new(None),
            shutdown: Arc::new(AtomicBool::new(false)),
            slots: Arc::new(Mutex::new(Slots { config, next: 0 })),
            publisher,
            interval,
            save_immediately,
        }
    }

    /// Spawn the timer thread. Returns `Ok(false)` if already running.
    pub fn start(&self) -> Result<bool> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.is_some() || self.shutdown.load(Ordering::Acquire) {
            return Ok(false);
        }

        let shutdown = Arc::clone(&self.shutdown);
        let slots = Arc::clone(&self.slots);
        let publisher = self.publisher.clone();
        let interval = self.interval;
        let save_immediately = self.save_immediately;

        *handle = Some(
            thread::Builder::new()
                .name("danheng-snapshot".to_string())
                .spawn(move || {
                    Self::run_loop(&slots, &publisher, &shutdown, interval, save_immediately);
                })
                .map_err(|source| ConsoleError::Spawn {
                    worker: "snapshot",
                    source,
                })?,
        );
        tracing::debug!(?interval, "snapshot thread started");
        Ok(true)
    }

    /// Take one snapshot right now, in the calling thread.
    pub fn trigger_now(&self) -> SnapshotOutcome {
        Self::save(&self.slots, &self.publisher)
    }

    /// Signal the timer thread to stop and wait for it.
    pub fn shutdown(&self) -> Result<()> {
        self.shutdown.store(true, Ordering::Release);
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle
                .join()
                .map_err(|_| ConsoleError::WorkerPanicked("snapshot"))?;
        }
        Ok(())
    }

    fn save(slots: &Mutex<Slots>, publisher: &Publisher) -> SnapshotOutcome {
        slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .save(publisher)
    }

    /// Main timer loop.
    fn run_loop(
        slots: &Mutex<Slots>,
        publisher: &Publisher,
        shutdown: &AtomicBool,
        interval: Duration,
        save_immediately: bool,
    ) {
        if save_immediately {
            Self::save(slots, publisher);
        }

        // `None` once the next tick lies beyond what `Instant` can represent.
        let mut next_tick = Instant::now().checked_add(interval);
        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            let now = Instant::now();
            match next_tick {
                Some(tick) if now >= tick => {
                    Self::save(slots, publisher);
                    // Behind schedule: skip the missed ticks instead of bursting
                    next_tick = tick
                        .checked_add(interval)
                        .filter(|next| *next >= now)
                        .or_else(|| now.checked_add(interval));
                }
                Some(tick) => thread::sleep((tick - now).min(SLEEP_SLICE)),
                None => thread::sleep(SLEEP_SLICE),
            }
        }
    }
}

impl Drop for SnapshotWorker {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
