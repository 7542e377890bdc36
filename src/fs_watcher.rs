//! File watching for the `watch` subcommand
//!
//! Uses the `notify` crate with debouncing to detect writes to a single
//! file. The parent directory is watched non-recursively because editors
//! often save by renaming a temp file over the original.

use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// Watches one file and reports when it changed on disk
pub struct FileWatcher {
    /// The debouncer handles watching and event coalescing
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    /// Receiver for debounced events
    rx: Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    /// File being watched
    path: PathBuf,
}

impl FileWatcher {
    /// Start watching `path`; bursts of writes within `debounce` collapse
    pub fn new(path: &Path, debounce: Duration) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut debouncer = new_debouncer(debounce, tx)?;
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        tracing::info!("Watching {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the watched file changes or `timeout` passes.
    /// Returns true if it changed.
    pub fn wait_for_change(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => self.is_relevant(result) || self.poll_changed(),
            Err(_) => false,
        }
    }

    /// Drain pending events without blocking. Returns true if the watched
    /// file was among them.
    pub fn poll_changed(&self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.rx.try_recv() {
            changed |= self.is_relevant(result);
        }
        changed
    }

    fn is_relevant(
        &self,
        result: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>,
    ) -> bool {
        match result {
            Ok(events) => events.iter().any(|event| {
                // Continuous events during active changes - wait for the settle
                !matches!(event.kind, DebouncedEventKind::AnyContinuous) && event.path == self.path
            }),
            Err(e) => {
                tracing::warn!("File watcher error: {:?}", e);
                false
            }
        }
    }
}
