//! Replay feed: a stand-in for a remote event source
//!
//! Reads a JSON document of historical and live events and pushes them into
//! the spawn queue from a background thread. History is enqueued presettled
//! right away; live events follow after their delays. When the feed cannot be
//! loaded the simulation simply runs local-only.

use crate::queue::SpawnProducer;
use flurry_core::{FlurryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Longest single sleep before the stop flag is checked again
const STOP_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub kind: String,
    /// Delay after the previous event
    #[serde(default)]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    /// Kinds already delivered before startup
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub live: Vec<LiveEvent>,
}

impl FeedDocument {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| FlurryError::FeedError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Handle to a running replay thread
pub struct ReplayFeed {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl ReplayFeed {
    /// Start pushing `document` through `producer` on a background thread
    pub fn start(document: FeedDocument, producer: SpawnProducer) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || replay(document, producer, thread_stop));
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Load and start a feed, or log why it is unavailable and return None
    pub fn connect(path: &Path, producer: SpawnProducer) -> Option<Self> {
        match FeedDocument::load(path) {
            Ok(document) => {
                log::info!(
                    "feed {}: {} historical, {} live event(s)",
                    path.display(),
                    document.history.len(),
                    document.live.len()
                );
                Some(Self::start(document, producer))
            }
            Err(e) => {
                log::warn!("feed {} unavailable, running local-only: {e}", path.display());
                None
            }
        }
    }

    /// Ask the thread to stop at its next check
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Wait for the thread and return how many requests it enqueued
    pub fn join(mut self) -> Result<usize> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| FlurryError::RuntimeError("replay feed thread panicked".into())),
            None => Ok(0),
        }
    }
}

impl Drop for ReplayFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

fn replay(document: FeedDocument, producer: SpawnProducer, stop: Arc<AtomicBool>) -> usize {
    let mut sent = 0;
    for kind in document.history {
        if stop.load(Ordering::Acquire) || !producer.enqueue(kind, true) {
            return sent;
        }
        sent += 1;
    }
    for event in document.live {
        if !sleep_unless_stopped(Duration::from_millis(event.delay_ms), &stop) {
            return sent;
        }
        if !producer.enqueue(event.kind, false) {
            return sent;
        }
        sent += 1;
    }
    sent
}

/// Sleep in short slices; false if the stop flag was raised
fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) -> bool {
    let mut remaining = total;
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        if remaining.is_zero() {
            return true;
        }
        let slice = remaining.min(STOP_POLL);
        std::thread::sleep(slice);
        remaining -= slice;
    }
}
