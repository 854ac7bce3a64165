//! Polling configuration-change watcher.
//!
//! # Responsibility
//! - Detect content changes of the buildings configuration file.
//! - Deliver parsed, validated configurations to the consumer.
//!
//! # Invariants
//! - Change detection compares file content bytes, not timestamps; a
//!   rewrite with identical content emits nothing.
//! - Invalid or unreadable content is logged and never delivered; the
//!   last valid configuration stays in effect downstream.
//! - The watcher thread stops when the handle is dropped or stopped.

use crate::config::{parse_config, BuildingsConfig};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Background watcher emitting parsed configurations on content change.
pub struct ConfigWatcher {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    changes: Receiver<BuildingsConfig>,
}

impl ConfigWatcher {
    /// Spawns a watcher polling `path` every `poll_interval`.
    ///
    /// The content present at spawn time is the baseline; only subsequent
    /// content changes are delivered. The baseline is read before the
    /// watcher thread starts, so a write landing right after `spawn`
    /// returns is a change, not the baseline.
    pub fn spawn(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        let path = path.into();
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = channel();
        let baseline = std::fs::read(&path).ok();

        let thread_stop = Arc::clone(&stop);
        let thread =
            std::thread::spawn(move || watch_loop(path, baseline, poll_interval, thread_stop, tx));

        Self {
            stop,
            thread: Some(thread),
            changes: rx,
        }
    }

    /// Returns the channel on which parsed configurations arrive.
    pub fn changes(&self) -> &Receiver<BuildingsConfig> {
        &self.changes
    }

    /// Stops the watcher thread and waits for it to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn watch_loop(
    path: PathBuf,
    mut last_seen: Option<Vec<u8>>,
    poll_interval: Duration,
    stop: Arc<AtomicBool>,
    tx: Sender<BuildingsConfig>,
) {
    info!(
        "event=config_watch module=config status=start path={}",
        path.display()
    );

    while !stop.load(Ordering::Acquire) {
        std::thread::sleep(poll_interval);
        if stop.load(Ordering::Acquire) {
            break;
        }

        let current = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "event=config_watch module=config status=unreadable path={} error={err}",
                    path.display()
                );
                continue;
            }
        };

        if last_seen.as_deref() == Some(current.as_slice()) {
            continue;
        }
        last_seen = Some(current.clone());

        let content = match String::from_utf8(current) {
            Ok(content) => content,
            Err(_) => {
                error!(
                    "event=config_watch module=config status=invalid path={} error=non_utf8_content",
                    path.display()
                );
                continue;
            }
        };

        match parse_config(&content) {
            Ok(config) => {
                info!(
                    "event=config_watch module=config status=changed path={} buildings={}",
                    path.display(),
                    config.buildings.len()
                );
                if tx.send(config).is_err() {
                    // Receiver side is gone; nothing left to notify.
                    break;
                }
            }
            Err(err) => {
                error!(
                    "event=config_watch module=config status=invalid path={} error={err}",
                    path.display()
                );
            }
        }
    }

    info!(
        "event=config_watch module=config status=stop path={}",
        path.display()
    );
}
