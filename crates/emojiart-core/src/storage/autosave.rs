//! Write-through autosave on a background thread.
//!
//! Every change hands a full snapshot of the document to the worker. The
//! worker writes snapshots in the order they were submitted and, when it
//! falls behind, skips straight to the newest one, so the stored bytes always
//! end up matching the latest state.

use crate::emoji_art::EmojiArt;
use crate::storage::{Storage, StorageError};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SendError, Sender, channel};
use std::thread::{self, JoinHandle};

/// Storage key used when none is configured.
pub const DEFAULT_AUTOSAVE_KEY: &str = "autosave";

/// Commands sent to the worker thread.
enum SaveCommand {
    Write { version: u64, bytes: Vec<u8> },
    Flush(Sender<()>),
}

/// Persists document snapshots without blocking the caller.
pub struct AutoSaver {
    storage: Arc<dyn Storage>,
    key: String,
    /// Version of the last submitted snapshot.
    version: u64,
    cmd_tx: Option<Sender<SaveCommand>>,
    thread: Option<JoinHandle<()>>,
}

impl AutoSaver {
    /// Create an autosaver writing under `key` and start its worker.
    ///
    /// If the worker cannot be spawned, snapshots are written synchronously.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (cmd_tx, cmd_rx) = channel::<SaveCommand>();

        let worker_storage = Arc::clone(&storage);
        let worker_key = key.clone();
        let spawned = thread::Builder::new()
            .name("emojiart-autosave".to_string())
            .spawn(move || run_worker(worker_storage.as_ref(), &worker_key, cmd_rx));

        let (cmd_tx, thread) = match spawned {
            Ok(handle) => (Some(cmd_tx), Some(handle)),
            Err(e) => {
                log::error!("Failed to start autosave thread, saving inline: {}", e);
                (None, None)
            }
        };

        Self {
            storage,
            key,
            version: 0,
            cmd_tx,
            thread,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Version of the most recently submitted snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Load the autosaved document.
    ///
    /// Returns `None` when nothing was saved yet or the stored bytes cannot
    /// be read or decoded.
    pub fn load(&self) -> Option<EmojiArt> {
        let bytes = match self.storage.load(&self.key) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => {
                log::info!("No autosave under '{}', starting empty", self.key);
                return None;
            }
            Err(e) => {
                log::warn!("Failed to read autosave '{}': {}", self.key, e);
                return None;
            }
        };

        match EmojiArt::from_json(&bytes) {
            Ok(art) => {
                log::info!("Loaded autosave '{}' with {} emoji", self.key, art.len());
                Some(art)
            }
            Err(e) => {
                log::warn!("Discarding unreadable autosave '{}': {}", self.key, e);
                None
            }
        }
    }

    /// Queue a snapshot of `art` for writing.
    ///
    /// Serialization and write failures are logged; the in-memory document
    /// stays authoritative.
    pub fn submit(&mut self, art: &EmojiArt) {
        let bytes = match art.json() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to serialize document: {}", e);
                return;
            }
        };
        self.version += 1;
        let version = self.version;

        let cmd = SaveCommand::Write { version, bytes };
        let cmd = match &self.cmd_tx {
            Some(tx) => match tx.send(cmd) {
                Ok(()) => return,
                Err(SendError(cmd)) => {
                    log::error!("Autosave thread is gone, saving inline");
                    self.cmd_tx = None;
                    cmd
                }
            },
            None => cmd,
        };

        if let SaveCommand::Write { version, bytes } = cmd {
            write_snapshot(self.storage.as_ref(), &self.key, version, &bytes);
        }
    }

    /// Block until every submitted snapshot has been written.
    pub fn flush(&self) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        let (ack_tx, ack_rx) = channel();
        if tx.send(SaveCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.cmd_tx = None;
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Autosave thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaver")
            .field("key", &self.key)
            .field("version", &self.version)
            .field("threaded", &self.cmd_tx.is_some())
            .finish()
    }
}

fn run_worker(storage: &dyn Storage, key: &str, cmd_rx: Receiver<SaveCommand>) {
    log::debug!("Autosave thread started for '{}'", key);
    while let Ok(first) = cmd_rx.recv() {
        let mut latest: Option<(u64, Vec<u8>)> = None;
        let mut acks = Vec::new();

        for cmd in std::iter::once(first).chain(cmd_rx.try_iter()) {
            match cmd {
                SaveCommand::Write { version, bytes } => {
                    if latest.as_ref().is_none_or(|(newest, _)| version > *newest) {
                        latest = Some((version, bytes));
                    }
                }
                SaveCommand::Flush(ack) => acks.push(ack),
            }
        }

        if let Some((version, bytes)) = latest {
            write_snapshot(storage, key, version, &bytes);
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
    log::debug!("Autosave thread exiting for '{}'", key);
}

fn write_snapshot(storage: &dyn Storage, key: &str, version: u64, bytes: &[u8]) {
    match storage.save(key, bytes) {
        Ok(()) => log::debug!("Autosaved '{}' version {}", key, version),
        Err(e) => log::error!("Autosave of '{}' version {} failed: {}", key, version, e),
    }
}
