//! Persistence Adapter — loads the record once per session and saves it,
//! debounced, after every later change.
//!
//! Saves are fire-and-forget: [`PersistenceAdapter::save`] hands the record
//! to a background writer task over an mpsc channel. The writer keeps only
//! the newest pending record and writes it once the channel has been quiet
//! for the debounce window. [`PersistenceAdapter::flush`] forces the pending
//! write and waits for it.

pub mod kv;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::ResumeRecord;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

enum SaveMessage {
    Save(Box<ResumeRecord>),
    Flush(oneshot::Sender<()>),
}

pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    key: String,
    tx: mpsc::UnboundedSender<SaveMessage>,
    writer: JoinHandle<()>,
}

impl PersistenceAdapter {
    /// Spawns the writer task; must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, debounce: Duration) -> Self {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(store.clone(), key.clone(), debounce, rx));
        Self {
            store,
            key,
            tx,
            writer,
        }
    }

    /// Returns the stored record, or `default` when nothing is stored or the
    /// stored value cannot be read.
    pub fn load(&self, default: ResumeRecord) -> ResumeRecord {
        load_record(self.store.as_ref(), &self.key, default)
    }

    /// Schedules a save of `record`. Never blocks and never reports failure.
    pub fn save(&self, record: &ResumeRecord) {
        if self
            .tx
            .send(SaveMessage::Save(Box::new(record.clone())))
            .is_err()
        {
            warn!(key = %self.key, "Persistence writer has stopped; save dropped");
        }
    }

    /// Writes any pending record now and waits until it is stored.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SaveMessage::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flushes and stops the writer task.
    pub async fn shutdown(self) {
        self.flush().await;
        drop(self.tx);
        if let Err(e) = self.writer.await {
            warn!("Persistence writer ended abnormally: {e}");
        }
    }
}

/// Reads and parses the record stored under `key`, falling back to `default`.
pub fn load_record(store: &dyn KeyValueStore, key: &str, default: ResumeRecord) -> ResumeRecord {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str::<ResumeRecord>(&raw) {
            Ok(record) => {
                info!(key, "Loaded resume from local storage");
                record
            }
            Err(e) => {
                warn!(key, "Stored resume is unreadable, using defaults: {e}");
                default
            }
        },
        Ok(None) => {
            debug!(key, "No stored resume, using defaults");
            default
        }
        Err(e) => {
            warn!(key, "Local storage read failed, using defaults: {e}");
            default
        }
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<SaveMessage>,
) {
    let mut pending: Option<Box<ResumeRecord>> = None;

    loop {
        let message = if pending.is_some() {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(message) => message,
                Err(_quiet) => {
                    if let Some(record) = pending.take() {
                        write_record(&store, &key, record).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match message {
            Some(SaveMessage::Save(record)) => pending = Some(record),
            Some(SaveMessage::Flush(ack)) => {
                if let Some(record) = pending.take() {
                    write_record(&store, &key, record).await;
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(record) = pending.take() {
                    write_record(&store, &key, record).await;
                }
                break;
            }
        }
    }
}

async fn write_record(store: &Arc<dyn KeyValueStore>, key: &str, record: Box<ResumeRecord>) {
    let serialized = match serde_json::to_string(&record) {
        Ok(s) => s,
        Err(e) => {
            warn!(key, "Resume could not be serialized for saving: {e}");
            return;
        }
    };

    let store = store.clone();
    let owned_key = key.to_string();
    let result = tokio::task::spawn_blocking(move || store.set(&owned_key, &serialized)).await;

    match result {
        Ok(Ok(())) => debug!(key, "Resume saved to local storage"),
        Ok(Err(e)) => warn!(key, "Resume save failed: {e}"),
        Err(e) => warn!(key, "Resume save task failed: {e}"),
    }
}
