//! Persistent history on `sled`. Each owner's collection is a tree named by
//! its collection path; keys are `created_at` micros then a store-wide
//! sequence number, both big-endian, so reverse iteration lists newest
//! first with later insertions winning ties.

use crate::error::StoreError;
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use reencuadre_core::history::{collection_path, HistoryRecord, HistoryStore, HistorySubscription};
use reencuadre_core::input::SessionInput;
use reencuadre_core::types::GeneratedOutput;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

pub struct SledHistoryStore {
    db: sled::Db,
    app_id: String,
    watchers: Mutex<HashMap<String, watch::Sender<Vec<HistoryRecord>>>>,
}

fn record_key(record: &HistoryRecord, sequence: u64) -> [u8; 16] {
    let micros = record.created_at.timestamp_micros().max(0) as u64;
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&micros.to_be_bytes());
    key[8..].copy_from_slice(&sequence.to_be_bytes());
    key
}

impl SledHistoryStore {
    pub fn open<P: AsRef<Path>>(path: P, app_id: impl Into<String>) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self::with_db(db, app_id))
    }

    /// Backed by a temporary database removed on drop.
    pub fn temporary(app_id: impl Into<String>) -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self::with_db(db, app_id))
    }

    fn with_db(db: sled::Db, app_id: impl Into<String>) -> Self {
        Self {
            db,
            app_id: app_id.into(),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Shared handle, e.g. for a [`crate::SledIdentityProvider`].
    pub fn db(&self) -> sled::Db {
        self.db.clone()
    }

    fn tree(&self, owner_id: &str) -> Result<(String, sled::Tree), StoreError> {
        let path = collection_path(&self.app_id, owner_id);
        let tree = self.db.open_tree(path.as_bytes())?;
        Ok((path, tree))
    }

    fn read_all(tree: &sled::Tree) -> Result<Vec<HistoryRecord>, StoreError> {
        tree.iter()
            .values()
            .rev()
            .map(|value| -> Result<HistoryRecord, StoreError> {
                Ok(serde_json::from_slice(&value?)?)
            })
            .collect()
    }

    fn lock_watchers(&self) -> MutexGuard<'_, HashMap<String, watch::Sender<Vec<HistoryRecord>>>> {
        match self.watchers.lock() {
            Ok(watchers) => watchers,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Reads and publishes under the watchers lock so an older snapshot can
    /// never replace a newer one.
    fn publish(&self, path: &str, tree: &sled::Tree) {
        let watchers = self.lock_watchers();
        let Some(sender) = watchers.get(path) else {
            return;
        };
        match Self::read_all(tree) {
            Ok(snapshot) => {
                sender.send_replace(snapshot);
            }
            Err(e) => warn!("Could not refresh subscribers of {}: {}", path, e),
        }
    }
}

#[async_trait]
impl HistoryStore for SledHistoryStore {
    async fn append(
        &self,
        owner_id: &str,
        input: &SessionInput,
        output: &GeneratedOutput,
    ) -> Result<HistoryRecord> {
        let (path, tree) = self.tree(owner_id)?;
        let record = HistoryRecord::new(owner_id, input, output);
        let sequence = self.db.generate_id().map_err(StoreError::from)?;

        let value = serde_json::to_vec(&record).map_err(StoreError::from)?;
        tree.insert(record_key(&record, sequence), value)
            .map_err(StoreError::from)?;
        tree.flush().map_err(StoreError::from)?;
        debug!("Appended {} to {}", record.id, path);

        self.publish(&path, &tree);
        Ok(record)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<HistoryRecord>> {
        let (_, tree) = self.tree(owner_id)?;
        Ok(Self::read_all(&tree)?)
    }

    async fn subscribe(&self, owner_id: &str) -> Result<HistorySubscription> {
        let (path, tree) = self.tree(owner_id)?;
        let mut watchers = self.lock_watchers();
        let snapshot = Self::read_all(&tree)?;
        let sender = watchers
            .entry(path)
            .or_insert_with(|| watch::channel(Vec::new()).0);
        sender.send_replace(snapshot);
        Ok(HistorySubscription::new(sender.subscribe()))
    }
}
