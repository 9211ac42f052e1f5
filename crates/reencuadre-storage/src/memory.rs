use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reencuadre_core::history::{
    collection_path, sort_newest_first, HistoryRecord, HistoryStore, HistorySubscription,
};
use reencuadre_core::input::SessionInput;
use reencuadre_core::types::GeneratedOutput;
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

struct Collection {
    /// Insertion order.
    records: Vec<HistoryRecord>,
    snapshots: watch::Sender<Vec<HistoryRecord>>,
}

impl Collection {
    fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            records: Vec::new(),
            snapshots,
        }
    }

    fn snapshot(&self) -> Vec<HistoryRecord> {
        let mut records = self.records.clone();
        sort_newest_first(&mut records);
        records
    }
}

/// Process-local history, lost on exit.
pub struct MemoryHistoryStore {
    app_id: String,
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryHistoryStore {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(
        &self,
        owner_id: &str,
        input: &SessionInput,
        output: &GeneratedOutput,
    ) -> Result<HistoryRecord> {
        let path = collection_path(&self.app_id, owner_id);
        let record = HistoryRecord::new(owner_id, input, output);

        let mut collections = self.collections.write().await;
        let collection = collections.entry(path.clone()).or_insert_with(Collection::new);
        collection.records.push(record.clone());
        collection.snapshots.send_replace(collection.snapshot());

        debug!("Appended {} to {}", record.id, path);
        Ok(record)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<HistoryRecord>> {
        let path = collection_path(&self.app_id, owner_id);
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path)
            .map(Collection::snapshot)
            .unwrap_or_default())
    }

    async fn subscribe(&self, owner_id: &str) -> Result<HistorySubscription> {
        let path = collection_path(&self.app_id, owner_id);
        let mut collections = self.collections.write().await;
        let collection = collections.entry(path).or_insert_with(Collection::new);
        Ok(HistorySubscription::new(collection.snapshots.subscribe()))
    }
}
