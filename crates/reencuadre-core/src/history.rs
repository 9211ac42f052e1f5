//! Append-only reframe history, scoped per owner.

use crate::input::SessionInput;
use crate::types::GeneratedOutput;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

pub const DEFAULT_APP_ID: &str = "default-app-id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub input: SessionInput,
    pub output: GeneratedOutput,
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
}

impl HistoryRecord {
    pub fn new(owner_id: &str, input: &SessionInput, output: &GeneratedOutput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            input: input.clone(),
            output: output.clone(),
            created_at: Utc::now(),
            owner_id: owner_id.to_string(),
        }
    }
}

/// Where an owner's records live: `artifacts/{app_id}/users/{owner_id}/reframes`.
pub fn collection_path(app_id: &str, owner_id: &str) -> String {
    format!("artifacts/{}/users/{}/reframes", app_id, owner_id)
}

/// Newest first. Equal timestamps keep the later insertion first, so
/// callers sort a stable, insertion-ordered list with this.
pub fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.reverse();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(
        &self,
        owner_id: &str,
        input: &SessionInput,
        output: &GeneratedOutput,
    ) -> Result<HistoryRecord>;

    /// All of the owner's records, newest first.
    async fn list(&self, owner_id: &str) -> Result<Vec<HistoryRecord>>;

    /// Live view of the owner's records. Every snapshot is ordered newest
    /// first; updates stop once the subscription is dropped or closed.
    async fn subscribe(&self, owner_id: &str) -> Result<HistorySubscription>;
}

pub struct HistorySubscription {
    receiver: Option<watch::Receiver<Vec<HistoryRecord>>>,
}

impl HistorySubscription {
    pub fn new(receiver: watch::Receiver<Vec<HistoryRecord>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Latest snapshot, empty once closed.
    pub fn current(&self) -> Vec<HistoryRecord> {
        self.receiver
            .as_ref()
            .map(|rx| rx.borrow().clone())
            .unwrap_or_default()
    }

    /// Waits for the next snapshot. `None` after `close` or when the store
    /// is gone.
    pub async fn next(&mut self) -> Option<Vec<HistoryRecord>> {
        let rx = self.receiver.as_mut()?;
        match rx.changed().await {
            Ok(()) => Some(rx.borrow_and_update().clone()),
            Err(_) => {
                self.receiver = None;
                None
            }
        }
    }

    pub fn close(&mut self) {
        self.receiver = None;
    }

    pub fn is_closed(&self) -> bool {
        self.receiver.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Frequency, SubmodalityParams, Timeframe};
    use chrono::TimeZone;

    fn record(id: &str, secs: i64) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            input: SessionInput {
                situation_text: "s".into(),
                emotional_load: 3,
                selected_emotions: vec!["Miedo".into()],
                representative_object: "Piedra".into(),
                timeframe: Timeframe::Current,
                frequency: Frequency::Infrequent,
                submodality_params: SubmodalityParams::default(),
            },
            output: GeneratedOutput::FreeText("t".into()),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            owner_id: "u1".into(),
        }
    }

    #[test]
    fn collection_path_is_scoped_by_app_and_owner() {
        assert_eq!(
            collection_path(DEFAULT_APP_ID, "abc"),
            "artifacts/default-app-id/users/abc/reframes"
        );
    }

    #[test]
    fn newest_first_with_later_insertion_winning_ties() {
        let mut records = vec![record("a", 10), record("b", 20), record("c", 20)];
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn subscription_yields_updates_until_closed() {
        let (tx, rx) = watch::channel(Vec::new());
        let mut sub = HistorySubscription::new(rx);
        assert!(sub.current().is_empty());

        tx.send_replace(vec![record("a", 1)]);
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        sub.close();
        assert!(sub.is_closed());
        tx.send_replace(vec![record("b", 2)]);
        assert!(sub.next().await.is_none());
        assert!(sub.current().is_empty());
    }

    #[tokio::test]
    async fn subscription_ends_when_sender_is_dropped() {
        let (tx, rx) = watch::channel(Vec::new());
        let mut sub = HistorySubscription::new(rx);
        drop(tx);
        assert!(sub.next().await.is_none());
        assert!(sub.is_closed());
    }
}
