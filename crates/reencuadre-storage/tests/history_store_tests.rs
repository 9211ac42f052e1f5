use reencuadre_core::composer::compose_result;
use reencuadre_core::history::HistoryStore;
use reencuadre_core::input::{Frequency, SessionDraft, SessionInput, Timeframe};
use reencuadre_core::reframe::derive_bundle;
use reencuadre_core::types::GeneratedOutput;
use reencuadre_storage::{MemoryHistoryStore, SledHistoryStore};
use std::sync::Arc;
use tempfile::tempdir;

fn input(situation: &str) -> SessionInput {
    let mut draft = SessionDraft {
        situation: situation.to_string(),
        timeframe: Some(Timeframe::Current),
        frequency: Some(Frequency::Infrequent),
        ..Default::default()
    };
    draft.toggle_emotion("Tristeza");
    draft.select_object("Flor");
    draft.validate().unwrap()
}

fn composed(input: &SessionInput) -> GeneratedOutput {
    let bundle = derive_bundle(&input.selected_emotions, input.timeframe, input.frequency);
    GeneratedOutput::Composed(compose_result(input, &bundle))
}

async fn lists_newest_first(store: &dyn HistoryStore) {
    for situation in ["uno", "dos", "tres"] {
        let input = input(situation);
        store.append("u1", &input, &composed(&input)).await.unwrap();
    }
    let situations: Vec<String> = store
        .list("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.input.situation_text)
        .collect();
    assert_eq!(situations, vec!["tres", "dos", "uno"]);
}

async fn scopes_by_owner(store: &dyn HistoryStore) {
    let input = input("privado");
    store.append("alice", &input, &composed(&input)).await.unwrap();
    assert!(store.list("bob").await.unwrap().is_empty());
    assert_eq!(store.list("alice").await.unwrap()[0].owner_id, "alice");
}

async fn subscription_sees_appends(store: &dyn HistoryStore) {
    let mut sub = store.subscribe("u2").await.unwrap();
    assert!(sub.current().is_empty());

    let first = input("primero");
    store.append("u2", &first, &composed(&first)).await.unwrap();
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot.len(), 1);

    let second = input("segundo");
    store
        .append("u2", &second, &GeneratedOutput::FreeText("texto libre".into()))
        .await
        .unwrap();
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot[0].input.situation_text, "segundo");
    assert_eq!(snapshot[0].output, GeneratedOutput::FreeText("texto libre".into()));

    sub.close();
    assert!(sub.next().await.is_none());
}

#[tokio::test]
async fn test_memory_store() {
    lists_newest_first(&MemoryHistoryStore::new("app")).await;
    scopes_by_owner(&MemoryHistoryStore::new("app")).await;
    subscription_sees_appends(&MemoryHistoryStore::new("app")).await;
}

#[tokio::test]
async fn test_sled_store() {
    lists_newest_first(&SledHistoryStore::temporary("app").unwrap()).await;
    scopes_by_owner(&SledHistoryStore::temporary("app").unwrap()).await;
    subscription_sees_appends(&SledHistoryStore::temporary("app").unwrap()).await;
}

#[tokio::test]
async fn test_sled_store_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history");
    {
        let store = SledHistoryStore::open(&path, "app").unwrap();
        let input = input("persistente");
        store.append("u1", &input, &composed(&input)).await.unwrap();
    }
    let store = SledHistoryStore::open(&path, "app").unwrap();
    let records = store.list("u1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0].output, GeneratedOutput::Composed(_)));

    let other_app = SledHistoryStore::temporary("otra").unwrap();
    assert!(other_app.list("u1").await.unwrap().is_empty());
}

async fn concurrent_appends_keep_live_view_current(store: Arc<dyn HistoryStore>) {
    for round in 0..20 {
        let owner = format!("u{}", round);
        let sub = store.subscribe(&owner).await.unwrap();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            let owner = owner.clone();
            handles.push(tokio::spawn(async move {
                let input = input(&format!("s{}", i));
                store.append(&owner, &input, &composed(&input)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let listed: Vec<_> = store.list(&owner).await.unwrap().into_iter().map(|r| r.id).collect();
        let live: Vec<_> = sub.current().into_iter().map(|r| r.id).collect();
        assert_eq!(listed.len(), 16);
        assert_eq!(live, listed, "live view out of date in round {}", round);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_all_kept() {
    concurrent_appends_keep_live_view_current(Arc::new(MemoryHistoryStore::new("app"))).await;
    concurrent_appends_keep_live_view_current(Arc::new(SledHistoryStore::temporary("app").unwrap())).await;
}
