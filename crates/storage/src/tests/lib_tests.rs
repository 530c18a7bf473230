use super::*;
use chrono::{TimeZone, Utc};
use shared::domain::{Identity, UserId};
use std::sync::Arc;

fn at_millis(millis: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().expect("timestamp")
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn sqlite_store_overwrites_and_removes_keys() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    assert_eq!(storage.get("k").await.expect("get"), None);
    storage.set("k", "one").await.expect("set");
    storage.set("k", "two").await.expect("overwrite");
    assert_eq!(storage.get("k").await.expect("get"), Some("two".to_string()));

    storage.remove("k").await.expect("remove");
    assert_eq!(storage.get("k").await.expect("get"), None);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("client.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn json_helpers_report_corrupt_values() {
    let store = MemoryStore::new();
    store.set("broken", "{not json").await.expect("set");

    let err = load_json::<Vec<String>>(&store, "broken")
        .await
        .expect_err("corrupt json");
    assert!(err.to_string().contains("broken"));

    save_json(&store, "list", &["a", "b"]).await.expect("save");
    let list: Option<Vec<String>> = load_json(&store, "list").await.expect("load");
    assert_eq!(list, Some(vec!["a".to_string(), "b".to_string()]));
}

#[tokio::test]
async fn drafts_are_prepended_and_scoped_per_user() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");
    let alice_drafts = DraftStore::for_user(Arc::clone(&store), Some(&alice));
    let bob_drafts = DraftStore::for_user(Arc::clone(&store), Some(&bob));

    let first = alice_drafts
        .save("  First  ", " body ", at_millis(1_000))
        .await
        .expect("save")
        .expect("draft");
    let second = alice_drafts
        .save("Second", "more", at_millis(2_000))
        .await
        .expect("save")
        .expect("draft");

    assert_eq!(first.title, "First");
    assert_eq!(first.description, "body");
    assert_eq!(first.id, "1000");

    let listed = alice_drafts.list().await.expect("list");
    assert_eq!(listed, vec![second.clone(), first.clone()]);
    assert!(bob_drafts.list().await.expect("bob list").is_empty());
    assert_eq!(alice_drafts.key(), "dashboard:drafts:alice");
}

#[tokio::test]
async fn blank_drafts_are_not_saved() {
    let store = Arc::new(MemoryStore::new());
    let drafts = DraftStore::for_user(store.clone(), None);

    let saved = drafts.save("   ", "body", at_millis(1)).await.expect("save");
    assert!(saved.is_none());
    let saved = drafts.save("title", "\n\t", at_millis(1)).await.expect("save");
    assert!(saved.is_none());
    assert!(store.is_empty().await);
    assert_eq!(drafts.key(), "dashboard:drafts:guest");
}

#[tokio::test]
async fn drafts_saved_in_the_same_millisecond_get_distinct_ids() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let drafts = DraftStore::for_user(store, None);

    let a = drafts.save("a", "a", at_millis(5)).await.expect("save").expect("a");
    let b = drafts.save("b", "b", at_millis(5)).await.expect("save").expect("b");
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn deleting_and_resuming_drafts() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let drafts = DraftStore::for_user(store, Some(&UserId::from("u1")));
    let keep = drafts.save("keep", "k", at_millis(10)).await.expect("save").expect("keep");
    let drop_me = drafts.save("drop", "d", at_millis(20)).await.expect("save").expect("drop");

    let remaining = drafts.delete(&drop_me.id).await.expect("delete");
    assert_eq!(remaining, vec![keep.clone()]);
    assert_eq!(drafts.get(&keep.id).await.expect("get"), Some(keep));
    assert_eq!(drafts.get(&drop_me.id).await.expect("get"), None);
}

#[tokio::test]
async fn unreadable_draft_list_is_treated_as_empty() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(&drafts_key(None), "not-json")
        .await
        .expect("seed");
    let drafts = DraftStore::for_user(store, None);

    assert!(drafts.list().await.expect("list").is_empty());
    drafts.save("t", "d", at_millis(1)).await.expect("save").expect("draft");
    assert_eq!(drafts.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn identity_round_trips_and_clears() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let identity = IdentityStore::new(Arc::clone(&store));
    assert_eq!(identity.load().await.expect("load"), None);

    let alice = Identity {
        user_id: UserId::from("u1"),
        user_name: "alice".into(),
        user_email: "a@example.com".into(),
    };
    identity.save(&alice).await.expect("save");
    assert_eq!(identity.load().await.expect("load"), Some(alice.clone()));

    identity
        .update_display("Alice L", "alice@example.com")
        .await
        .expect("update");
    let updated = identity.load().await.expect("load").expect("identity");
    assert_eq!(updated.user_id, alice.user_id);
    assert_eq!(updated.user_name, "Alice L");

    identity.clear().await.expect("clear");
    assert_eq!(identity.user_id().await.expect("user id"), None);
}
