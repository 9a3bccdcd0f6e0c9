//! Integration tests for [`storage::SubscriberRepository`].
//!
//! Covers insert-if-absent semantics, idempotent delete, listing, and counting
//! against a temp-file SQLite database.

use bcast_core::Subscriber;
use storage::SubscriberRepository;
use tempfile::TempDir;

async fn repo() -> (SubscriberRepository, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("subscribers.db");
    let repo = SubscriberRepository::new(db.to_str().expect("utf8 path"))
        .await
        .expect("Failed to create repository");
    (repo, dir)
}

fn sample_subscriber(id: i64) -> Subscriber {
    Subscriber::new(
        id,
        Some(format!("user{}", id)),
        Some("Test".to_string()),
        None,
    )
}

/// **Test: Inserting a new subscriber reports true and the record is readable.**
///
/// **Setup:** Fresh DB.
/// **Action:** `insert_if_absent` for a fresh id, then `find`.
/// **Expected:** Insert returns `true`; `find` returns the subscriber with matching fields.
#[tokio::test]
async fn test_insert_new_subscriber() {
    let (repo, _db) = repo().await;

    let inserted = repo
        .insert_if_absent(&sample_subscriber(123))
        .await
        .expect("Failed to insert");
    assert!(inserted);

    let found = repo.find(123).await.expect("Failed to query");
    assert!(found.is_some());
    let sub = found.unwrap();
    assert_eq!(sub.id, 123);
    assert_eq!(sub.username, Some("user123".to_string()));
    assert_eq!(sub.first_name, Some("Test".to_string()));
}

/// **Test: Inserting an existing id reports false and keeps the original record.**
///
/// **Setup:** Subscriber 123 already registered.
/// **Action:** `insert_if_absent` again with different metadata.
/// **Expected:** Returns `false`; the stored username and `subscribed_at` are unchanged.
#[tokio::test]
async fn test_insert_existing_subscriber_is_noop() {
    let (repo, _db) = repo().await;

    let original = sample_subscriber(123);
    assert!(repo.insert_if_absent(&original).await.expect("insert"));

    let mut replacement = sample_subscriber(123);
    replacement.username = Some("someone_else".to_string());
    let inserted = repo
        .insert_if_absent(&replacement)
        .await
        .expect("Failed to insert");
    assert!(!inserted);

    let stored = repo.find(123).await.expect("query").unwrap();
    assert_eq!(stored.username, Some("user123".to_string()));
    assert_eq!(
        stored.subscribed_at.timestamp(),
        original.subscribed_at.timestamp()
    );
}

/// **Test: Delete removes the subscriber and is idempotent.**
///
/// **Setup:** Subscriber 123 registered.
/// **Action:** `delete(123)` twice, then `find(123)`.
/// **Expected:** First delete returns `true`, second returns `false`, `find` returns `None`.
#[tokio::test]
async fn test_delete_is_idempotent() {
    let (repo, _db) = repo().await;
    repo.insert_if_absent(&sample_subscriber(123))
        .await
        .expect("insert");

    assert!(repo.delete(123).await.expect("first delete"));
    assert!(!repo.delete(123).await.expect("second delete"));
    assert!(repo.find(123).await.expect("query").is_none());
}

/// **Test: Deleting an id that was never registered reports false.**
///
/// **Setup:** Empty fresh DB.
/// **Action:** `delete(999)`.
/// **Expected:** Returns `false` without error.
#[tokio::test]
async fn test_delete_missing_subscriber() {
    let (repo, _db) = repo().await;
    assert!(!repo.delete(999).await.expect("delete"));
}

/// **Test: Listing and counting cover all registered subscribers.**
///
/// **Setup:** Subscribers 1, 2, 3 registered.
/// **Action:** `all_ids()` and `total()`.
/// **Expected:** Three ids, containing each registered id; count is 3.
#[tokio::test]
async fn test_all_ids_and_total() {
    let (repo, _db) = repo().await;
    for id in [1, 2, 3] {
        repo.insert_if_absent(&sample_subscriber(id))
            .await
            .expect("insert");
    }

    let ids = repo.all_ids().await.expect("list");
    assert_eq!(ids.len(), 3);
    for id in [1, 2, 3] {
        assert!(ids.contains(&id));
    }

    assert_eq!(repo.total().await.expect("count"), 3);
}
