mod common;

use std::collections::HashSet;
use std::sync::Arc;

use board_core::BoardError;
use board_core::board::{CounterMode, Deletion, NormalizedBoard, POSTS_COLLECTION};
use board_core::domain::SortOrder;
use board_core::ports::{DocumentStore, FieldValue, Fields};
use board_infra::InMemoryDocumentStore;

use common::{InterleavingStore, OfflineStore};

fn board_over(store: Arc<dyn DocumentStore>) -> NormalizedBoard {
    let (_, identity, moderation) = common::profile();
    NormalizedBoard::new(store, identity, moderation)
}

fn board() -> NormalizedBoard {
    board_over(Arc::new(InMemoryDocumentStore::new()))
}

async fn admin_board() -> NormalizedBoard {
    let board = board();
    board.moderation().set_admin(true).await.unwrap();
    board
}

#[tokio::test]
async fn test_create_then_load_by_id() {
    let board = board();
    let user = board.identity().current_user().await;

    let id = board.create_post("Q1", "A1").await.unwrap();
    let post = board.load_post_by_id(&id).await.unwrap();

    assert_eq!(post.id, id);
    assert_eq!(post.question, "Q1");
    assert_eq!(post.answer, "A1");
    assert_eq!(post.user, user.as_str());
    assert_eq!(post.reply_count, 0);
}

#[tokio::test]
async fn test_post_reply_scenario() {
    let board = board();

    let post_id = board.create_post("Q1", "A1").await.unwrap();
    board.add_reply(&post_id, "nice").await.unwrap();

    let replies = board.load_replies(&post_id).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, "nice");
    assert_eq!(replies[0].post_id, post_id);

    let post = board.load_post_by_id(&post_id).await.unwrap();
    assert_eq!(post.reply_count, 1);
}

#[tokio::test]
async fn test_replies_are_filtered_and_oldest_first() {
    let board = board();
    let first = board.create_post("Q1", "A1").await.unwrap();
    let second = board.create_post("Q2", "A2").await.unwrap();

    board.add_reply(&first, "one").await.unwrap();
    board.add_reply(&second, "elsewhere").await.unwrap();
    board.add_reply(&first, "two").await.unwrap();

    let texts: Vec<_> = board
        .load_replies(&first)
        .await
        .into_iter()
        .map(|r| r.text)
        .collect();
    assert_eq!(texts, ["one", "two"]);
    assert!(board.load_replies("unknown").await.is_empty());
}

#[tokio::test]
async fn test_missing_post_is_absent() {
    let board = board();
    assert!(board.load_post_by_id("does-not-exist").await.is_none());
}

#[tokio::test]
async fn test_delete_post_requires_moderation_flag() {
    let board = board();
    let id = board.create_post("Q1", "A1").await.unwrap();

    let outcome = board.delete_post(&id).await.unwrap();

    assert_eq!(outcome, Deletion::NotPermitted);
    assert!(board.load_post_by_id(&id).await.is_some());
}

#[tokio::test]
async fn test_delete_post_cascades_to_its_replies() {
    let board = admin_board().await;
    let doomed = board.create_post("Q1", "A1").await.unwrap();
    let kept = board.create_post("Q2", "A2").await.unwrap();
    board.add_reply(&doomed, "a").await.unwrap();
    board.add_reply(&doomed, "b").await.unwrap();
    board.add_reply(&kept, "c").await.unwrap();

    let outcome = board.delete_post(&doomed).await.unwrap();

    assert_eq!(outcome, Deletion::Deleted);
    assert!(board.load_post_by_id(&doomed).await.is_none());
    assert!(board.load_replies(&doomed).await.is_empty());
    assert_eq!(board.load_replies(&kept).await.len(), 1);
}

#[tokio::test]
async fn test_delete_reply_decrements_count() {
    let board = admin_board().await;
    let post_id = board.create_post("Q1", "A1").await.unwrap();
    let reply_id = board.add_reply(&post_id, "nice").await.unwrap();
    board.add_reply(&post_id, "also nice").await.unwrap();

    let outcome = board.delete_reply(&reply_id, &post_id).await.unwrap();

    assert_eq!(outcome, Deletion::Deleted);
    assert_eq!(board.load_post_by_id(&post_id).await.unwrap().reply_count, 1);
    let texts: Vec<_> = board.load_replies(&post_id).await.into_iter().map(|r| r.text).collect();
    assert_eq!(texts, ["also nice"]);
}

#[tokio::test]
async fn test_delete_reply_refused_without_flag() {
    let board = board();
    let post_id = board.create_post("Q1", "A1").await.unwrap();
    let reply_id = board.add_reply(&post_id, "nice").await.unwrap();

    let outcome = board.delete_reply(&reply_id, &post_id).await.unwrap();

    assert_eq!(outcome, Deletion::NotPermitted);
    assert_eq!(board.load_replies(&post_id).await.len(), 1);
    assert_eq!(board.load_post_by_id(&post_id).await.unwrap().reply_count, 1);
}

#[tokio::test]
async fn test_reply_count_never_goes_negative() {
    for mode in [CounterMode::ReadModifyWrite, CounterMode::Atomic] {
        let store = Arc::new(InMemoryDocumentStore::new());
        let board = board_over(store.clone()).with_counter_mode(mode);
        board.moderation().set_admin(true).await.unwrap();

        let post_id = board.create_post("Q1", "A1").await.unwrap();
        let reply_id = board.add_reply(&post_id, "nice").await.unwrap();

        // Simulate a counter that already drifted low.
        let reset = Fields::from([("replyCount".to_string(), FieldValue::value(0))]);
        store.update(POSTS_COLLECTION, &post_id, reset).await.unwrap();

        let _ = board.delete_reply(&reply_id, &post_id).await.unwrap();
        assert_eq!(
            board.load_post_by_id(&post_id).await.unwrap().reply_count,
            0,
            "mode {mode:?}"
        );
    }
}

#[tokio::test]
async fn test_reply_to_missing_post_skips_counter() {
    let board = board();
    let reply_id = board.add_reply("ghost", "hello").await.unwrap();

    assert!(!reply_id.is_empty());
    assert_eq!(board.load_replies("ghost").await.len(), 1);
    assert!(board.load_post_by_id("ghost").await.is_none());
}

#[tokio::test]
async fn test_sort_orders() {
    let board = board();
    let quiet = board.create_post("Q1", "A1").await.unwrap();
    let busy = board.create_post("Q2", "A2").await.unwrap();
    let medium = board.create_post("Q3", "A3").await.unwrap();
    for _ in 0..3 {
        board.add_reply(&busy, "r").await.unwrap();
    }
    board.add_reply(&medium, "r").await.unwrap();

    let newest = board.load_posts(SortOrder::Newest).await;
    assert!(newest.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let most = board.load_posts(SortOrder::Most).await;
    let ids: Vec<_> = most.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, [busy.as_str(), medium.as_str(), quiet.as_str()]);
    assert!(most.windows(2).all(|w| w[0].reply_count >= w[1].reply_count));

    let random = board.load_posts(SortOrder::Random).await;
    let random_ids: HashSet<_> = random.into_iter().map(|p| p.id).collect();
    let newest_ids: HashSet<_> = newest.into_iter().map(|p| p.id).collect();
    assert_eq!(random_ids, newest_ids);
}

#[tokio::test]
async fn test_reads_degrade_and_writes_fail_when_offline() {
    let board = board_over(Arc::new(OfflineStore));

    assert!(board.load_posts(SortOrder::Newest).await.is_empty());
    assert!(board.load_post_by_id("any").await.is_none());
    assert!(board.load_replies("any").await.is_empty());

    assert!(matches!(board.create_post("Q", "A").await, Err(BoardError::Store(_))));
    assert!(matches!(board.add_reply("any", "text").await, Err(BoardError::Store(_))));
}

#[tokio::test]
async fn test_offline_delete_without_flag_never_reaches_store() {
    let board = board_over(Arc::new(OfflineStore));
    assert_eq!(board.delete_post("any").await.unwrap(), Deletion::NotPermitted);

    board.moderation().set_admin(true).await.unwrap();
    assert!(board.delete_post("any").await.is_err());
}

#[tokio::test]
async fn test_concurrent_replies_lose_increments() {
    let board = board_over(Arc::new(InterleavingStore::default()));
    let post_id = board.create_post("Q1", "A1").await.unwrap();

    let (a, b) = tokio::join!(
        board.add_reply(&post_id, "first"),
        board.add_reply(&post_id, "second")
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(board.load_replies(&post_id).await.len(), 2);
    assert_eq!(board.load_post_by_id(&post_id).await.unwrap().reply_count, 1);
}

#[tokio::test]
async fn test_atomic_counter_keeps_concurrent_increments() {
    let board = board_over(Arc::new(InterleavingStore::default()))
        .with_counter_mode(CounterMode::Atomic);
    let post_id = board.create_post("Q1", "A1").await.unwrap();

    let (a, b) = tokio::join!(
        board.add_reply(&post_id, "first"),
        board.add_reply(&post_id, "second")
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(board.load_post_by_id(&post_id).await.unwrap().reply_count, 2);
}

#[tokio::test]
async fn test_null_count_and_timestamp_still_load() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let board = board_over(store.clone());
    let post_id = board.create_post("Q1", "A1").await.unwrap();

    let nulls = Fields::from([
        ("replyCount".to_string(), FieldValue::value(serde_json::Value::Null)),
        ("timestamp".to_string(), FieldValue::value(serde_json::Value::Null)),
    ]);
    store.update(POSTS_COLLECTION, &post_id, nulls).await.unwrap();

    let post = board.load_post_by_id(&post_id).await.unwrap();
    assert_eq!(post.reply_count, 0);
    assert_eq!(post.question, "Q1");

    assert_eq!(board.load_posts(SortOrder::Newest).await.len(), 1);
    assert_eq!(board.load_posts(SortOrder::Most).await.len(), 1);

    board.add_reply(&post_id, "first").await.unwrap();
    assert_eq!(board.load_post_by_id(&post_id).await.unwrap().reply_count, 1);
}
