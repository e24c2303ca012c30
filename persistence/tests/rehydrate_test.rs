//! Rehydration against real and in-memory storage

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can unwrap

use serde::{Deserialize, Serialize};
use taskdeck_core::persist::{Persist, Storage};
use taskdeck_macros::Persist;
use taskdeck_persistence::{rehydrate, FileStorage, PersistenceObserver, Rehydration};
use taskdeck_testing::InMemoryStorage;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Card {
    id: String,
    title: String,
}

#[derive(Persist, Clone, Debug, Default, PartialEq)]
#[persist(key = "board")]
struct BoardState {
    #[persist]
    cards: Vec<Card>,
    selected: Option<usize>,
}

#[derive(Clone, Debug, Default)]
struct Screen {
    board: BoardState,
}

fn two_cards() -> Vec<Card> {
    vec![
        Card {
            id: "1".to_string(),
            title: "first".to_string(),
        },
        Card {
            id: "2".to_string(),
            title: "second".to_string(),
        },
    ]
}

#[tokio::test]
async fn test_round_trip_through_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    let observer = PersistenceObserver::builder()
        .slice(|s: &Screen| &s.board)
        .spawn(storage.clone());
    observer.record(&Screen {
        board: BoardState {
            cards: two_cards(),
            selected: Some(1),
        },
    });
    observer.shutdown().await;

    let mut restored = BoardState::default();
    assert_eq!(rehydrate(&storage, &mut restored).await, Rehydration::Restored);
    assert_eq!(restored.cards, two_cards());
    assert_eq!(restored.selected, None, "transient fields are not persisted");
}

#[tokio::test]
async fn test_missing_record_keeps_defaults() {
    let storage = InMemoryStorage::new();
    let mut state = BoardState::default();

    assert_eq!(rehydrate(&storage, &mut state).await, Rehydration::Missing);
    assert_eq!(state, BoardState::default());
}

#[tokio::test]
async fn test_corrupt_record_keeps_defaults() {
    let storage = InMemoryStorage::new();
    storage.insert("board", "{not json");
    let mut state = BoardState::default();

    let outcome = rehydrate(&storage, &mut state).await;
    assert!(matches!(outcome, Rehydration::Failed(_)));
    assert_eq!(state, BoardState::default());
}

#[tokio::test]
async fn test_wrong_shape_keeps_defaults() {
    let storage = InMemoryStorage::new();
    storage.insert("board", r#"{"cards": {"id": "1"}}"#);
    let mut state = BoardState::default();

    assert!(!rehydrate(&storage, &mut state).await.is_restored());
    assert!(state.cards.is_empty());
}

#[tokio::test]
async fn test_read_failure_keeps_defaults() {
    let storage = InMemoryStorage::new();
    storage
        .save(BoardState::KEY, br#"{"cards": []}"#)
        .await
        .unwrap();
    storage.fail_loads(true);
    let mut state = BoardState::default();

    assert!(matches!(
        rehydrate(&storage, &mut state).await,
        Rehydration::Failed(reason) if reason.contains("injected")
    ));
}
