use std::sync::Arc;

use progeny::dialogue::{Session, Step};
use progeny::session::{InMemorySessionStore, SessionStore};
use teloxide::types::ChatId;

#[test]
fn put_overwrites_the_previous_record() {
    let store = InMemorySessionStore::new();
    let chat = ChatId(42);

    store.put(chat, Session::default());
    store.put(
        chat,
        Session {
            step: Step::AwaitingChildCount,
            ..Session::default()
        },
    );

    assert_eq!(
        store.get(chat).map(|s| s.step),
        Some(Step::AwaitingChildCount)
    );
}

#[test]
fn records_are_isolated_between_chats() {
    let store = InMemorySessionStore::new();

    store.put(
        ChatId(1),
        Session {
            child_count: Some(2),
            ..Session::default()
        },
    );
    store.put(
        ChatId(2),
        Session {
            child_count: Some(3),
            ..Session::default()
        },
    );

    assert_eq!(store.get(ChatId(1)).and_then(|s| s.child_count), Some(2));
    assert_eq!(store.get(ChatId(2)).and_then(|s| s.child_count), Some(3));

    store.delete(ChatId(1));
    assert!(store.get(ChatId(1)).is_none());
    assert!(store.get(ChatId(2)).is_some());
}

#[tokio::test]
async fn concurrent_mutation_of_distinct_chats_is_safe() {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let mut handles = Vec::new();
    for chat in 0..16i64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for round in 0..50u8 {
                store.put(
                    ChatId(chat),
                    Session {
                        ages: vec![round],
                        ..Session::default()
                    },
                );
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for chat in 0..16i64 {
        assert_eq!(
            store.get(ChatId(chat)).map(|s| s.ages),
            Some(vec![49]),
            "chat {chat} lost its final write"
        );
    }
}
