//! Per-user session storage.
//!
//! The dialogue engine never touches a global map; it receives a
//! [`SessionStore`] so the in-memory implementation can later be swapped for
//! a durable one without touching dialogue logic.

use std::collections::HashMap;

use parking_lot::RwLock;
use teloxide::types::ChatId;

use crate::dialogue::Session;

/// Storage contract for conversation records, keyed by chat id.
///
/// Implementations must be safe to share across the dispatcher's tasks.
pub trait SessionStore: Send + Sync {
    fn get(&self, chat: ChatId) -> Option<Session>;
    fn put(&self, chat: ChatId, session: Session);
    fn delete(&self, chat: ChatId);
}

/// Lock-protected in-memory store. State is lost on process restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<ChatId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, chat: ChatId) -> Option<Session> {
        self.sessions.read().get(&chat).cloned()
    }

    fn put(&self, chat: ChatId, session: Session) {
        self.sessions.write().insert(chat, session);
    }

    fn delete(&self, chat: ChatId) {
        self.sessions.write().remove(&chat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Step;

    #[test]
    fn sessions_are_keyed_per_chat() {
        let store = InMemorySessionStore::new();
        let alice = ChatId(1);
        let bob = ChatId(2);

        store.put(
            alice,
            Session {
                step: Step::AwaitingSecondPhoto,
                ..Session::default()
            },
        );

        assert_eq!(
            store.get(alice).map(|s| s.step),
            Some(Step::AwaitingSecondPhoto)
        );
        assert!(store.get(bob).is_none());
    }

    #[test]
    fn delete_removes_the_record() {
        let store = InMemorySessionStore::new();
        let chat = ChatId(7);

        store.put(chat, Session::default());
        assert!(store.get(chat).is_some());

        store.delete(chat);
        assert!(store.get(chat).is_none());
    }
}
