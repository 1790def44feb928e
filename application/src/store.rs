//! Session store
//!
//! Keeps every live session behind its own [`SessionHandle`]. There is no
//! global registry: the orchestrator owns a store and passes handles around.

use crate::config::WriteContention;
use council_domain::{Session, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One session plus its locking discipline.
///
/// Mutating operations hold the write permit from validation to commit,
/// which serialises them. The state lock is write-locked only for the
/// in-memory mutation, so readers are never blocked by an external call.
pub struct SessionHandle {
    id: SessionId,
    permit: Mutex<()>,
    state: RwLock<Session>,
}

/// Proof that the caller is the only writer of a session
pub struct WritePermit<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            id: session.id().clone(),
            permit: Mutex::new(()),
            state: RwLock::new(session),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Acquire the write permit; `None` when rejecting and another write is
    /// in flight.
    pub async fn begin_write(&self, contention: WriteContention) -> Option<WritePermit<'_>> {
        let guard = match contention {
            WriteContention::Queue => self.permit.lock().await,
            WriteContention::Reject => self.permit.try_lock().ok()?,
        };
        Some(WritePermit { _guard: guard })
    }

    /// Consistent view of the session
    pub async fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().await
    }

    /// Exclusive access for the in-memory part of a write
    pub async fn write(&self, _permit: &WritePermit<'_>) -> RwLockWriteGuard<'_, Session> {
        self.state.write().await
    }
}

/// Keyed collection of live sessions
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session; returns `false` if the id is taken
    pub async fn insert(&self, session: Session) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.id()) {
            return false;
        }
        sessions.insert(session.id().clone(), Arc::new(SessionHandle::new(session)));
        true
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session from the store. In-flight operations holding its
    /// handle finish against the detached session.
    pub async fn dispose(&self, id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.write().await.remove(id)
    }

    pub async fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ParticipantSpec;

    fn session(id: &str) -> Session {
        Session::convene(
            SessionId::new(id),
            "Title",
            "Topic",
            vec![],
            vec![ParticipantSpec::new("a")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_dispose() {
        let store = SessionStore::new();
        assert!(store.insert(session("s1")).await);
        assert!(!store.insert(session("s1")).await);
        assert!(store.insert(session("s2")).await);
        assert_eq!(store.ids().await, vec![SessionId::new("s1"), SessionId::new("s2")]);

        let handle = store.get(&SessionId::new("s1")).await.unwrap();
        assert_eq!(handle.read().await.title(), "Title");

        assert!(store.dispose(&SessionId::new("s1")).await.is_some());
        assert!(store.get(&SessionId::new("s1")).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_reject_contention_fails_fast() {
        let handle = SessionHandle::new(session("s"));
        let held = handle.begin_write(WriteContention::Queue).await;
        assert!(held.is_some());
        assert!(handle.begin_write(WriteContention::Reject).await.is_none());
        drop(held);
        assert!(handle.begin_write(WriteContention::Reject).await.is_some());
    }

    #[tokio::test]
    async fn test_readers_not_blocked_by_permit() {
        let handle = SessionHandle::new(session("s"));
        let _permit = handle.begin_write(WriteContention::Queue).await.unwrap();
        // The permit alone does not lock the state
        assert_eq!(handle.read().await.transcript().len(), 0);
    }
}
