//! Session registry: one record per open SSE stream
//!
//! A record holds the handle used to push events to the client and the
//! credential the client supplied when it connected, if any. Both live in a
//! single entry so they are inserted and purged together.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use pawa_core::Credential;

use crate::events::ServerEvent;

/// Opaque identifier of one streaming connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The stream's receiving half is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionClosed;

/// Write side of a client's SSE stream
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { tx }
    }

    /// Create a handle plus the receiver the stream drains
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    pub async fn send(&self, event: ServerEvent) -> Result<(), ConnectionClosed> {
        self.tx.send(event).await.map_err(|_| ConnectionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Everything the router needs to know about a live session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub handle: ConnectionHandle,
    pub credential: Option<Credential>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} already exists")]
    DuplicateSession(SessionId),
}

/// Process-wide map of live sessions
///
/// Reads are open to anyone; inserts and removals are reserved to the
/// lifecycle manager.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionId, SessionRecord>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record; an existing id is never overwritten
    pub(crate) fn insert(&self, id: SessionId, record: SessionRecord) -> Result<(), SessionError> {
        match self.sessions.entry(id) {
            Entry::Occupied(_) => Err(SessionError::DuplicateSession(id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionRecord> {
        self.sessions.get(id).map(|r| r.value().clone())
    }

    pub(crate) fn remove(&self, id: &SessionId) -> Option<SessionRecord> {
        self.sessions.remove(id).map(|(_, record)| record)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of live ids, for status reporting
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|e| *e.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(credential: Option<&str>) -> (SessionRecord, mpsc::Receiver<ServerEvent>) {
        let (handle, rx) = ConnectionHandle::channel(4);
        let record = SessionRecord {
            handle,
            credential: credential.map(Credential::new),
        };
        (record, rx)
    }

    #[test]
    fn test_session_id_roundtrip_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_insert_get_remove() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let (rec, _rx) = record(Some("abc"));

        registry.insert(id, rec).unwrap();
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);
        let found = registry.get(&id).unwrap();
        assert_eq!(found.credential.unwrap().expose(), "abc");

        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();
        let (first, _rx1) = record(Some("first"));
        let (second, _rx2) = record(Some("second"));

        registry.insert(id, first).unwrap();
        let err = registry.insert(id, second).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateSession(dup) if dup == id));

        let kept = registry.get(&id).unwrap();
        assert_eq!(kept.credential.unwrap().expose(), "first");
    }

    #[tokio::test]
    async fn test_handle_send_after_receiver_dropped() {
        let (handle, rx) = ConnectionHandle::channel(1);
        drop(rx);
        assert!(handle.is_closed());
        let result = handle
            .send(ServerEvent::Endpoint("/messages".to_string()))
            .await;
        assert_eq!(result, Err(ConnectionClosed));
    }
}
