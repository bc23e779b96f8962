//! Connection lifecycle: mint a session on open, purge it on close

use tracing::{debug, info};

use pawa_core::Credential;

use crate::session::{ConnectionHandle, SessionError, SessionId, SessionRecord, SessionRegistry};

/// Sole writer of the session registry
#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    registry: SessionRegistry,
    mint: fn() -> SessionId,
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new(SessionRegistry::default())
    }
}

impl SessionLifecycle {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            registry,
            mint: SessionId::new,
        }
    }

    /// Same registry, custom id source
    #[cfg(test)]
    pub(crate) fn with_mint(mut self, mint: fn() -> SessionId) -> Self {
        self.mint = mint;
        self
    }

    /// Read-only view shared with the router
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Register a freshly opened connection under a new id.
    ///
    /// The record is visible to readers before this returns, so the id can be
    /// handed to the client right after. Dropping the returned guard closes
    /// the session.
    pub fn open(
        &self,
        handle: ConnectionHandle,
        credential: Option<Credential>,
    ) -> Result<SessionGuard, SessionError> {
        self.open_with_id((self.mint)(), handle, credential)
    }

    pub(crate) fn open_with_id(
        &self,
        id: SessionId,
        handle: ConnectionHandle,
        credential: Option<Credential>,
    ) -> Result<SessionGuard, SessionError> {
        let has_credential = credential.is_some();
        self.registry
            .insert(id, SessionRecord { handle, credential })?;
        info!(
            session_id = %id,
            has_credential,
            active = self.registry.len(),
            "Session opened"
        );
        Ok(SessionGuard {
            id,
            lifecycle: self.clone(),
        })
    }

    /// Remove a session. Returns `false` if it was already gone.
    pub fn close(&self, id: &SessionId) -> bool {
        match self.registry.remove(id) {
            Some(_) => {
                info!(
                    session_id = %id,
                    active = self.registry.len(),
                    "Session closed"
                );
                true
            }
            None => {
                debug!(session_id = %id, "Session already closed");
                false
            }
        }
    }
}

/// Keeps a session registered for as long as it is alive
#[derive(Debug)]
pub struct SessionGuard {
    id: SessionId,
    lifecycle: SessionLifecycle,
}

impl SessionGuard {
    pub fn session_id(&self) -> SessionId {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.lifecycle.close(&self.id);
    }
}
