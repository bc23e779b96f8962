//! Request routing: side-channel POST → live session → handler → stream
//!
//! `route` answers synchronously: either the request has been dispatched to
//! a task, or it fails with a [`RouteError`] before any downstream work
//! starts. The handler's result is written back on the session's stream when
//! it arrives, or dropped if the stream has gone away in the meantime.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use pawa_core::Credential;
use pawa_mcp::McpHandler;
use pawa_mcp::protocol::{JsonRpcRequest, JsonRpcResponse};

use crate::events::ServerEvent;
use crate::session::{SessionId, SessionRegistry};

/// Whatever turns a request plus a resolved credential into a response
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(
        &self,
        request: JsonRpcRequest,
        credential: Option<Credential>,
    ) -> Option<JsonRpcResponse>;
}

#[async_trait]
impl MessageHandler for McpHandler {
    async fn handle(
        &self,
        request: JsonRpcRequest,
        credential: Option<Credential>,
    ) -> Option<JsonRpcResponse> {
        self.handle_request(request, credential.as_ref()).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Unknown, already closed, or malformed session id
    #[error("No transport found for sessionId")]
    NoSuchSession(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(#[source] serde_json::Error),
}

#[derive(Clone)]
pub struct RequestRouter {
    registry: SessionRegistry,
    handler: Arc<dyn MessageHandler>,
    default_credential: Option<Credential>,
}

impl RequestRouter {
    pub fn new(
        registry: SessionRegistry,
        handler: Arc<dyn MessageHandler>,
        default_credential: Option<Credential>,
    ) -> Self {
        Self {
            registry,
            handler,
            default_credential,
        }
    }

    /// Session credential if one was supplied on connect, else the default
    fn resolve_credential(&self, session: Option<Credential>) -> Option<Credential> {
        session.or_else(|| self.default_credential.clone())
    }

    /// Dispatch `body` on behalf of `session_id`.
    ///
    /// The session is confirmed live before the body is even parsed, so a
    /// stale id never reaches the handler.
    pub fn route(&self, session_id: &str, body: &[u8]) -> Result<JoinHandle<()>, RouteError> {
        let record = session_id
            .parse::<SessionId>()
            .ok()
            .and_then(|id| self.registry.get(&id).map(|record| (id, record)));
        let Some((id, record)) = record else {
            debug!(session_id, "Routing miss");
            return Err(RouteError::NoSuchSession(session_id.to_string()));
        };

        let request: JsonRpcRequest =
            serde_json::from_slice(body).map_err(RouteError::InvalidMessage)?;
        let credential = self.resolve_credential(record.credential);
        debug!(
            session_id = %id,
            method = %request.method,
            has_credential = credential.is_some(),
            "Routing request"
        );

        let handler = Arc::clone(&self.handler);
        let handle = record.handle;
        Ok(tokio::spawn(async move {
            let Some(response) = handler.handle(request, credential).await else {
                return;
            };
            if handle.send(ServerEvent::Message(response)).await.is_err() {
                debug!(session_id = %id, "Session closed before response; discarding");
            }
        }))
    }
}

impl std::fmt::Debug for RequestRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRouter")
            .field("sessions", &self.registry.len())
            .field("has_default_credential", &self.default_credential.is_some())
            .finish()
    }
}
