//! Events pushed to a client over its SSE stream

use axum::response::sse::Event;
use tracing::warn;

use pawa_mcp::protocol::JsonRpcResponse;

/// SSE event name announcing where to POST messages
pub const ENDPOINT: &str = "endpoint";
/// SSE event name carrying a JSON-RPC message
pub const MESSAGE: &str = "message";

/// What the server can push down a session's stream
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Handshake: the URL (path + query) the client must POST to
    Endpoint(String),
    /// A JSON-RPC response to a routed request
    Message(JsonRpcResponse),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Endpoint(_) => ENDPOINT,
            Self::Message(_) => MESSAGE,
        }
    }

    pub fn into_sse(self) -> Event {
        let name = self.name();
        match self {
            Self::Endpoint(url) => Event::default().event(name).data(url),
            Self::Message(response) => match serde_json::to_string(&response) {
                Ok(json) => Event::default().event(name).data(json),
                Err(e) => {
                    warn!("Failed to encode SSE message: {}", e);
                    Event::default().event("error").data(e.to_string())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(ServerEvent::Endpoint("/messages".to_string()).name(), "endpoint");
        let resp = JsonRpcResponse::success(serde_json::json!(1), serde_json::json!({}));
        assert_eq!(ServerEvent::Message(resp).name(), "message");
    }
}
