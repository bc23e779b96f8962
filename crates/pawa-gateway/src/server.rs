//! HTTP surface of the SSE transport
//!
//! - `GET /sse?key=...` opens a session and streams events back
//! - `POST /messages?sessionId=...` hands a JSON-RPC message to that session
//! - `GET /` reports server name, version and live session count

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use pawa_core::Credential;
use pawa_mcp::McpHandler;
use pawa_mcp::protocol::ServerInfo;

use crate::events::ServerEvent;
use crate::lifecycle::SessionLifecycle;
use crate::router::RequestRouter;
use crate::session::ConnectionHandle;

/// Path clients POST their messages to
pub const MESSAGES_PATH: &str = "/messages";

/// Per-session event buffer; routed responses wait here for the stream
const EVENT_BUFFER: usize = 32;

/// A client that vanishes without closing its socket is only noticed on the
/// next write, so its session lingers for at most this long.
const KEEP_ALIVE: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct AppState {
    lifecycle: SessionLifecycle,
    router: RequestRouter,
    info: ServerInfo,
    shutdown: CancellationToken,
}

#[derive(Debug, Deserialize)]
struct ConnectParams {
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageParams {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// SSE gateway serving one MCP handler to many clients
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    /// `default_credential` applies to sessions that connect without `?key=`.
    pub fn new(
        handler: Arc<McpHandler>,
        default_credential: Option<Credential>,
        shutdown: CancellationToken,
    ) -> Self {
        let info = handler.server_info().clone();
        let lifecycle = SessionLifecycle::default();
        let router = RequestRouter::new(lifecycle.registry().clone(), handler, default_credential);
        Self {
            state: AppState {
                lifecycle,
                router,
                info,
                shutdown,
            },
        }
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.state.lifecycle
    }

    pub fn app(&self) -> Router {
        Router::new()
            .route("/", get(status))
            .route("/sse", get(open_stream))
            .route(MESSAGES_PATH, post(post_message))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind `addr` and serve until the shutdown token fires
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        self.serve_on(listener).await
    }

    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        info!(
            "MCP server '{}' listening on http://{}/sse",
            self.state.info.name, local
        );
        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .context("SSE server failed")?;
        info!("MCP SSE server stopped");
        Ok(())
    }
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.info.name,
        "version": state.info.version,
        "sessions": state.lifecycle.registry().len(),
    }))
}

async fn open_stream(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> Response {
    let (handle, rx) = ConnectionHandle::channel(EVENT_BUFFER);
    let credential = Credential::from_optional(params.key);

    let guard = match state.lifecycle.open(handle, credential) {
        Ok(guard) => guard,
        Err(e) => {
            error!("Failed to open session: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let endpoint = format!("{}?sessionId={}", MESSAGES_PATH, guard.session_id());
    let first = stream::once(async move { ServerEvent::Endpoint(endpoint) });

    // The guard rides along with the receiver: when the client disconnects
    // or shutdown ends the stream, dropping it closes the session.
    let rest = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        rx.recv().await.map(|event| (event, (rx, guard)))
    });

    let events = first
        .chain(rest)
        .map(|event| Ok::<Event, Infallible>(event.into_sse()))
        .take_until(state.shutdown.cancelled_owned());

    sse_response(events)
}

fn sse_response<S>(events: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE))
        .into_response()
}

async fn post_message(
    State(state): State<AppState>,
    Query(params): Query<MessageParams>,
    body: Bytes,
) -> Response {
    let session_id = params.session_id.unwrap_or_default();
    match state.router.route(&session_id, &body) {
        Ok(_dispatched) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => {
            warn!(session_id = %session_id, "{}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}
