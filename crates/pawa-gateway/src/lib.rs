//! pawa-gateway: MCP over Server-Sent Events
//!
//! Every `GET /sse` opens a session; every `POST /messages?sessionId=...` is
//! routed to the live session it names. Responses travel back on the stream.

pub mod events;
pub mod lifecycle;
pub mod router;
pub mod server;
pub mod session;

pub use lifecycle::{SessionGuard, SessionLifecycle};
pub use router::{MessageHandler, RequestRouter, RouteError};
pub use server::GatewayServer;
pub use session::{ConnectionHandle, SessionError, SessionId, SessionRecord, SessionRegistry};
