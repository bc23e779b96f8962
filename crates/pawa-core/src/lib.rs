//! pawa-core: configuration, downstream REST clients and the tool catalog
//!
//! Everything that talks to pawaPay or LettsCore lives here. The MCP and
//! transport crates only see the [`Catalog`] and a resolved [`Credential`].

pub mod catalog;
pub mod config;
pub mod credential;
pub mod error;
mod http;
pub mod lettscore;
pub mod pawapay;
pub mod prompts;
pub mod resources;
pub mod tools;

pub use catalog::Catalog;
pub use config::Config;
pub use credential::Credential;
pub use error::{CatalogError, ConfigError, DownstreamError};
