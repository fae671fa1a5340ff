//! CLIR Server - HTTP REST API for cross-lingual retrieval
//!
//! Wraps [`clir::SearchPipeline`] in an axum router:
//!
//! - `POST /api/search` - body `{"query": "...", "top_k"?: 5, "target_lang"?: "hi"}`,
//!   answers with a JSON array of results sorted by `relevance_score`
//! - `GET /` - API information
//! - `GET /health` - liveness probe
//! - `GET /ready` - readiness probe with the active pipeline setup
//! - `GET /metrics` - Prometheus text, when enabled
//!
//! Errors use `{"error": {"code": "...", "message": "..."}}`. Every response
//! carries `x-request-id`; search responses also carry `x-clir-warnings`.
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use routes::search::SearchRequest;
pub use server::{build_router, start_server};
pub use state::ServerState;
