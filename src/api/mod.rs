//! HTTP API
//!
//! | Method | Path       | Description                                   |
//! |--------|------------|-----------------------------------------------|
//! | GET    | `/status`  | Sync record and loaded collection ids         |
//! | GET    | `/search`  | `q` and optional comma-separated `searchProperty` |
//! | POST   | `/refresh` | Schedule a background rebuild                 |
//! | GET    | `/health`  | Liveness                                      |
//! | GET    | `/metrics` | Prometheus exposition                         |
//!
//! `/status` and `/search` honour `If-Modified-Since` against the active
//! snapshot's build stamp.

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::ApiError;
pub use router::{create_router, AppState};
pub use types::*;
