//! HTTP API Module
//!
//! This module exposes the file store over HTTP. Each request is handled by its
//! own Tokio task; handlers never touch storage directly, they go through the
//! [`FileService`](crate::service::FileService).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ApiServer                              │
//! │                   (axum::serve)                             │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │   CORS  ──>  Trace  ──>  Timeout  ──>  Router               │
//! │                                          │                  │
//! │        PUT /v1/file ─────────> upload_file                  │
//! │        GET /v1/:path ────────> download_file                │
//! │        GET /health ──────────> health                       │
//! └──────────────────────────────────────────┬──────────────────┘
//!                                            │
//!                                            ▼
//!                                      FileService
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use flashfs::api::{build_router, ApiConfig, ApiServer};
//! use flashfs::service::FileService;
//! use flashfs::storage::StoreEngine;
//! use std::sync::Arc;
//!
//! let store = Arc::new(StoreEngine::default());
//! store.start()?;
//!
//! let service = FileService::new(Arc::clone(&store), "http://localhost:8080/v1/");
//! let router = build_router(service, &ApiConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! ApiServer::new(router, Duration::from_secs(5))
//!     .serve(listener, shutdown_signal())
//!     .await?;
//! ```

pub mod error;
pub mod handler;
pub mod router;
pub mod server;

// Re-export commonly used types
pub use error::ApiError;
pub use handler::{ApiState, HealthResponse, UploadResponse, FILE_FIELD, TTL_HEADER};
pub use router::build_router;
pub use server::ApiServer;

use std::time::Duration;

/// TTL for uploads that carry no valid `File-TTL` header.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// HTTP transport settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// TTL applied when an upload has no valid `File-TTL` header
    pub default_ttl: Duration,
    /// Time after which a request is abandoned
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            request_timeout: Duration::from_secs(30),
        }
    }
}
