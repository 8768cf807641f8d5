//! # FlashFS - An Ephemeral In-Memory File Store
//!
//! FlashFS keeps uploaded files in memory for a limited time. Every file is
//! stored with a time-to-live; once it expires it can no longer be downloaded
//! and its memory is reclaimed.
//!
//! ## Features
//!
//! - **Single-Owner Store**: One task owns all objects; callers talk to it by message
//! - **TTL Support**: Every object expires, with lazy and active eviction
//! - **Explicit Lifecycle**: Start, stop, and no requests hanging past shutdown
//! - **HTTP API**: Multipart upload, attachment download, health check
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              FlashFS                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ HTTP Server │───>│   Router    │───>│ FileService │                  │
//! │  │ (axum)      │    │ + handlers  │    │ + KeyGen    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                     ┌──────────────────────────────────────────────┐    │
//! │                     │                StoreEngine                   │    │
//! │                     │   inbox ──> Command Loop ──> ObjectMap       │    │
//! │                     │                  ▲                           │    │
//! │                     │            sweep tick                        │    │
//! │                     └──────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use flashfs::api::{build_router, ApiConfig, ApiServer};
//! use flashfs::service::FileService;
//! use flashfs::storage::{StoreConfig, StoreEngine};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Create and start the store engine
//!     let store = Arc::new(StoreEngine::new(StoreConfig::default()));
//!     store.start()?;
//!
//!     // Wire the HTTP API to it
//!     let service = FileService::new(Arc::clone(&store), "http://127.0.0.1:8080/v1/");
//!     let router = build_router(service, &ApiConfig::default());
//!
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     ApiServer::new(router, Duration::from_secs(5))
//!         .serve(listener, async { let _ = tokio::signal::ctrl_c().await; })
//!         .await?;
//!
//!     store.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP API
//!
//! - `PUT /v1/file` with multipart field `file` and optional `File-TTL: <minutes>`
//!   header; answers `{"url": "<base_url><key>"}`
//! - `GET /v1/<key>` returns the file as an attachment, or 404 once expired
//! - `GET /health` reports status and store statistics
//!
//! ## Module Overview
//!
//! - [`storage`]: The single-owner store engine with TTL support
//! - [`service`]: Key generation and upload/download logic
//! - [`api`]: HTTP routes, handlers and server
//! - [`config`]: Command-line and environment configuration
//!
//! ## Design Highlights
//!
//! ### Message Passing Instead of Locks
//!
//! The object map is owned by a single Tokio task. Writes and reads are sent to
//! it through one FIFO inbox, so requests are applied in the order they were
//! accepted and a read that deletes an expired object can never interleave with
//! a concurrent write.
//!
//! ### Lazy + Active Expiry
//!
//! Objects with an elapsed TTL are evicted in two ways:
//! 1. **Lazy**: When a read finds an expired object, it deletes it
//! 2. **Active**: A periodic sweep deletes every expired object
//!
//! Both go through the same eviction routine.

pub mod api;
pub mod config;
pub mod service;
pub mod storage;

// Re-export commonly used types for convenience
pub use api::{build_router, ApiConfig, ApiError, ApiServer};
pub use config::Config;
pub use service::{FileService, KeyGenerator};
pub use storage::{EngineState, StoreConfig, StoreEngine, StoreError, StoreStats};

/// The default port FlashFS listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host FlashFS binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of FlashFS
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
