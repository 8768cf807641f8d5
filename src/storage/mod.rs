//! Storage Engine Module
//!
//! This module provides the core storage functionality for FlashFS: an
//! in-memory object store where every object carries a time-to-live.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       StoreEngine                           │
//! │                                                             │
//! │   write / read / len ──> bounded inbox ──> Command Loop     │
//! │                                              │              │
//! │                                              ▼              │
//! │                                         ObjectMap           │
//! │                                    (owned by the loop)      │
//! │                                              ▲              │
//! │                              sweep tick ─────┘              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Single Owner**: One Tokio task is the only mutator of the object map
//! - **Ordered Hand-off**: Requests are applied in the order the inbox accepts them
//! - **Lazy Expiry**: Expired objects are evicted when a read finds them
//! - **Active Expiry**: A periodic sweep evicts objects nobody reads again
//! - **Explicit Shutdown**: Requests after `stop()` fail instead of blocking
//!
//! ## Example
//!
//! ```
//! use flashfs::storage::{StoreConfig, StoreEngine};
//! use bytes::Bytes;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), flashfs::storage::StoreError> {
//! let engine = Arc::new(StoreEngine::new(StoreConfig {
//!     sweep_interval: Duration::from_millis(500),
//!     ..Default::default()
//! }));
//! engine.start()?;
//!
//! engine
//!     .write("photo.png", Bytes::from_static(b"\x89PNG"), Duration::from_secs(60))
//!     .await?;
//! let payload = engine.read("photo.png").await?;
//! assert_eq!(&payload[..], b"\x89PNG");
//!
//! engine.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod object;

// Re-export commonly used types
pub use engine::{EngineState, StoreConfig, StoreEngine, StoreError, StoreResult, StoreStats};
pub use object::{Lookup, ObjectMap, StoredObject};
