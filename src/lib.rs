//! Amber - Multi-tier persistence for sharable document snapshots.
//!
//! Amber stores text snapshots (diagram sources, notes, any document that
//! fits in a string) and hands out links for them. Storage is layered:
//! an entry can live in an ephemeral key-value blob, an on-device SQLite
//! database, a remote HTTP endpoint, or any ordered combination of those.
//! The link itself carries an encoded copy of the snapshot, so a share
//! survives even when every tier misses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      ShareService                       │
//! │    create │ update │ load │ delete │ cleanup │ stats    │
//! └─────────────────────────────────────────────────────────┘
//!             │                               │
//!             ▼                               ▼
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │     StorageTier      │        │      ShareCodec      │
//! │  (swappable handle)  │        │  text to URL token   │
//! └──────────────────────┘        └──────────────────────┘
//!             │
//!             ├── EphemeralTier    one JSON blob in a key-value backend
//!             ├── StructuredTier   SQLite database on device
//!             ├── RemoteTier       HTTP CRUD endpoint
//!             └── CompositeTier    ordered fan-out over other tiers
//! ```
//!
//! # Module Organization
//!
//! - [`service`] - Share lifecycle orchestration
//! - [`tier`] - Storage tier contract and the four implementations
//! - [`codec`] - Reversible text to token transform for link payloads
//! - [`link`] - Share link construction and parsing
//! - [`entry`] - The stored snapshot record
//! - [`id`] - Share id generation
//! - [`config`] - Service configuration
//! - [`error`] - Error types
//! - [`metrics`] - Operation counters
//!
//! # Quick start
//!
//! ```
//! use amber_store::ShareService;
//!
//! # fn main() -> amber_store::Result<()> {
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let service = ShareService::new();
//!
//! // Store a snapshot; embed it into the link as a fallback
//! let link = service.create_share("graph TD\n    A --> B", true).await?;
//! let url = service.share_url(&link)?;
//!
//! // Loading goes through storage, or through the link itself on a miss
//! let content = service.load_from_url(url.as_str()).await?;
//! assert_eq!(content.as_deref(), Some("graph TD\n    A --> B"));
//! # Ok(())
//! # })
//! # }
//! ```

// Core types
pub mod config;
pub mod entry;
pub mod error;

// Share identity and links
pub mod codec;
pub mod id;
pub mod link;

// Storage tiers
pub mod tier;

// Service layer
pub mod metrics;
pub mod service;

// Re-exports for convenience
pub use codec::ShareCodec;
pub use config::{CodecAlgorithm, ShareConfig};
pub use entry::{ShareEntry, ShareId};
pub use error::{Error, Result};
pub use id::generate_id;
pub use link::ShareLink;
pub use metrics::{MetricsCollector, ServiceStats};
pub use service::ShareService;
pub use tier::{
    CompositeTier, EphemeralTier, FileBackend, KeyValueBackend, MemoryBackend, RemoteTier,
    StorageTier, StructuredTier,
};
