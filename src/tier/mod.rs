//! Storage tiers for share entries
//!
//! This module defines the uniform contract every physical backend
//! implements, the three concrete backends (ephemeral key-value,
//! structured on-device database, remote HTTP), and the composite
//! aggregator that presents an ordered list of tiers as one.

mod composite;
mod ephemeral;
mod remote;
mod structured;

pub use composite::CompositeTier;
pub use ephemeral::{EphemeralTier, FileBackend, KeyValueBackend, MemoryBackend};
pub use remote::RemoteTier;
pub use structured::StructuredTier;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entry::{ShareEntry, ShareId};
use crate::error::Result;

/// Uniform contract implemented by every storage backend.
///
/// Tiers never treat a missing identifier as an error: `get` answers with
/// `None` and `delete` succeeds. Failures mean the tier itself could not
/// do its work (quota, I/O, network), and a failed `set` must leave
/// previously stored entries intact.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Fetch the entry stored under `id`
    async fn get(&self, id: &str) -> Result<Option<ShareEntry>>;

    /// Persist or overwrite an entry, keyed by `entry.id`
    async fn set(&self, entry: &ShareEntry) -> Result<()>;

    /// Remove the entry stored under `id`
    async fn delete(&self, id: &str) -> Result<()>;

    /// Every entry currently visible to this tier
    async fn get_all(&self) -> Result<HashMap<ShareId, ShareEntry>>;

    /// Existence probe; the default implementation goes through `get`
    async fn has(&self, id: &str) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}
