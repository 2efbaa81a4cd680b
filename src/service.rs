use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::codec::ShareCodec;
use crate::config::ShareConfig;
use crate::entry::{ShareEntry, ShareId};
use crate::error::{Error, Result};
use crate::id::generate_id;
use crate::link::ShareLink;
use crate::metrics::{MetricsCollector, ServiceStats};
use crate::tier::{EphemeralTier, StorageTier};

/// The main entry point for storing and sharing snapshots
pub struct ShareService {
    /// Active storage tier, swappable at runtime
    tier: RwLock<Arc<dyn StorageTier>>,
    /// Codec for link-embedded payloads
    codec: ShareCodec,
    /// Service configuration
    config: ShareConfig,
    /// Metrics collector
    metrics: Arc<MetricsCollector>,
}

impl ShareService {
    /// Create a service with default configuration over an in-memory tier
    pub fn new() -> Self {
        Self::assemble(
            ShareConfig::default(),
            Arc::new(EphemeralTier::in_memory()),
        )
    }

    /// Create a service with custom configuration over an in-memory tier
    pub fn with_config(config: ShareConfig) -> Result<Self> {
        Self::with_config_and_tier(config, Arc::new(EphemeralTier::in_memory()))
    }

    /// Create a service with default configuration over the given tier
    pub fn with_tier(tier: Arc<dyn StorageTier>) -> Self {
        Self::assemble(ShareConfig::default(), tier)
    }

    /// Create a service with custom configuration over the given tier
    pub fn with_config_and_tier(config: ShareConfig, tier: Arc<dyn StorageTier>) -> Result<Self> {
        // Validate configuration
        config.validate()?;

        Ok(Self::assemble(config, tier))
    }

    /// Store `content` under a fresh id and return a shareable link.
    ///
    /// With `embed_content` set, the link also carries an encoded copy of
    /// the content, so the first recipient can load the share before any
    /// tier has replicated it.
    pub async fn create_share(&self, content: &str, embed_content: bool) -> Result<ShareLink> {
        // Encode before minting an id so a codec failure stores nothing
        let code = if embed_content {
            Some(self.codec.encode(content)?)
        } else {
            None
        };

        let id = generate_id();
        let entry = ShareEntry::new(id.clone(), content);
        self.active_tier().set(&entry).await?;

        self.metrics.increment_creates();
        debug!(id = %entry.id, bytes = content.len(), embedded = embed_content, "Share created");

        Ok(match code {
            Some(code) => ShareLink::with_code(id, code),
            None => ShareLink::new(id),
        })
    }

    /// Replace the content of an existing share.
    ///
    /// Fails with a not-found error when no tier holds the id; an update
    /// never materializes a share that was not created first.
    pub async fn update_share(&self, id: &str, content: &str) -> Result<ShareEntry> {
        let tier = self.active_tier();
        let existing = tier.get(id).await?.ok_or_else(|| Error::not_found(id))?;

        let updated = existing.with_content(content);
        tier.set(&updated).await?;

        self.metrics.increment_updates();
        debug!(id, "Share updated");

        Ok(updated)
    }

    /// Load the content of a share.
    ///
    /// Consults the active tier first. On a miss, a `fallback_code`
    /// carried in the link is decoded instead and the recovered content
    /// is written back to the tier. Returns `Ok(None)` when neither
    /// source can produce the content.
    pub async fn load_share(&self, id: &str, fallback_code: Option<&str>) -> Result<Option<String>> {
        // A tier failure here degrades to a miss; the link code may
        // still be able to serve the snapshot
        let stored = match self.active_tier().get(id).await {
            Ok(found) => found,
            Err(err) => {
                warn!(id, error = %err, "Tier read failed, falling back to link code");
                None
            }
        };

        if let Some(entry) = stored {
            self.metrics.increment_loads();
            return Ok(Some(entry.content));
        }

        match fallback_code {
            Some(code) => match self.codec.decode(code) {
                Ok(content) => {
                    self.backfill(id, &content).await;
                    self.metrics.increment_fallback_loads();
                    debug!(id, "Share recovered from link code");
                    Ok(Some(content))
                }
                Err(err) => {
                    warn!(id, error = %err, "Link code failed to decode");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Load a share from a full link URL, using its embedded code as
    /// the fallback
    pub async fn load_from_url(&self, url: &str) -> Result<Option<String>> {
        let link = ShareLink::parse(url)?;
        self.load_share(&link.id, link.code.as_deref()).await
    }

    /// Check whether any tier holds the given id
    pub async fn has_share(&self, id: &str) -> Result<bool> {
        self.active_tier().has(id).await
    }

    /// Remove a share from the active tier
    pub async fn delete_share(&self, id: &str) -> Result<()> {
        self.active_tier().delete(id).await?;

        self.metrics.increment_deletes();
        debug!(id, "Share deleted");
        Ok(())
    }

    /// Fetch a share entry with its timestamps, without touching metrics
    pub async fn get_share_info(&self, id: &str) -> Result<Option<ShareEntry>> {
        self.active_tier().get(id).await
    }

    /// Delete all but the `max_entries` most recently updated shares.
    ///
    /// Returns the number of shares actually removed. Ties on the update
    /// time are broken by id so repeated runs agree on what to keep.
    pub async fn cleanup_old_shares(&self, max_entries: usize) -> Result<usize> {
        let tier = self.active_tier();
        let all = tier.get_all().await?;
        if all.len() <= max_entries {
            return Ok(0);
        }

        // Most recently updated first
        let mut entries: Vec<ShareEntry> = all.into_values().collect();
        entries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let stale = entries.split_off(max_entries);
        let deletes = stale.iter().map(|entry| {
            let tier = tier.clone();
            async move { tier.delete(&entry.id).await }
        });
        let results = join_all(deletes).await;

        // Count only the deletes that actually went through
        let mut removed = 0;
        for (entry, result) in stale.iter().zip(results) {
            match result {
                Ok(()) => removed += 1,
                Err(err) => warn!(id = %entry.id, error = %err, "Cleanup delete failed"),
            }
        }

        self.metrics.add_cleanup_removed(removed);
        info!(removed, kept = entries.len(), "Old shares cleaned up");
        Ok(removed)
    }

    /// Run cleanup with the configured retention bound
    pub async fn enforce_retention(&self) -> Result<usize> {
        self.cleanup_old_shares(self.config.max_entries).await
    }

    /// Swap the active storage tier.
    ///
    /// In-flight operations finish against the tier they started with;
    /// operations started after the swap see the new tier.
    pub fn set_storage_tier(&self, tier: Arc<dyn StorageTier>) {
        info!(tier = tier.name(), "Storage tier swapped");
        *self.tier.write() = tier;
    }

    /// Name of the currently active tier
    pub fn active_tier_name(&self) -> String {
        self.tier.read().name().to_string()
    }

    /// Build the full URL for a link using the configured base
    pub fn share_url(&self, link: &ShareLink) -> Result<Url> {
        link.to_url(&self.config.link_base)
    }

    /// Mint a new share id without storing anything
    pub fn generate_id(&self) -> ShareId {
        generate_id()
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> ServiceStats {
        self.metrics.snapshot()
    }

    /// Shared handle to the metrics collector, e.g. for wiring into a
    /// composite tier
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// The service configuration
    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    // Internal methods

    fn assemble(config: ShareConfig, tier: Arc<dyn StorageTier>) -> Self {
        let codec = ShareCodec::new(config.codec_algorithm, config.codec_level);
        Self {
            tier: RwLock::new(tier),
            codec,
            config,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    fn active_tier(&self) -> Arc<dyn StorageTier> {
        self.tier.read().clone()
    }

    /// Write content recovered from a link code back into the tier
    async fn backfill(&self, id: &str, content: &str) {
        let tier = self.active_tier();

        // Another writer may have materialized the id meanwhile; keep
        // its creation time if so
        let entry = match tier.get(id).await {
            Ok(Some(existing)) => existing.with_content(content),
            _ => ShareEntry::new(id, content),
        };

        if let Err(err) = tier.set(&entry).await {
            warn!(id, error = %err, "Backfill write failed");
        }
    }
}

impl Default for ShareService {
    fn default() -> Self {
        Self::new()
    }
}
