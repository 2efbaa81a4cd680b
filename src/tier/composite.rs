//! Composite tier fanning out over an ordered list of tiers
//!
//! Reads walk the tiers in order and return the first hit. Writes and
//! deletes go to every tier concurrently and are best-effort: a failing
//! tier is logged and counted, never surfaced to the caller, so one
//! offline backend cannot block the others.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use super::StorageTier;
use crate::entry::{ShareEntry, ShareId};
use crate::error::Result;
use crate::metrics::MetricsCollector;

/// Ordered collection of tiers acting as one
pub struct CompositeTier {
    tiers: Vec<Arc<dyn StorageTier>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl CompositeTier {
    /// Compose `tiers`, consulted in the given order on reads
    pub fn new(tiers: Vec<Arc<dyn StorageTier>>) -> Self {
        Self {
            tiers,
            metrics: None,
        }
    }

    /// Count per-tier failures on the given collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record_tier_error(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.increment_tier_errors();
        }
    }
}

#[async_trait]
impl StorageTier for CompositeTier {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get(&self, id: &str) -> Result<Option<ShareEntry>> {
        for tier in &self.tiers {
            match tier.get(id).await {
                Ok(Some(entry)) => {
                    debug!(tier = tier.name(), id, "Tier hit");
                    return Ok(Some(entry));
                }
                Ok(None) => {}
                Err(err) => {
                    self.record_tier_error();
                    warn!(tier = tier.name(), id, error = %err, "Tier read failed, trying next");
                }
            }
        }
        Ok(None)
    }

    async fn set(&self, entry: &ShareEntry) -> Result<()> {
        let writes = self
            .tiers
            .iter()
            .map(|tier| async move { tier.set(entry).await });
        let results = join_all(writes).await;

        for (tier, result) in self.tiers.iter().zip(results) {
            if let Err(err) = result {
                self.record_tier_error();
                warn!(tier = tier.name(), id = %entry.id, error = %err, "Tier write failed");
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let deletes = self
            .tiers
            .iter()
            .map(|tier| async move { tier.delete(id).await });
        let results = join_all(deletes).await;

        for (tier, result) in self.tiers.iter().zip(results) {
            if let Err(err) = result {
                self.record_tier_error();
                warn!(tier = tier.name(), id, error = %err, "Tier delete failed");
            }
        }
        Ok(())
    }

    async fn has(&self, id: &str) -> Result<bool> {
        for tier in &self.tiers {
            match tier.has(id).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) => {
                    self.record_tier_error();
                    warn!(tier = tier.name(), id, error = %err, "Tier lookup failed, trying next");
                }
            }
        }
        Ok(false)
    }

    async fn get_all(&self) -> Result<HashMap<ShareId, ShareEntry>> {
        let mut merged = HashMap::new();
        for tier in &self.tiers {
            match tier.get_all().await {
                Ok(entries) => {
                    // Later tiers overwrite earlier ones on id collisions
                    merged.extend(entries);
                }
                Err(err) => {
                    self.record_tier_error();
                    warn!(tier = tier.name(), error = %err, "Tier listing failed, skipping");
                }
            }
        }
        Ok(merged)
    }
}
