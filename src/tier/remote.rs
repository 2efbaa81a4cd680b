//! Remote HTTP tier
//!
//! Speaks a small CRUD protocol against `{base}/{id}`: GET to fetch,
//! PUT to store, DELETE to remove. On the wire, timestamps are RFC 3339
//! strings; internally they stay epoch milliseconds.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::StorageTier;
use crate::entry::{ShareEntry, ShareId};
use crate::error::{Error, Result};

/// Entry as exchanged with the remote endpoint
#[derive(Debug, Serialize, Deserialize)]
struct WireEntry {
    id: ShareId,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WireEntry {
    fn from_entry(entry: &ShareEntry) -> Result<Self> {
        Ok(Self {
            id: entry.id.clone(),
            content: entry.content.clone(),
            created_at: timestamp_from_ms(entry.created_at)?,
            updated_at: timestamp_from_ms(entry.updated_at)?,
        })
    }

    fn into_entry(self) -> ShareEntry {
        ShareEntry {
            id: self.id,
            content: self.content,
            created_at: self.created_at.timestamp_millis(),
            updated_at: self.updated_at.timestamp_millis(),
        }
    }
}

fn timestamp_from_ms(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| Error::other(format!("timestamp out of range: {}", ms)))
}

/// Storage tier backed by a remote CRUD endpoint
pub struct RemoteTier {
    client: Client,
    base_url: String,
}

impl RemoteTier {
    /// Create a tier talking to `base_url`, e.g. `https://host/api/shares`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured client, e.g. with timeouts or proxies applied
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn entry_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

#[async_trait]
impl StorageTier for RemoteTier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn get(&self, id: &str) -> Result<Option<ShareEntry>> {
        let response = self.client.get(self.entry_url(id)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let wire: WireEntry = response.json().await?;
                Ok(Some(wire.into_entry()))
            }
            status => Err(Error::remote(format!(
                "GET {} returned {}",
                self.entry_url(id),
                status
            ))),
        }
    }

    async fn set(&self, entry: &ShareEntry) -> Result<()> {
        let wire = WireEntry::from_entry(entry)?;
        let response = self
            .client
            .put(self.entry_url(&entry.id))
            .json(&wire)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::remote(format!(
                "PUT {} returned {}",
                self.entry_url(&entry.id),
                status
            )))
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self.client.delete(self.entry_url(id)).send().await?;

        match response.status() {
            // Deleting an id the server never saw is still a success
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            status => Err(Error::remote(format!(
                "DELETE {} returned {}",
                self.entry_url(id),
                status
            ))),
        }
    }

    async fn get_all(&self) -> Result<HashMap<ShareId, ShareEntry>> {
        // The endpoint exposes no enumeration; composite callers merge
        // this empty listing with the local tiers
        Ok(HashMap::new())
    }
}
