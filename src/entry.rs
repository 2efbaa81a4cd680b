//! The share entry data model
//!
//! A share is a text snapshot addressable by a stable identifier. Entries
//! carry epoch-millisecond timestamps; `created_at` is set once, and
//! `updated_at` never decreases for a given identifier within one tier.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a share entry
pub type ShareId = String;

/// The unit of persistence managed by the storage tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    /// Stable identifier, generated once at creation
    pub id: ShareId,
    /// The snapshot payload
    pub content: String,
    /// Creation timestamp in epoch milliseconds, immutable
    pub created_at: i64,
    /// Last update timestamp in epoch milliseconds
    pub updated_at: i64,
}

impl ShareEntry {
    /// Create a new entry with both timestamps set to now
    pub fn new(id: impl Into<ShareId>, content: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: id.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive an updated entry: same id and creation time, new content.
    ///
    /// The update timestamp never moves backwards, even if the clock does.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            content: content.into(),
            created_at: self.created_at,
            updated_at: now_ms().max(self.updated_at),
        }
    }

    /// Creation time as a chrono timestamp, if representable
    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }

    /// Last update time as a chrono timestamp, if representable
    pub fn updated_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.updated_at).single()
    }
}

/// Current wall-clock time in epoch milliseconds
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_timestamps() {
        let before = now_ms();
        let entry = ShareEntry::new("id-1", "graph TD");
        let after = now_ms();

        assert_eq!(entry.id, "id-1");
        assert_eq!(entry.content, "graph TD");
        assert_eq!(entry.created_at, entry.updated_at);
        assert!(entry.created_at >= before && entry.created_at <= after);
    }

    #[test]
    fn test_with_content_preserves_identity() {
        let entry = ShareEntry::new("id-1", "v1");
        let updated = entry.with_content("v2");

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.content, "v2");
        assert_eq!(updated.created_at, entry.created_at);
        assert!(updated.updated_at >= entry.updated_at);
    }

    #[test]
    fn test_with_content_is_monotonic() {
        // An entry stamped in the future must not move backwards
        let mut entry = ShareEntry::new("id-1", "v1");
        entry.updated_at = now_ms() + 60_000;

        let updated = entry.with_content("v2");
        assert_eq!(updated.updated_at, entry.updated_at);
        assert!(updated.created_at <= updated.updated_at);
    }

    #[test]
    fn test_serde_field_names() {
        let entry = ShareEntry {
            id: "id-1".to_string(),
            content: "x".to_string(),
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_500,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"created_at\":1700000000000"));
        assert!(json.contains("\"updated_at\":1700000000500"));

        let back: ShareEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_chrono_conversion() {
        let entry = ShareEntry {
            id: "id-1".to_string(),
            content: "x".to_string(),
            created_at: 0,
            updated_at: 1_000,
        };

        assert_eq!(entry.created_time().unwrap().timestamp_millis(), 0);
        assert_eq!(entry.updated_time().unwrap().timestamp_millis(), 1_000);
    }
}
