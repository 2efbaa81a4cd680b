//! Share identifier generation
//!
//! Identifiers are canonical UUID v4 strings. Entropy comes from the
//! operating system when available; if that source fails, a time-seeded
//! generator takes over. Both paths run through the same shaping step, so
//! the identifier format does not depend on the entropy source.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Builder;

use crate::entry::ShareId;

/// Generate a new effectively-unique share identifier
pub fn generate_id() -> ShareId {
    shape(entropy())
}

/// Fill sixteen bytes from the strongest available source
fn entropy() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    if OsRng.try_fill_bytes(&mut bytes).is_ok() {
        return bytes;
    }
    fallback_entropy()
}

/// Time-seeded generator used when OS entropy is unavailable
fn fallback_entropy() -> [u8; 16] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_else(|e| e.duration().as_nanos() as u64);

    let mut rng = StdRng::seed_from_u64(nanos);
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Shape raw bytes into the canonical identifier text
fn shape(bytes: [u8; 16]) -> ShareId {
    Builder::from_random_bytes(bytes).into_uuid().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn test_id_shape() {
        let id = generate_id();
        let parsed = Uuid::parse_str(&id).unwrap();

        assert_eq!(id.len(), 36);
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_fallback_has_same_shape() {
        let id = shape(fallback_entropy());
        let parsed = Uuid::parse_str(&id).unwrap();

        assert_eq!(id.len(), 36);
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_ids_are_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_id()));
        }
    }
}
