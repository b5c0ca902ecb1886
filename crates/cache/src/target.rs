//! The cached unit: a URL plus its time-to-live

use crate::key::{self, CacheKey};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A remote executable identified by its URL.
///
/// This is also the metadata record persisted next to the payload. The
/// payload's own path is never part of it; it follows from the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Identity of the target
    pub url: String,
    /// How long an entry stays valid once cached
    pub invalidate_after: Duration,
    /// Stamped by the store when the entry is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
}

impl Target {
    /// Create a target that has not been cached yet
    #[must_use]
    pub fn new(url: impl Into<String>, invalidate_after: Duration) -> Self {
        Self {
            url: url.into(),
            invalidate_after,
            cached_at: None,
        }
    }

    /// Cache key for this target
    #[must_use]
    pub fn key(&self) -> CacheKey {
        key::hash_url(&self.url)
    }

    /// File name the payload is stored under
    #[must_use]
    pub fn executable_name(&self) -> String {
        key::executable_name(&self.url)
    }

    /// Instant after which the entry is stale, if it has been cached.
    ///
    /// `None` when uncached, or when the TTL is too large to represent, which
    /// means the entry never expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let cached_at = self.cached_at?;
        let ttl = TimeDelta::from_std(self.invalidate_after).ok()?;
        cached_at.checked_add_signed(ttl)
    }

    /// Whether the entry is stale at `now`.
    ///
    /// Strictly greater-than: an entry is still valid at exactly
    /// `cached_at + invalidate_after`. A target without `cached_at` is stale.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.cached_at.is_none() {
            return true;
        }
        self.expires_at().is_some_and(|deadline| now > deadline)
    }

    /// Whether the entry is stale now
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(ttl: Duration, at: DateTime<Utc>) -> Target {
        Target {
            url: "https://example.com/run.sh".to_string(),
            invalidate_after: ttl,
            cached_at: Some(at),
        }
    }

    #[test]
    fn test_new_target_is_uncached() {
        let target = Target::new("https://example.com", Duration::from_secs(60));
        assert!(target.cached_at.is_none());
        assert!(target.is_expired());
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let at = Utc::now();
        let target = cached(Duration::from_secs(10), at);
        let deadline = at + TimeDelta::seconds(10);

        assert!(!target.is_expired_at(at));
        assert!(!target.is_expired_at(deadline));
        assert!(target.is_expired_at(deadline + TimeDelta::nanoseconds(1)));
    }

    #[test]
    fn test_zero_ttl_expires_once_clock_moves() {
        let at = Utc::now();
        let target = cached(Duration::ZERO, at);
        assert!(!target.is_expired_at(at));
        assert!(target.is_expired_at(at + TimeDelta::milliseconds(1)));
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let target = cached(Duration::from_secs(u64::MAX), Utc::now());
        assert!(target.expires_at().is_none());
        assert!(!target.is_expired());
    }

    #[test]
    fn test_metadata_serde_omits_payload_path() {
        let target = cached(Duration::from_secs(3600), Utc::now());
        let json = serde_json::to_value(&target).unwrap();

        let fields: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(fields.len(), 3);
        assert!(json.get("url").is_some());
        assert!(json.get("invalidate_after").is_some());
        assert!(json.get("cached_at").is_some());

        let parsed: Target = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, target);
    }

    #[test]
    fn test_key_depends_only_on_url() {
        let a = Target::new("https://example.com/x", Duration::from_secs(1));
        let mut b = Target::new("https://example.com/x", Duration::from_secs(999));
        b.cached_at = Some(Utc::now());
        assert_eq!(a.key(), b.key());
    }
}
