//! Transient session cache for parsed-but-undecided imports
//!
//! A session holds the field table and extraction between the parse and
//! commit steps. Values are opaque strings with a per-entry TTL.

use crate::error::SessionError;
use crate::extract::Extraction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use estate_fields::FieldTable;
use moka::future::Cache;
use moka::Expiry;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Key/value cache with expiry
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Store `value` under `key` for `ttl`, replacing any previous value
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError>;

    /// Value under `key`, unless missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Remove `key`
    async fn delete(&self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process session cache using moka
#[derive(Debug, Clone)]
pub struct MokaSessionCache {
    inner: Cache<String, Entry>,
}

impl MokaSessionCache {
    /// Create cache holding at most `max_sessions` sessions
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MokaSessionCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl SessionCache for MokaSessionCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError> {
        self.inner.insert(key.to_string(), Entry { value, ttl }).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.inner.get(key).await.map(|e| e.value))
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}

/// Everything the commit step needs from the parse step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub fields: FieldTable,
    pub extraction: Extraction,
}

impl ImportSession {
    /// Cache key for a session id
    #[must_use]
    pub fn cache_key(session_id: &str) -> String {
        format!("estate-import:{session_id}")
    }

    /// Encode for the cache
    ///
    /// # Errors
    ///
    /// [`SessionError::Corrupt`] if encoding fails.
    pub fn encode(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the cache
    ///
    /// # Errors
    ///
    /// [`SessionError::Corrupt`] if the stored value is not a session.
    pub fn decode(raw: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_fields::FieldValue;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MokaSessionCache::default();
        cache.set("k", "v".into(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.set("k", "w".into(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("w"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = MokaSessionCache::default();
        cache.set("short", "v".into(), Duration::from_millis(50)).await.unwrap();
        cache.set("long", "v".into(), Duration::from_secs(60)).await.unwrap();

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[test]
    fn test_session_round_trip() {
        let mut fields = FieldTable::new();
        fields.record("Client full name", Some(FieldValue::Text("Pat Doe".into())));
        fields.record("Beneficiary percentage", Some(FieldValue::Number(50.0)));
        let session = ImportSession {
            session_id: "abc".into(),
            created_at: Utc::now(),
            extraction: crate::extract::extract_people(&fields, " SP"),
            fields,
        };

        let back = ImportSession::decode(&session.encode().unwrap()).unwrap();
        assert_eq!(back.fields, session.fields);
        assert_eq!(back.extraction.client_name.as_deref(), Some("Pat Doe"));
        assert!(matches!(ImportSession::decode("{}"), Err(SessionError::Corrupt(_))));
    }
}
