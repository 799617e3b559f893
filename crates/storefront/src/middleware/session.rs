//! Session middleware configuration.
//!
//! Sessions live in process memory: they only hold a checkout token, a
//! bearer token and pending notifications, all of which the commerce
//! backend can re-issue. The store is a bounded moka cache, and each record
//! is evicted once its own expiry date passes.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "larkspur_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most sessions held at once; least recently used ones go first.
const MAX_SESSIONS: u64 = 100_000;

/// Create the session layer with a bounded in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<SessionCache> {
    SessionManagerLayer::new(SessionCache::new(MAX_SESSIONS))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

// =============================================================================
// Store
// =============================================================================

/// Session store backed by a moka cache.
///
/// Every save moves the record's eviction deadline to its `expiry_date`, so
/// inactive sessions drop out without a sweeper task.
#[derive(Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    /// Create a store holding at most `max_capacity` sessions.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(RecordExpiry)
                .build(),
        }
    }

    /// Number of sessions currently held, once pending evictions have run.
    pub async fn session_count(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("entry_count", &self.records.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self.records.get(session_id).await)
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Evicts a record when its `expiry_date` passes.
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(record: &Record) -> Duration {
        Duration::try_from(record.expiry_date - OffsetDateTime::now_utc())
            .unwrap_or(Duration::ZERO)
    }
}

impl moka::Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _id: &Id,
        record: &Record,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Self::remaining(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::remaining(record))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::cookie::time::Duration as TimeDuration;

    use super::*;

    /// Per-entry timers fire on roughly one second ticks.
    async fn wait_for_timer_tick() {
        tokio::time::sleep(Duration::from_millis(2_200)).await;
    }

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_expired_sessions_are_evicted() {
        let store = SessionCache::new(MAX_SESSIONS);
        let mut ids = Vec::new();
        for _ in 0..3 {
            let mut expired = record(TimeDuration::seconds(-60));
            store.create(&mut expired).await.unwrap();
            ids.push(expired.id);
        }

        for id in &ids {
            assert!(store.load(id).await.unwrap().is_none());
        }
        wait_for_timer_tick().await;
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_live_session_survives_and_deletes() {
        let store = SessionCache::new(MAX_SESSIONS);
        let mut live = record(TimeDuration::hours(1));
        store.create(&mut live).await.unwrap();
        let mut expired = record(TimeDuration::seconds(-60));
        store.create(&mut expired).await.unwrap();

        let loaded = store.load(&live.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, live.id);
        wait_for_timer_tick().await;
        assert_eq!(store.session_count().await, 1);

        store.delete(&live.id).await.unwrap();
        assert!(store.load(&live.id).await.unwrap().is_none());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_saving_later_expiry_keeps_session() {
        let store = SessionCache::new(MAX_SESSIONS);
        let mut session = record(TimeDuration::seconds(-60));
        store.create(&mut session).await.unwrap();

        session.expiry_date = OffsetDateTime::now_utc() + TimeDuration::hours(1);
        store.save(&session).await.unwrap();

        assert!(store.load(&session.id).await.unwrap().is_some());
        wait_for_timer_tick().await;
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_bounds_store() {
        let store = SessionCache::new(2);
        for _ in 0..10 {
            let mut live = record(TimeDuration::hours(1));
            store.create(&mut live).await.unwrap();
        }
        assert!(store.session_count().await <= 2);
    }
}
