//! Replay protection: the nonce ledger and its exclusive-access decorator.

use crate::clock::{Clock, SystemClock};
use crate::crypto::material::KeyId;
use crate::errors::HttpSealError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};

/// A recorded single-use token, scoped to one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce {
    /// The client that used the token.
    pub client_id: KeyId,
    /// The token value.
    pub value: String,
    /// When the token stops blocking reuse.
    pub expires_at: DateTime<Utc>,
}

impl Nonce {
    /// Create a nonce record.
    pub fn new(client_id: KeyId, value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            client_id,
            value: value.into(),
            expires_at,
        }
    }
}

/// A ledger recording nonces for replay protection.
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Record first use of a nonce.
    ///
    /// A second registration of the same `(client, value)` pair before the
    /// recorded expiration fails with [`HttpSealError::ReplayedRequest`];
    /// an expired entry is overwritten.
    async fn register(&self, nonce: Nonce) -> Result<(), HttpSealError>;

    /// Look up a recorded nonce, expired or not.
    async fn get(&self, client_id: &KeyId, value: &str) -> Result<Option<Nonce>, HttpSealError>;
}

/// In-memory reference nonce store.
pub struct InMemoryNonceStore {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<(KeyId, String), Nonce>>,
}

impl InMemoryNonceStore {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store reading time from a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryNonceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NonceStore for InMemoryNonceStore {
    async fn register(&self, nonce: Nonce) -> Result<(), HttpSealError> {
        let key = (nonce.client_id.clone(), nonce.value.clone());
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&key) {
            if existing.expires_at > self.clock.now_utc() {
                return Err(HttpSealError::ReplayedRequest);
            }
        }
        entries.insert(key, nonce);
        Ok(())
    }

    async fn get(&self, client_id: &KeyId, value: &str) -> Result<Option<Nonce>, HttpSealError> {
        let key = (client_id.clone(), value.to_owned());
        Ok(self.entries.read().await.get(&key).cloned())
    }
}

/// Exclusive-access decorator for backing stores that are not internally
/// atomic (a flat file, say).
///
/// A single semaphore serializes every register and lookup made through this
/// instance. Acquisition is bounded; exceeding the wait fails with
/// [`HttpSealError::LockTimeout`] rather than blocking indefinitely, and the
/// caller decides whether to retry. The permit is released on every exit
/// path, including cancellation.
pub struct LockingNonceStore {
    inner: Arc<dyn NonceStore>,
    semaphore: Semaphore,
    max_wait: Duration,
}

impl LockingNonceStore {
    /// Bounded wait for the exclusive guard: one second.
    pub const DEFAULT_MAX_LOCK_WAIT: Duration = Duration::from_secs(1);

    /// Wrap a backing store with the default guard wait.
    pub fn new(inner: Arc<dyn NonceStore>) -> Self {
        Self::with_max_wait(inner, Self::DEFAULT_MAX_LOCK_WAIT)
    }

    /// Wrap a backing store with an explicit guard wait.
    pub fn with_max_wait(inner: Arc<dyn NonceStore>, max_wait: Duration) -> Self {
        Self {
            inner,
            semaphore: Semaphore::new(1),
            max_wait,
        }
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>, HttpSealError> {
        tokio::time::timeout(self.max_wait, self.semaphore.acquire())
            .await
            .map_err(|_| HttpSealError::LockTimeout)?
            .map_err(|e| HttpSealError::Store(format!("nonce store guard closed: {}", e)))
    }
}

#[async_trait]
impl NonceStore for LockingNonceStore {
    async fn register(&self, nonce: Nonce) -> Result<(), HttpSealError> {
        let _permit = self.acquire().await?;
        self.inner.register(nonce).await
    }

    async fn get(&self, client_id: &KeyId, value: &str) -> Result<Option<Nonce>, HttpSealError> {
        let _permit = self.acquire().await?;
        self.inner.get(client_id, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    fn nonce_at(value: &str, expires_unix: i64) -> Nonce {
        Nonce::new(
            KeyId::new("id1"),
            value,
            DateTime::from_timestamp(expires_unix, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn registering_twice_before_expiration_is_a_replay() {
        let clock = MockClock::at_unix(1_000_000);
        let store = InMemoryNonceStore::with_clock(Arc::new(clock));

        store.register(nonce_at("n1", 1_000_300)).await.unwrap();
        let result = store.register(nonce_at("n1", 1_000_300)).await;
        assert!(matches!(result, Err(HttpSealError::ReplayedRequest)));
    }

    #[tokio::test]
    async fn registering_after_expiration_succeeds() {
        let clock = MockClock::at_unix(1_000_000);
        let store = InMemoryNonceStore::with_clock(Arc::new(clock));

        store.register(nonce_at("n1", 999_999)).await.unwrap();
        store.register(nonce_at("n1", 1_000_300)).await.unwrap();
    }

    #[tokio::test]
    async fn same_value_for_different_clients_is_not_a_replay() {
        let clock = MockClock::at_unix(1_000_000);
        let store = InMemoryNonceStore::with_clock(Arc::new(clock));

        store.register(nonce_at("n1", 1_000_300)).await.unwrap();
        store
            .register(Nonce::new(
                KeyId::new("id2"),
                "n1",
                DateTime::from_timestamp(1_000_300, 0).unwrap(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_returns_the_recorded_entry() {
        let clock = MockClock::at_unix(1_000_000);
        let store = InMemoryNonceStore::with_clock(Arc::new(clock));

        let nonce = nonce_at("n1", 1_000_300);
        store.register(nonce.clone()).await.unwrap();
        assert_eq!(store.get(&KeyId::new("id1"), "n1").await.unwrap(), Some(nonce));
        assert_eq!(store.get(&KeyId::new("id1"), "other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn locking_store_delegates_both_operations() {
        let clock = MockClock::at_unix(1_000_000);
        let backing = Arc::new(InMemoryNonceStore::with_clock(Arc::new(clock)));
        let store = LockingNonceStore::new(backing);

        store.register(nonce_at("n1", 1_000_300)).await.unwrap();
        assert!(store.get(&KeyId::new("id1"), "n1").await.unwrap().is_some());
        let result = store.register(nonce_at("n1", 1_000_300)).await;
        assert!(matches!(result, Err(HttpSealError::ReplayedRequest)));
    }

    #[tokio::test]
    async fn concurrent_registrations_never_both_succeed() {
        let clock = MockClock::at_unix(1_000_000);
        let backing = Arc::new(InMemoryNonceStore::with_clock(Arc::new(clock)));
        let store = Arc::new(LockingNonceStore::new(backing));

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.register(nonce_at("n1", 1_000_300)).await })
        };
        let second = {
            let store = store.clone();
            tokio::spawn(async move { store.register(nonce_at("n1", 1_000_300)).await })
        };

        let outcomes = [first.await.unwrap(), second.await.unwrap()];
        let successes = outcomes.iter().filter(|o| o.is_ok()).count();
        let replays = outcomes
            .iter()
            .filter(|o| matches!(o, Err(HttpSealError::ReplayedRequest)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(replays, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn guard_wait_is_bounded() {
        /// Backing store that stalls long enough to starve a second caller.
        struct StalledStore;

        #[async_trait]
        impl NonceStore for StalledStore {
            async fn register(&self, _nonce: Nonce) -> Result<(), HttpSealError> {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            }

            async fn get(
                &self,
                _client_id: &KeyId,
                _value: &str,
            ) -> Result<Option<Nonce>, HttpSealError> {
                Ok(None)
            }
        }

        let store = Arc::new(LockingNonceStore::with_max_wait(
            Arc::new(StalledStore),
            Duration::from_millis(100),
        ));

        let holder = {
            let store = store.clone();
            tokio::spawn(async move { store.register(nonce_at("n1", 1_000_300)).await })
        };
        // Let the first registration take the guard.
        tokio::task::yield_now().await;

        let result = store.get(&KeyId::new("id1"), "n1").await;
        assert!(matches!(result, Err(HttpSealError::LockTimeout)));

        holder.await.unwrap().unwrap();
    }
}
