//! Client resolution: the store trait, an in-memory reference backend, and a
//! caching façade.
//!
//! Persistence backends implement [`ClientStore`]; the caching façade wraps
//! any of them to keep verification from hitting the backing store on every
//! request.

use crate::clock::{Clock, SystemClock};
use crate::crypto::material::KeyId;
use crate::errors::HttpSealError;
use crate::verification::client::Client;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

/// A store the verifier queries to resolve client credentials.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Register a client, replacing any previous record under the same id.
    async fn register(&self, client: Client) -> Result<(), HttpSealError>;

    /// Resolve the registered client for the given id.
    async fn get(&self, id: &KeyId) -> Result<Option<Client>, HttpSealError>;
}

/// In-memory reference client store.
#[derive(Default)]
pub struct InMemoryClientStore {
    clients: RwLock<HashMap<KeyId, Client>>,
}

impl InMemoryClientStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn register(&self, client: Client) -> Result<(), HttpSealError> {
        let mut clients = self.clients.write().await;
        if let Some(previous) = clients.get(client.id()) {
            if previous.algorithm() != client.algorithm() {
                warn!(
                    client = %client.id(),
                    "re-registration changes the signature algorithm for this id"
                );
            }
        }
        clients.insert(client.id().clone(), client);
        Ok(())
    }

    async fn get(&self, id: &KeyId) -> Result<Option<Client>, HttpSealError> {
        Ok(self.clients.read().await.get(id).cloned())
    }
}

struct CachedClient {
    client: Client,
    fresh_until: DateTime<Utc>,
}

/// Caching façade over a backing client store.
///
/// Resolved clients are cached for a bounded TTL. Warm entries are served
/// concurrently; cold misses for the same id collapse onto one
/// backing-store fetch. Registration writes through and refreshes the
/// cached entry.
pub struct CachingClientStore {
    inner: Arc<dyn ClientStore>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<KeyId, CachedClient>>,
    in_flight: Mutex<HashMap<KeyId, Arc<Mutex<()>>>>,
}

impl CachingClientStore {
    /// Wrap a backing store with the given cache TTL.
    pub fn new(inner: Arc<dyn ClientStore>, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, Arc::new(SystemClock))
    }

    /// Wrap a backing store, reading time from a custom clock.
    pub fn with_clock(inner: Arc<dyn ClientStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    async fn cached(&self, id: &KeyId) -> Option<Client> {
        let entries = self.entries.read().await;
        let entry = entries.get(id)?;
        if entry.fresh_until > self.clock.now_utc() {
            Some(entry.client.clone())
        } else {
            None
        }
    }

    async fn store_entry(&self, client: &Client) {
        let fresh_until = self.clock.now_utc() + chrono::Duration::seconds(self.ttl.as_secs() as i64);
        self.entries.write().await.insert(
            client.id().clone(),
            CachedClient {
                client: client.clone(),
                fresh_until,
            },
        );
    }
}

#[async_trait]
impl ClientStore for CachingClientStore {
    async fn register(&self, client: Client) -> Result<(), HttpSealError> {
        self.inner.register(client.clone()).await?;
        self.store_entry(&client).await;
        Ok(())
    }

    async fn get(&self, id: &KeyId) -> Result<Option<Client>, HttpSealError> {
        if let Some(client) = self.cached(id).await {
            return Ok(Some(client));
        }

        // Cold miss: all concurrent misses for this id queue on one flight
        // mutex, and only the first fetches from the backing store.
        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = flight.lock().await;

        if let Some(client) = self.cached(id).await {
            return Ok(Some(client));
        }

        let fetched = self.inner.get(id).await?;
        if let Some(client) = &fetched {
            self.store_entry(client).await;
        }

        drop(guard);
        self.in_flight.lock().await.remove(id);

        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::algorithm::{HashAlgorithm, SignatureAlgorithm};
    use crate::crypto::material::Secret;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client(id: &str) -> Client {
        Client::hmac(
            KeyId::new(id),
            "Unit test app",
            SignatureAlgorithm::Hmac(HashAlgorithm::Sha256),
            Secret::new(b"s3cr3t".to_vec()),
        )
        .unwrap()
    }

    /// Backing store that counts fetches and can stall them.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryClientStore,
        fetches: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ClientStore for CountingStore {
        async fn register(&self, client: Client) -> Result<(), HttpSealError> {
            self.inner.register(client).await
        }

        async fn get(&self, id: &KeyId) -> Result<Option<Client>, HttpSealError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.get(id).await
        }
    }

    /// Clock whose time can be stepped from the outside.
    struct SteppingClock(std::sync::Mutex<DateTime<Utc>>);

    impl SteppingClock {
        fn at_unix(seconds: i64) -> Self {
            Self(std::sync::Mutex::new(
                DateTime::from_timestamp(seconds, 0).unwrap(),
            ))
        }

        fn step(&self, duration: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += duration;
        }
    }

    impl Clock for SteppingClock {
        fn now_utc(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryClientStore::new();
        store.register(client("id1")).await.unwrap();
        assert!(store.get(&KeyId::new("id1")).await.unwrap().is_some());
        assert!(store.get(&KeyId::new("Id1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn warm_entries_skip_the_backing_store() {
        let backing = Arc::new(CountingStore::default());
        backing.register(client("id1")).await.unwrap();
        let clock = Arc::new(SteppingClock::at_unix(1_000_000));
        let cache =
            CachingClientStore::with_clock(backing.clone(), Duration::from_secs(60), clock);

        let id = KeyId::new("id1");
        assert!(cache.get(&id).await.unwrap().is_some());
        assert!(cache.get(&id).await.unwrap().is_some());
        assert!(cache.get(&id).await.unwrap().is_some());
        assert_eq!(backing.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let backing = Arc::new(CountingStore::default());
        backing.register(client("id1")).await.unwrap();
        let clock = Arc::new(SteppingClock::at_unix(1_000_000));
        let cache = CachingClientStore::with_clock(
            backing.clone(),
            Duration::from_secs(60),
            clock.clone(),
        );

        let id = KeyId::new("id1");
        assert!(cache.get(&id).await.unwrap().is_some());
        clock.step(chrono::Duration::seconds(61));
        assert!(cache.get(&id).await.unwrap().is_some());
        assert_eq!(backing.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_cold_misses_collapse_into_one_fetch() {
        let backing = Arc::new(CountingStore {
            delay: Some(Duration::from_millis(50)),
            ..CountingStore::default()
        });
        backing.register(client("id1")).await.unwrap();
        let clock = Arc::new(SteppingClock::at_unix(1_000_000));
        let cache = Arc::new(CachingClientStore::with_clock(
            backing.clone(),
            Duration::from_secs(60),
            clock,
        ));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move {
                cache.get(&KeyId::new("id1")).await.unwrap()
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        assert_eq!(backing.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn register_writes_through_and_refreshes_the_entry() {
        let backing = Arc::new(CountingStore::default());
        let clock = Arc::new(SteppingClock::at_unix(1_000_000));
        let cache =
            CachingClientStore::with_clock(backing.clone(), Duration::from_secs(60), clock);

        cache.register(client("id1")).await.unwrap();

        // Served from the refreshed cache entry, not the backing store.
        assert!(cache.get(&KeyId::new("id1")).await.unwrap().is_some());
        assert_eq!(backing.fetches.load(Ordering::SeqCst), 0);
        assert!(backing.get(&KeyId::new("id1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_ids_resolve_to_none() {
        let backing = Arc::new(CountingStore::default());
        let clock = Arc::new(SteppingClock::at_unix(1_000_000));
        let cache =
            CachingClientStore::with_clock(backing.clone(), Duration::from_secs(60), clock);
        assert!(cache.get(&KeyId::new("ghost")).await.unwrap().is_none());
    }
}
