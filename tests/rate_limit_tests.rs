use async_trait::async_trait;
use coinbridge::core::rate_limit::{
    BucketDecision, BucketStore, DegradationPolicy, InMemoryBucketStore, LocalRateLimiter,
    RateLimitKey, RateLimitQuota, RateLimiter, RedisBucketStore, SharedRateLimiter, StoreError,
};
use coinbridge::{ClientError, Exchange, RateLimitConfig};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

fn config(capacity: u32, window: Duration) -> RateLimitConfig {
    RateLimitConfig::default().with_default_quota(capacity, window)
}

#[tokio::test]
async fn test_local_limiter_blocks_after_capacity() {
    let limiter = LocalRateLimiter::new(config(3, Duration::from_secs(60)));
    let key = RateLimitKey::new(Exchange::BitFlyer, "ticker");

    for _ in 0..3 {
        timeout(Duration::from_secs(1), limiter.acquire(&key, 1))
            .await
            .expect("within capacity")
            .unwrap();
    }
    assert!(timeout(Duration::from_millis(100), limiter.acquire(&key, 1))
        .await
        .is_err());
}

#[tokio::test]
async fn test_local_limiter_replenishes_after_window() {
    let limiter = LocalRateLimiter::new(config(2, Duration::from_millis(200)));
    let key = RateLimitKey::new(Exchange::BitFlyer, "ticker");

    assert!(limiter.try_acquire(&key, 1).unwrap().is_some());
    assert!(limiter.try_acquire(&key, 1).unwrap().is_some());
    assert!(limiter.try_acquire(&key, 1).unwrap().is_none());

    // One token comes back every window / capacity.
    tokio::time::sleep(Duration::from_millis(130)).await;
    assert!(limiter.try_acquire(&key, 1).unwrap().is_some());
    assert!(limiter.try_acquire(&key, 1).unwrap().is_none());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(limiter.try_acquire(&key, 2).unwrap().is_some());
}

#[tokio::test]
async fn test_local_limiter_keys_are_independent() {
    let limiter = LocalRateLimiter::new(config(1, Duration::from_secs(60)));
    let ticker = RateLimitKey::new(Exchange::Bitbank, "ticker");
    let depth = RateLimitKey::new(Exchange::Bitbank, "depth");

    assert!(limiter.try_acquire(&ticker, 1).unwrap().is_some());
    assert!(limiter.try_acquire(&ticker, 1).unwrap().is_none());
    assert!(limiter.try_acquire(&depth, 1).unwrap().is_some());
}

#[tokio::test]
async fn test_weight_above_capacity_is_rejected() {
    let limiter = LocalRateLimiter::new(config(5, Duration::from_secs(1)));
    let key = RateLimitKey::new(Exchange::Binance, "request_weight");

    let err = limiter.acquire(&key, 6).await.unwrap_err();
    assert!(matches!(err, ClientError::Configuration(_)));
}

#[tokio::test]
async fn test_limiters_sharing_a_store_never_exceed_capacity() {
    let store = Arc::new(InMemoryBucketStore::new());
    let window = Duration::from_secs(2);
    let a = Arc::new(SharedRateLimiter::new(SharedStore(store.clone()), config(5, window)));
    let b = Arc::new(SharedRateLimiter::new(SharedStore(store), config(5, window)));
    let key = RateLimitKey::new(Exchange::Bitbank, "user/assets");

    let started = Instant::now();
    let granted = Arc::new(AtomicUsize::new(0));
    let tasks = (0..8).map(|i| {
        let limiter = if i % 2 == 0 { a.clone() } else { b.clone() };
        let key = key.clone();
        let granted = granted.clone();
        async move {
            if timeout(Duration::from_millis(500), limiter.acquire(&key, 1))
                .await
                .is_ok_and(|r| r.is_ok())
            {
                granted.fetch_add(1, Ordering::SeqCst);
            }
        }
    });
    join_all(tasks).await;

    assert!(started.elapsed() < window);
    assert_eq!(granted.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_shared_limiter_waits_for_next_window() {
    let window = Duration::from_millis(200);
    let limiter = SharedRateLimiter::new(InMemoryBucketStore::new(), config(2, window));
    let key = RateLimitKey::new(Exchange::Upbit, "market");

    limiter.acquire(&key, 2).await.unwrap();
    assert_eq!(limiter.remaining(&key).await.unwrap(), 0);
    assert!(timeout(Duration::from_millis(50), limiter.acquire(&key, 1))
        .await
        .is_err());

    tokio::time::sleep(window).await;
    assert_eq!(limiter.remaining(&key).await.unwrap(), 2);
    let permit = timeout(Duration::from_millis(100), limiter.acquire(&key, 1))
        .await
        .expect("fresh window")
        .unwrap();
    assert_eq!(permit.remaining, Some(1));
}

#[tokio::test]
async fn test_blocked_waiter_acquires_after_rollover() {
    let window = Duration::from_millis(200);
    let limiter = SharedRateLimiter::new(InMemoryBucketStore::new(), config(1, window));
    let key = RateLimitKey::new(Exchange::Upbit, "market");

    limiter.acquire(&key, 1).await.unwrap();
    let started = Instant::now();
    timeout(Duration::from_secs(1), limiter.acquire(&key, 1))
        .await
        .expect("granted in the next window")
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_cancelled_acquire_returns_its_tokens() {
    let store = Arc::new(InMemoryBucketStore::new());
    let limiter = SharedRateLimiter::new(
        SlowReplyStore(store.clone()),
        config(3, Duration::from_secs(60)),
    );
    let key = RateLimitKey::new(Exchange::Bitbank, "user/assets");

    for _ in 0..3 {
        // The store commits the take, then the caller gives up before the reply.
        assert!(timeout(Duration::from_millis(20), limiter.acquire(&key, 1))
            .await
            .is_err());
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(limiter.remaining(&key).await.unwrap(), 3);

    let permit = timeout(Duration::from_secs(1), limiter.acquire(&key, 1))
        .await
        .expect("tokens were refunded")
        .unwrap();
    assert_eq!(permit.remaining, Some(2));
}

#[tokio::test]
async fn test_fail_closed_surfaces_backend_error() {
    let limiter = SharedRateLimiter::new(
        FailingStore,
        config(5, Duration::from_secs(1)).with_degradation(DegradationPolicy::FailClosed),
    );
    let key = RateLimitKey::new(Exchange::Coincheck, "ticker");

    let err = limiter.acquire(&key, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::RateLimitBackendUnavailable(_)));
}

#[tokio::test]
async fn test_fail_open_falls_back_to_local_limiting() {
    let limiter = SharedRateLimiter::new(
        FailingStore,
        config(2, Duration::from_secs(60)).with_degradation(DegradationPolicy::FailOpen),
    );
    let key = RateLimitKey::new(Exchange::Coincheck, "ticker");

    for _ in 0..2 {
        let permit = limiter.acquire(&key, 1).await.unwrap();
        assert_eq!(permit.remaining, None);
    }
    assert!(timeout(Duration::from_millis(100), limiter.acquire(&key, 1))
        .await
        .is_err());
}

#[tokio::test]
#[ignore = "requires REDIS_URL"]
async fn test_redis_store_shared_between_limiters() {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let prefix = format!("coinbridge-test-{}", std::process::id());
    let config = config(3, Duration::from_secs(5));
    let config = RateLimitConfig {
        key_prefix: prefix,
        ..config
    };
    let a = SharedRateLimiter::new(RedisBucketStore::connect(&url).await.unwrap(), config.clone());
    let b = SharedRateLimiter::new(RedisBucketStore::connect(&url).await.unwrap(), config);
    let key = RateLimitKey::new(Exchange::GmoCoin, "ticker");

    a.acquire(&key, 2).await.unwrap();
    b.acquire(&key, 1).await.unwrap();
    assert_eq!(a.remaining(&key).await.unwrap(), 0);
    assert!(timeout(Duration::from_millis(200), b.acquire(&key, 1))
        .await
        .is_err());
}

/// Hands one store to several limiters.
struct SharedStore(Arc<InMemoryBucketStore>);

#[async_trait]
impl BucketStore for SharedStore {
    async fn try_take(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<BucketDecision, StoreError> {
        self.0.try_take(key, quota, weight).await
    }

    async fn remaining(&self, key: &str, quota: RateLimitQuota) -> Result<u32, StoreError> {
        self.0.remaining(key, quota).await
    }

    async fn refund(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<(), StoreError> {
        self.0.refund(key, quota, weight).await
    }
}

/// Commits each take immediately but answers 100ms later.
struct SlowReplyStore(Arc<InMemoryBucketStore>);

#[async_trait]
impl BucketStore for SlowReplyStore {
    async fn try_take(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<BucketDecision, StoreError> {
        let decision = self.0.try_take(key, quota, weight).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        decision
    }

    async fn remaining(&self, key: &str, quota: RateLimitQuota) -> Result<u32, StoreError> {
        self.0.remaining(key, quota).await
    }

    async fn refund(
        &self,
        key: &str,
        quota: RateLimitQuota,
        weight: u32,
    ) -> Result<(), StoreError> {
        self.0.refund(key, quota, weight).await
    }
}

struct FailingStore;

#[async_trait]
impl BucketStore for FailingStore {
    async fn try_take(
        &self,
        _key: &str,
        _quota: RateLimitQuota,
        _weight: u32,
    ) -> Result<BucketDecision, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn remaining(&self, _key: &str, _quota: RateLimitQuota) -> Result<u32, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn refund(
        &self,
        _key: &str,
        _quota: RateLimitQuota,
        _weight: u32,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
