//! Scheduler for bounding and pacing fetches
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore sized to the worker count
//! - Global request pacing via a token bucket (burst = worker count)

use crate::config::ScanConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// A granted fetch slot
///
/// Holding the permit keeps one of the concurrency slots busy; dropping it
/// frees the slot for the next waiting task.
pub struct FetchSlot {
    _permit: OwnedSemaphorePermit,
}

/// Scheduler gates every fetch of a scan
///
/// The scheduler coordinates:
/// - Global concurrency limits (at most `threads` fetches in flight)
/// - Global rate limits (at most `rate` requests per second on average)
#[derive(Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Shared token bucket, absent when rate limiting is disabled
    limiter: Option<Arc<DirectRateLimiter>>,

    /// Number of concurrency slots
    workers: usize,
}

impl Scheduler {
    /// Creates a scheduler from the scan settings
    pub fn new(config: &ScanConfig) -> Self {
        let workers = config.threads.max(1);

        let limiter = if config.is_rate_limited() {
            build_limiter(config.rate_limit, workers)
        } else {
            None
        };

        Self {
            semaphore: Arc::new(Semaphore::new(workers as usize)),
            limiter,
            workers: workers as usize,
        }
    }

    /// Waits for a free concurrency slot, then for a rate-limit token
    ///
    /// Returns None only if the semaphore was closed.
    pub async fn acquire(&self) -> Option<FetchSlot> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        Some(FetchSlot { _permit: permit })
    }

    /// Returns true if a token bucket paces requests
    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Number of concurrency slots
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of slots currently free
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Builds a token bucket refilling at `rate` tokens per second with `burst` capacity
///
/// Fractional rates are supported (0.5 means one request every two seconds).
fn build_limiter(rate: f64, burst: u32) -> Option<Arc<DirectRateLimiter>> {
    let burst = NonZeroU32::new(burst)?;
    let quota = Duration::try_from_secs_f64(1.0 / rate)
        .ok()
        .and_then(Quota::with_period);

    match quota {
        Some(quota) => Some(Arc::new(RateLimiter::direct(quota.allow_burst(burst)))),
        None => {
            tracing::warn!(
                "Rate limit of {} req/s cannot be paced; running unthrottled",
                rate
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn config(threads: u32, rate: f64) -> ScanConfig {
        let mut config = ScanConfig::new("https://example.com");
        config.threads = threads;
        config.rate_limit = rate;
        config
    }

    #[test]
    fn test_unlimited_by_default() {
        let scheduler = Scheduler::new(&config(4, 0.0));
        assert!(!scheduler.is_rate_limited());
        assert_eq!(scheduler.workers(), 4);
        assert_eq!(scheduler.available_slots(), 4);
    }

    #[test]
    fn test_rate_limited_when_configured() {
        let scheduler = Scheduler::new(&config(4, 2.5));
        assert!(scheduler.is_rate_limited());
    }

    #[tokio::test]
    async fn test_slots_are_released_on_drop() {
        let scheduler = Scheduler::new(&config(2, 0.0));

        let first = scheduler.acquire().await.unwrap();
        let second = scheduler.acquire().await.unwrap();
        assert_eq!(scheduler.available_slots(), 0);

        drop(first);
        assert_eq!(scheduler.available_slots(), 1);
        drop(second);
        assert_eq!(scheduler.available_slots(), 2);
    }

    #[tokio::test]
    async fn test_concurrency_bound() {
        let scheduler = Scheduler::new(&config(1, 0.0));
        let held = scheduler.acquire().await.unwrap();

        let waiting = scheduler.clone();
        let blocked = tokio::time::timeout(Duration::from_millis(50), waiting.acquire()).await;
        assert!(blocked.is_err(), "second slot must wait while the first is held");

        drop(held);
        let granted = tokio::time::timeout(Duration::from_millis(500), scheduler.acquire()).await;
        assert!(granted.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limit_paces_requests() {
        // 10 req/s with a burst of one: the third token arrives ~200ms after the first.
        let scheduler = Scheduler::new(&config(1, 10.0));
        let start = Instant::now();

        for _ in 0..3 {
            let slot = scheduler.acquire().await.unwrap();
            drop(slot);
        }

        assert!(start.elapsed() >= Duration::from_millis(180));
    }
}
