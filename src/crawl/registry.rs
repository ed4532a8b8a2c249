// src/crawl/registry.rs
// =============================================================================
// Shared state of a crawl run.
//
// - VisitedRegistry: the set of URLs already claimed by a traversal task
// - ConcurrencyLimiter: a pool of permits bounding in-flight fetches
// - ResultLog: the growing list of page results
//
// All three are created per run and handed to traversal tasks through an
// Arc; nothing here is global. The locks are held for a single operation and
// never across an .await.
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::model::PageResult;

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Marks `url` as claimed
    //
    // Returns true only for the one caller that actually inserted it; every
    // later (or concurrent) caller with the same URL gets false.
    pub fn claim_if_new(&self, url: &str) -> bool {
        let mut urls = self.urls.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.lock().len()
    }
}

/// Fixed-size pool of fetch permits
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    // Waits for a free permit, or returns None if `cancel` fires first
    //
    // The permit goes back to the pool when the returned guard is dropped,
    // so an early return or a failed fetch can't leak it.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<OwnedSemaphorePermit> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = self.permits.clone().acquire_owned() => permit.ok(),
        }
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[derive(Debug, Default)]
pub struct ResultLog {
    results: Mutex<Vec<PageResult>>,
}

impl ResultLog {
    pub fn push(&self, result: PageResult) {
        self.results.lock().push(result);
    }

    pub fn take(&self) -> Vec<PageResult> {
        std::mem::take(&mut *self.results.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_claim_once() {
        let registry = VisitedRegistry::new();
        assert!(registry.claim_if_new("https://example.com/"));
        assert!(!registry.claim_if_new("https://example.com/"));
        assert!(registry.claim_if_new("https://example.com/other"));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(VisitedRegistry::new());

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.claim_if_new("https://example.com/same") })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let limiter = ConcurrencyLimiter::new(1);
        let cancel = CancellationToken::new();

        let permit = limiter.acquire(&cancel).await;
        assert!(permit.is_some());
        assert_eq!(limiter.available(), 0);

        drop(permit);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_acquire_returns_none_when_cancelled() {
        let limiter = ConcurrencyLimiter::new(1);
        let cancel = CancellationToken::new();
        let _held = limiter.acquire(&cancel).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel).await.is_none() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        assert!(waiter.await.unwrap());
    }

    #[test]
    fn test_result_log_take_drains() {
        let log = ResultLog::default();
        log.push(PageResult::failed("https://example.com/".into(), 0, "boom"));
        assert_eq!(log.take().len(), 1);
        assert!(log.take().is_empty());
    }
}
