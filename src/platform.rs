//! The source-control platform capability seam.
//!
//! The reconciliation engine only ever needs three read-only capabilities
//! from the hosting platform, captured by the [`Platform`] trait. The real
//! implementation lives in [`crate::github`]; tests substitute in-memory
//! mocks.
//!
//! Also home to [`with_quota_retry`], the single shared retry policy for
//! quota exhaustion. Every remote call made during a run goes through it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::PlatformError;
use crate::models::{TeamAccess, TeamRef};

/// Read-only view of the source-control hosting platform.
///
/// Implementations must be safe to call repeatedly: every method may be
/// retried once after a quota backoff, so none of them may perform writes.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Names of the organization's public repositories, excluding archived
    /// repositories and forks, in platform listing order.
    async fn list_repositories(&self) -> Result<Vec<String>, PlatformError>;

    /// Every team with any permission on `repository`, with the raw
    /// permission string the platform reports.
    async fn teams_with_access(&self, repository: &str)
        -> Result<Vec<TeamAccess>, PlatformError>;

    /// The parent of the team identified by `slug`, if it has one.
    async fn parent_team(&self, slug: &str) -> Result<Option<TeamRef>, PlatformError>;
}

/// Run `op`, retrying exactly once if it fails with quota exhaustion.
///
/// On the first [`PlatformError::QuotaExceeded`], sleeps until the reported
/// reset timestamp (floored at zero if it is already past) plus `buffer`,
/// then retries the same operation. A second quota failure — or any other
/// error — propagates to the caller unchanged.
///
/// Callers must only wrap idempotent (read-only) operations; the retry
/// re-executes the operation in full.
pub async fn with_quota_retry<T, F, Fut>(buffer: Duration, op: F) -> Result<T, PlatformError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(PlatformError::QuotaExceeded { resets_at }) => {
            let until_reset = (resets_at - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            let wait = until_reset + buffer;
            println!(
                "  quota exceeded, waiting {}s until reset before retrying",
                wait.as_secs()
            );
            tokio::time::sleep(wait).await;
            op().await
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quota_err() -> PlatformError {
        // Reset timestamp in the past, so the backoff sleep is zero-length.
        PlatformError::QuotaExceeded {
            resets_at: Utc::now() - chrono::Duration::seconds(30),
        }
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let calls = AtomicU32::new(0);
        let result = with_quota_retry(Duration::ZERO, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PlatformError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_once_after_quota() {
        let calls = AtomicU32::new(0);
        let result = with_quota_retry(Duration::ZERO, || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(quota_err())
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_quota_failure_propagates() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = with_quota_retry(Duration::ZERO, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(quota_err())
        })
        .await;
        assert!(result.unwrap_err().is_quota_exceeded());
        // Exactly two attempts, never a third.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_quota_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = with_quota_retry(Duration::ZERO, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PlatformError::Response("boom".to_string()))
        })
        .await;
        assert!(!result.unwrap_err().is_quota_exceeded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
