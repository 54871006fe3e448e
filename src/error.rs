//! Error taxonomy for the reconciliation engine.
//!
//! Two families matter to callers and are therefore typed rather than
//! stringly `anyhow` errors:
//!
//! - [`PlatformError`] — remote-platform failures. `QuotaExceeded` is the
//!   only transient variant; the retry helper in [`crate::platform`] matches
//!   on it and everything else fails immediately.
//! - [`DataError`] — data-integrity faults. Always fatal; the run aborts and
//!   the message names the offending identifier.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure talking to the source-control platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform's request quota is exhausted. Carries the timestamp at
    /// which the quota window resets.
    #[error("platform quota exceeded, resets at {resets_at}")]
    QuotaExceeded { resets_at: DateTime<Utc> },

    #[error("platform request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform answered with a non-success status or a body we could
    /// not interpret. Never retried.
    #[error("unexpected platform response: {0}")]
    Response(String),
}

impl PlatformError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, PlatformError::QuotaExceeded { .. })
    }
}

/// Integrity fault in harvested or persisted data. Fatal, no recovery.
#[derive(Debug, Error)]
pub enum DataError {
    /// The parent chain of `team` exceeded the configured depth bound, which
    /// almost certainly means the team-parent graph contains a cycle.
    #[error("parent chain of team '{team}' exceeded depth {max_depth}; the team hierarchy is likely cyclic")]
    ParentChainTooDeep { team: String, max_depth: usize },

    /// More than one asset row matched a single repository name. The store
    /// refuses to guess which row to reconcile against.
    #[error("asset name '{name}' matches {count} rows; refusing to reconcile")]
    DuplicateAsset { name: String, count: usize },
}
