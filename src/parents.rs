//! Parent-team chain resolution with per-run memoization.
//!
//! Teams inherit repository permissions from their ancestors, so harvesting
//! has to expand every team into its full parent chain. Parent lookups are a
//! remote call each, and the same teams appear on many repositories, so the
//! resolver caches chains by slug for the lifetime of one run. The cache is
//! an owned map on the resolver — constructed at run start and dropped with
//! it — because teams can be restructured between runs.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;

use crate::error::DataError;
use crate::models::TeamRef;
use crate::platform::{with_quota_retry, Platform};

pub struct ParentChainResolver {
    cache: HashMap<String, Vec<TeamRef>>,
    max_depth: usize,
    quota_buffer: Duration,
}

impl ParentChainResolver {
    pub fn new(max_depth: usize, quota_buffer: Duration) -> Self {
        Self {
            cache: HashMap::new(),
            max_depth,
            quota_buffer,
        }
    }

    /// The ordered ancestor chain of `team`, nearest parent first.
    ///
    /// Walks `parent_team` until a team has no parent, bounded at
    /// `max_depth` steps. The platform's team graph is expected to be a
    /// finite DAG; hitting the bound means it almost certainly is not, and
    /// the walk fails with [`DataError::ParentChainTooDeep`] rather than
    /// looping.
    pub async fn resolve(
        &mut self,
        platform: &dyn Platform,
        team: &TeamRef,
    ) -> Result<Vec<TeamRef>> {
        if let Some(chain) = self.cache.get(&team.slug) {
            return Ok(chain.clone());
        }

        let mut chain = Vec::new();
        let mut current = team.clone();

        loop {
            if chain.len() >= self.max_depth {
                return Err(DataError::ParentChainTooDeep {
                    team: team.name.clone(),
                    max_depth: self.max_depth,
                }
                .into());
            }

            let parent =
                with_quota_retry(self.quota_buffer, || platform.parent_team(&current.slug))
                    .await?;

            match parent {
                Some(parent) => {
                    chain.push(parent.clone());
                    current = parent;
                }
                None => break,
            }
        }

        self.cache.insert(team.slug.clone(), chain.clone());
        Ok(chain)
    }
}
