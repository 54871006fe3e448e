//! Per-repository team-access harvesting.
//!
//! For one repository, the harvester enumerates every team with access,
//! skips configured ignore-list teams, and builds the four access sets the
//! rule engine classifies against: direct and inherited admin access, and
//! direct and inherited any-permission access. Ancestor expansion goes
//! through [`ParentChainResolver`]; every remote call goes through the
//! quota-retry policy.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;

use crate::models::RepositoryAccess;
use crate::parents::ParentChainResolver;
use crate::platform::{with_quota_retry, Platform};

/// Permission strings the platform is known to report. Anything else is
/// treated as no recognized access at all.
const ADMIN_PERMISSIONS: &[&str] = &["admin"];
const ANY_PERMISSIONS: &[&str] = &["admin", "maintain", "push", "write", "triage", "pull", "read"];

pub struct AccessHarvester<'a> {
    platform: &'a dyn Platform,
    parents: ParentChainResolver,
    ignored_teams: HashSet<String>,
    quota_buffer: Duration,
}

impl<'a> AccessHarvester<'a> {
    pub fn new(
        platform: &'a dyn Platform,
        parents: ParentChainResolver,
        ignored_teams: impl IntoIterator<Item = String>,
        quota_buffer: Duration,
    ) -> Self {
        Self {
            platform,
            parents,
            ignored_teams: ignored_teams.into_iter().collect(),
            quota_buffer,
        }
    }

    /// Harvest the access sets for one repository.
    ///
    /// A team with admin permission lands in `admin_direct` and its ancestor
    /// chain in `admin_inherited`; a team with any recognized permission
    /// lands in `any_direct`/`any_inherited`. The `any_*` sets are therefore
    /// supersets of the `admin_*` sets.
    pub async fn harvest(&mut self, repository: &str) -> Result<RepositoryAccess> {
        let mut access = RepositoryAccess::new(repository);

        let teams = with_quota_retry(self.quota_buffer, || {
            self.platform.teams_with_access(repository)
        })
        .await?;

        for entry in teams {
            if self.ignored_teams.contains(&entry.team.name) {
                continue;
            }

            let permission = entry.permission.as_str();
            if !ANY_PERMISSIONS.contains(&permission) {
                continue;
            }

            let chain = self.parents.resolve(self.platform, &entry.team).await?;

            if ADMIN_PERMISSIONS.contains(&permission) {
                access.admin_direct.insert(entry.team.name.clone());
                access
                    .admin_inherited
                    .extend(chain.iter().map(|t| t.name.clone()));
            }

            access.any_direct.insert(entry.team.name.clone());
            access
                .any_inherited
                .extend(chain.iter().map(|t| t.name.clone()));
        }

        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error::PlatformError;
    use crate::models::{TeamAccess, TeamRef};

    struct FakePlatform {
        teams: Vec<TeamAccess>,
        parents: HashMap<String, String>,
        /// Fail the first N `teams_with_access` calls with quota exhaustion.
        quota_failures: AtomicU32,
        teams_calls: AtomicU32,
    }

    impl FakePlatform {
        fn new(teams: Vec<TeamAccess>, parents: &[(&str, &str)]) -> Self {
            Self {
                teams,
                parents: parents
                    .iter()
                    .map(|(c, p)| (c.to_string(), p.to_string()))
                    .collect(),
                quota_failures: AtomicU32::new(0),
                teams_calls: AtomicU32::new(0),
            }
        }

        fn failing_quota(times: u32) -> Self {
            let platform = Self::new(vec![], &[]);
            platform.quota_failures.store(times, Ordering::SeqCst);
            platform
        }
    }

    fn access(name: &str, permission: &str) -> TeamAccess {
        TeamAccess {
            team: TeamRef::new(name, name),
            permission: permission.to_string(),
        }
    }

    #[async_trait]
    impl Platform for FakePlatform {
        async fn list_repositories(&self) -> Result<Vec<String>, PlatformError> {
            Ok(vec![])
        }

        async fn teams_with_access(
            &self,
            _repository: &str,
        ) -> Result<Vec<TeamAccess>, PlatformError> {
            self.teams_calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.quota_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.quota_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(PlatformError::QuotaExceeded {
                    resets_at: chrono::Utc::now() - chrono::Duration::seconds(1),
                });
            }
            Ok(self.teams.clone())
        }

        async fn parent_team(&self, slug: &str) -> Result<Option<TeamRef>, PlatformError> {
            Ok(self
                .parents
                .get(slug)
                .map(|p| TeamRef::new(p.clone(), p.clone())))
        }
    }

    fn harvester(platform: &FakePlatform) -> AccessHarvester<'_> {
        AccessHarvester::new(
            platform,
            ParentChainResolver::new(32, Duration::ZERO),
            vec!["org-auditors".to_string()],
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_admin_team_lands_in_all_four_sets() {
        let platform = FakePlatform::new(
            vec![access("HMPPS Developers", "admin")],
            &[("HMPPS Developers", "HMPPS Tech")],
        );
        let mut harvester = harvester(&platform);

        let result = harvester.harvest("hmpps-auth").await.unwrap();
        assert!(result.admin_direct.contains("HMPPS Developers"));
        assert!(result.admin_inherited.contains("HMPPS Tech"));
        assert!(result.any_direct.contains("HMPPS Developers"));
        assert!(result.any_inherited.contains("HMPPS Tech"));
    }

    #[tokio::test]
    async fn test_write_team_is_any_but_not_admin() {
        let platform = FakePlatform::new(
            vec![access("LAA Developers", "push")],
            &[("LAA Developers", "LAA")],
        );
        let mut harvester = harvester(&platform);

        let result = harvester.harvest("laa-api").await.unwrap();
        assert!(result.admin_direct.is_empty());
        assert!(result.admin_inherited.is_empty());
        assert!(result.any_direct.contains("LAA Developers"));
        assert!(result.any_inherited.contains("LAA"));
    }

    #[tokio::test]
    async fn test_ignored_team_contributes_nothing() {
        let platform = FakePlatform::new(vec![access("org-auditors", "admin")], &[]);
        let mut harvester = harvester(&platform);

        let result = harvester.harvest("some-repo").await.unwrap();
        assert!(result.admin_direct.is_empty());
        assert!(result.any_direct.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_permission_contributes_nothing() {
        let platform = FakePlatform::new(vec![access("Some Team", "superpowers")], &[]);
        let mut harvester = harvester(&platform);

        let result = harvester.harvest("some-repo").await.unwrap();
        assert!(result.any_direct.is_empty());
    }

    #[tokio::test]
    async fn test_single_quota_failure_is_retried() {
        let platform = FakePlatform::failing_quota(1);
        let mut harvester = harvester(&platform);

        let result = harvester.harvest("some-repo").await.unwrap();
        assert!(result.any_direct.is_empty());
        assert_eq!(platform.teams_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_double_quota_failure_is_fatal() {
        let platform = FakePlatform::failing_quota(2);
        let mut harvester = harvester(&platform);

        let err = harvester.harvest("some-repo").await.unwrap_err();
        let platform_err = err
            .downcast_ref::<PlatformError>()
            .expect("expected PlatformError");
        assert!(platform_err.is_quota_exceeded());
        // Two attempts, no third.
        assert_eq!(platform.teams_calls.load(Ordering::SeqCst), 2);
    }
}
