//! The ownership rule engine.
//!
//! Classifies one (repository, owner) pair into an access verdict. The
//! decision order is fixed, first match wins:
//!
//! 1. any owner team in the repository's direct or inherited admin sets →
//!    [`AccessLevel::Admin`]
//! 2. any owner team in the any-access sets, or the owner's name prefix
//!    matching the repository name → [`AccessLevel::Other`]
//! 3. otherwise → [`AccessLevel::None`]
//!
//! Team comparison is exact string equality against the platform's canonical
//! team names. A misspelled team in the owner registry silently classifies
//! as None; the only operator-visible symptom is the repository turning up
//! in the unowned report.

use crate::config::OwnerSpec;
use crate::models::{AccessLevel, AccessVerdict, RepositoryAccess};

/// Classify the level `owner` holds on the harvested repository.
pub fn classify(access: &RepositoryAccess, owner: &OwnerSpec) -> AccessLevel {
    let in_any = |set: &std::collections::HashSet<String>| {
        owner.teams.iter().any(|team| set.contains(team))
    };

    if in_any(&access.admin_direct) || in_any(&access.admin_inherited) {
        return AccessLevel::Admin;
    }

    let prefix_matches = owner
        .prefix
        .as_deref()
        .is_some_and(|prefix| access.name.starts_with(prefix));

    if in_any(&access.any_direct) || in_any(&access.any_inherited) || prefix_matches {
        return AccessLevel::Other;
    }

    AccessLevel::None
}

/// Classify a repository against every owner in the catalog, producing
/// exactly one verdict per (repository, owner) pair.
pub fn classify_all(access: &RepositoryAccess, owners: &[OwnerSpec]) -> Vec<AccessVerdict> {
    owners
        .iter()
        .map(|owner| AccessVerdict {
            repository: access.name.clone(),
            owner: owner.name.clone(),
            level: classify(access, owner),
        })
        .collect()
}
