//! Core data types used throughout repo-steward.
//!
//! These types represent the harvested access data, classification verdicts,
//! and reporting views that flow through the reconciliation pipeline.

use std::collections::{BTreeMap, HashSet};

/// Access level an owner holds on a repository, as decided by the rule engine.
///
/// `Admin` and `Other` are persisted as relationship rows; `None` is never
/// written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Admin,
    Other,
    None,
}

impl AccessLevel {
    /// The relationship `type` column value for this level, if it persists.
    pub fn relationship_type(self) -> Option<&'static str> {
        match self {
            AccessLevel::Admin => Some("ADMIN_ACCESS"),
            AccessLevel::Other => Some("OTHER"),
            AccessLevel::None => None,
        }
    }
}

/// A team as named by the platform.
///
/// `name` is the display name owners are configured against; `slug` is the
/// stable identifier used for parent lookups. Matching is exact on `name` —
/// no case folding or trimming is applied anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub name: String,
    pub slug: String,
}

impl TeamRef {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// A team's permission on a repository, as reported by the platform.
#[derive(Debug, Clone)]
pub struct TeamAccess {
    pub team: TeamRef,
    /// Raw permission string (e.g. `"admin"`, `"push"`). Parsed by the
    /// harvester; unrecognized values contribute nothing.
    pub permission: String,
}

/// Harvested team-access data for one repository. Produced fresh each run,
/// never persisted as-is.
///
/// `any_direct`/`any_inherited` are supersets of the corresponding `admin_*`
/// sets by construction.
#[derive(Debug, Clone, Default)]
pub struct RepositoryAccess {
    pub name: String,
    pub admin_direct: HashSet<String>,
    pub admin_inherited: HashSet<String>,
    pub any_direct: HashSet<String>,
    pub any_inherited: HashSet<String>,
}

impl RepositoryAccess {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One classification result: the level `owner` holds on `repository`.
/// Exactly one verdict exists per (repository, owner) pair per run.
#[derive(Debug, Clone)]
pub struct AccessVerdict {
    pub repository: String,
    pub owner: String,
    pub level: AccessLevel,
}

/// Read model over persisted assets: the asset name plus the names of every
/// owner holding a relationship, and the subset holding admin access.
#[derive(Debug, Clone)]
pub struct AssetView {
    pub name: String,
    pub owner_names: Vec<String>,
    pub admin_owner_names: Vec<String>,
}

/// Summary of one reconciliation run, printed at the end of `reconcile` and
/// consumed by surrounding job runners.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub repositories_processed: u64,
    pub relationships_created: u64,
    pub relationships_updated: u64,
    pub relationships_unchanged: u64,
    pub unowned: u64,
    pub multiple_admin: u64,
    /// Repositories each owner is authoritative for, in stable name order.
    pub authoritative_by_owner: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_type_mapping() {
        assert_eq!(AccessLevel::Admin.relationship_type(), Some("ADMIN_ACCESS"));
        assert_eq!(AccessLevel::Other.relationship_type(), Some("OTHER"));
        assert_eq!(AccessLevel::None.relationship_type(), None);
    }
}
