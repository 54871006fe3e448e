//! Authoritative-owner reduction.
//!
//! Many owners can legitimately hold access to one repository; authority is
//! the view layered on top that decides who is primarily responsible. An
//! owner is authoritative iff it holds admin access, or it holds other
//! access while no owner at all holds admin (the no-admin-exists escape
//! clause). This module never persists anything — the store records every
//! non-None verdict, and authority is recomputed wherever it is displayed.

use crate::models::{AccessLevel, AccessVerdict};

/// The shared authority predicate, also used by the store's read views.
pub fn is_authoritative(owner_has_admin: bool, owner_has_other: bool, any_admin_exists: bool) -> bool {
    owner_has_admin || (owner_has_other && !any_admin_exists)
}

/// Informational anomalies surfaced alongside the authoritative set. Neither
/// is an error; both feed operator-facing run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// No owner matched at all. The repository is still recorded as an asset
    /// with zero relationships.
    Unowned,
    /// More than one owner holds admin access. All of them are authoritative
    /// simultaneously; flagged for operator visibility.
    MultipleAdmins(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct AuthorityOutcome {
    pub authoritative: Vec<String>,
    pub anomaly: Option<Anomaly>,
}

/// Reduce all verdicts for one repository to its authoritative owner set.
pub fn resolve(verdicts: &[AccessVerdict]) -> AuthorityOutcome {
    let admins: Vec<&str> = verdicts
        .iter()
        .filter(|v| v.level == AccessLevel::Admin)
        .map(|v| v.owner.as_str())
        .collect();

    let authoritative: Vec<String> = verdicts
        .iter()
        .filter(|v| {
            is_authoritative(
                v.level == AccessLevel::Admin,
                v.level == AccessLevel::Other,
                !admins.is_empty(),
            )
        })
        .map(|v| v.owner.clone())
        .collect();

    let anomaly = if authoritative.is_empty() {
        Some(Anomaly::Unowned)
    } else if admins.len() > 1 {
        Some(Anomaly::MultipleAdmins(
            admins.iter().map(|s| s.to_string()).collect(),
        ))
    } else {
        None
    };

    AuthorityOutcome {
        authoritative,
        anomaly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(owner: &str, level: AccessLevel) -> AccessVerdict {
        AccessVerdict {
            repository: "some-repo".to_string(),
            owner: owner.to_string(),
            level,
        }
    }

    #[test]
    fn test_sole_other_owner_is_authoritative() {
        let outcome = resolve(&[
            verdict("HMPPS", AccessLevel::Other),
            verdict("LAA", AccessLevel::None),
        ]);
        assert_eq!(outcome.authoritative, vec!["HMPPS".to_string()]);
        assert_eq!(outcome.anomaly, None);
    }

    #[test]
    fn test_admin_displaces_other_owners() {
        let outcome = resolve(&[
            verdict("HMPPS", AccessLevel::Other),
            verdict("LAA", AccessLevel::Admin),
        ]);
        assert_eq!(outcome.authoritative, vec!["LAA".to_string()]);
        assert_eq!(outcome.anomaly, None);
    }

    #[test]
    fn test_co_admins_are_all_authoritative_and_flagged() {
        let outcome = resolve(&[
            verdict("HMPPS", AccessLevel::Admin),
            verdict("LAA", AccessLevel::Admin),
            verdict("OPG", AccessLevel::Other),
        ]);
        assert_eq!(
            outcome.authoritative,
            vec!["HMPPS".to_string(), "LAA".to_string()]
        );
        assert_eq!(
            outcome.anomaly,
            Some(Anomaly::MultipleAdmins(vec![
                "HMPPS".to_string(),
                "LAA".to_string()
            ]))
        );
    }

    #[test]
    fn test_zero_owners_is_unowned() {
        let outcome = resolve(&[
            verdict("HMPPS", AccessLevel::None),
            verdict("LAA", AccessLevel::None),
        ]);
        assert!(outcome.authoritative.is_empty());
        assert_eq!(outcome.anomaly, Some(Anomaly::Unowned));
    }

    #[test]
    fn test_multiple_other_owners_share_authority_without_flag() {
        let outcome = resolve(&[
            verdict("HMPPS", AccessLevel::Other),
            verdict("LAA", AccessLevel::Other),
        ]);
        assert_eq!(
            outcome.authoritative,
            vec!["HMPPS".to_string(), "LAA".to_string()]
        );
        assert_eq!(outcome.anomaly, None);
    }
}
