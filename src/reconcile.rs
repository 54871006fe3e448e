//! The batch reconciliation pipeline.
//!
//! One pass over every repository the platform lists: harvest team access,
//! classify against the owner catalog, persist the verdicts, and reduce them
//! to authoritative owners for the run report. Strictly sequential — the
//! quota backoff contract is run-global, so there is no parallel fan-out. A
//! fatal error mid-run leaves previously reconciled repositories durably
//! committed.

use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;

use crate::authority::{self, Anomaly};
use crate::classify::classify_all;
use crate::config::Config;
use crate::harvest::AccessHarvester;
use crate::models::RunReport;
use crate::parents::ParentChainResolver;
use crate::platform::{with_quota_retry, Platform};
use crate::store::OwnershipStore;

/// Run the full reconciliation batch and return its report.
///
/// `limit` overrides the configured `repo_limit` when set. Under `dry_run`
/// the harvest and classification run in full but nothing is written.
pub async fn run_reconcile(
    config: &Config,
    platform: &dyn Platform,
    pool: &SqlitePool,
    limit: Option<usize>,
    dry_run: bool,
) -> Result<RunReport> {
    let quota_buffer = Duration::from_secs(config.github.quota_buffer_secs);
    let store = OwnershipStore::new(pool.clone());

    let owner_ids = if dry_run {
        None
    } else {
        Some(store.sync_owners(&config.owners).await?)
    };

    let mut repositories =
        with_quota_retry(quota_buffer, || platform.list_repositories()).await?;

    let cap = limit.unwrap_or(config.github.repo_limit);
    if cap > 0 {
        repositories.truncate(cap);
    }
    println!(
        "reconcile {}{}",
        config.github.org,
        if dry_run { " (dry-run)" } else { "" }
    );
    println!("  repositories to process: {}", repositories.len());

    let mut harvester = AccessHarvester::new(
        platform,
        ParentChainResolver::new(config.github.max_parent_depth, quota_buffer),
        config.github.ignored_teams.iter().cloned(),
        quota_buffer,
    );

    let mut report = RunReport::default();
    for owner in &config.owners {
        report.authoritative_by_owner.insert(owner.name.clone(), 0);
    }

    let total = repositories.len();
    for (index, repository) in repositories.iter().enumerate() {
        println!("  [{}/{}] {}", index + 1, total, repository);

        let access = harvester.harvest(repository).await?;
        let verdicts = classify_all(&access, &config.owners);

        if let Some(ref owner_ids) = owner_ids {
            let persisted: Vec<(i64, _)> = verdicts
                .iter()
                .map(|v| (owner_ids[&v.owner], v.level))
                .collect();
            let counts = store.reconcile_repository(repository, &persisted).await?;
            report.relationships_created += counts.created;
            report.relationships_updated += counts.updated;
            report.relationships_unchanged += counts.unchanged;
        }

        let outcome = authority::resolve(&verdicts);
        for owner in &outcome.authoritative {
            *report
                .authoritative_by_owner
                .entry(owner.clone())
                .or_default() += 1;
        }
        match outcome.anomaly {
            Some(Anomaly::Unowned) => report.unowned += 1,
            Some(Anomaly::MultipleAdmins(ref owners)) => {
                println!("    multiple admin owners: {}", owners.join(", "));
                report.multiple_admin += 1;
            }
            None => {}
        }

        report.repositories_processed += 1;
    }

    print_report(&report, dry_run);
    Ok(report)
}

fn print_report(report: &RunReport, dry_run: bool) {
    println!("  repositories processed: {}", report.repositories_processed);
    if !dry_run {
        println!(
            "  relationships created: {}, updated: {}, unchanged: {}",
            report.relationships_created,
            report.relationships_updated,
            report.relationships_unchanged
        );
    }
    println!("  unowned repositories: {}", report.unowned);
    println!(
        "  repositories with multiple admin owners: {}",
        report.multiple_admin
    );
    println!("  authoritative repositories by owner:");
    for (owner, count) in &report.authoritative_by_owner {
        println!("    {:<24} {}", owner, count);
    }
    println!("ok");
}
