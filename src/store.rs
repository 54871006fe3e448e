//! Idempotent persistence of assets, owners, and relationships.
//!
//! The central invariant: at most one relationship row exists per
//! (asset, owner) pair. It is enforced by lookup-before-write inside a
//! per-repository transaction, not by a uniqueness constraint — the batch is
//! single-threaded and concurrent writers are out of scope. Running the
//! whole pipeline twice on unchanged inputs produces zero writes the second
//! time.
//!
//! Also hosts the read views the reporting commands consume; authority is
//! computed at view time with the predicate from [`crate::authority`].

use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqlitePool;

use crate::authority::is_authoritative;
use crate::config::OwnerSpec;
use crate::error::DataError;
use crate::models::{AccessLevel, AssetView};

pub struct OwnershipStore {
    pool: SqlitePool,
}

/// Write counts for one `reconcile_repository` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
}

impl OwnershipStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Find-or-create an owner row for every configured owner. Returns the
    /// owner name → id mapping used for the rest of the run. Owner rows not
    /// present in the catalog are left untouched.
    pub async fn sync_owners(&self, owners: &[OwnerSpec]) -> Result<HashMap<String, i64>> {
        let mut ids = HashMap::new();

        for owner in owners {
            let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM owner WHERE name = ?")
                .bind(&owner.name)
                .fetch_optional(&self.pool)
                .await?;

            let id = match existing {
                Some(id) => id,
                None => {
                    sqlx::query("INSERT INTO owner (name) VALUES (?)")
                        .bind(&owner.name)
                        .execute(&self.pool)
                        .await?
                        .last_insert_rowid()
                }
            };

            ids.insert(owner.name.clone(), id);
        }

        Ok(ids)
    }

    /// Reconcile one repository's verdicts in a single transaction.
    ///
    /// The asset row is looked up or created first — an unowned repository
    /// is still recorded as an asset with zero relationships. For each
    /// non-None verdict the relationship row is created, updated in place
    /// when its type changed, or left alone when it already matches.
    pub async fn reconcile_repository(
        &self,
        repository: &str,
        verdicts: &[(i64, AccessLevel)],
    ) -> Result<ReconcileCounts> {
        let mut tx = self.pool.begin().await?;
        let mut counts = ReconcileCounts::default();

        let asset_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM asset WHERE name = ?")
            .bind(repository)
            .fetch_all(&mut *tx)
            .await?;

        let asset_id = match asset_ids.len() {
            0 => {
                sqlx::query("INSERT INTO asset (name, type) VALUES (?, 'REPOSITORY')")
                    .bind(repository)
                    .execute(&mut *tx)
                    .await?
                    .last_insert_rowid()
            }
            1 => asset_ids[0],
            count => {
                return Err(DataError::DuplicateAsset {
                    name: repository.to_string(),
                    count,
                }
                .into());
            }
        };

        for &(owner_id, level) in verdicts {
            let Some(relationship_type) = level.relationship_type() else {
                continue;
            };

            let existing: Option<(i64, String)> = sqlx::query_as(
                "SELECT id, type FROM relationship WHERE asset_id = ? AND owner_id = ?",
            )
            .bind(asset_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

            match existing {
                None => {
                    sqlx::query(
                        "INSERT INTO relationship (type, asset_id, owner_id) VALUES (?, ?, ?)",
                    )
                    .bind(relationship_type)
                    .bind(asset_id)
                    .bind(owner_id)
                    .execute(&mut *tx)
                    .await?;
                    counts.created += 1;
                }
                Some((_, ref existing_type)) if existing_type.as_str() == relationship_type => {
                    counts.unchanged += 1;
                }
                Some((relationship_id, _)) => {
                    sqlx::query("UPDATE relationship SET type = ? WHERE id = ?")
                        .bind(relationship_type)
                        .bind(relationship_id)
                        .execute(&mut *tx)
                        .await?;
                    counts.updated += 1;
                }
            }
        }

        tx.commit().await?;
        Ok(counts)
    }

    /// Assets the named owner is authoritative for, optionally restricted to
    /// those where the owner holds no admin relationship.
    pub async fn assets_for_owner(
        &self,
        owner: &str,
        missing_admin_only: bool,
    ) -> Result<Vec<AssetView>> {
        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            r#"
            SELECT a.id, a.name, o.name, r.type
            FROM asset a
            JOIN relationship r ON r.asset_id = a.id
            JOIN owner o ON o.id = r.owner_id
            WHERE a.id IN (
                SELECT r2.asset_id
                FROM relationship r2
                JOIN owner o2 ON o2.id = r2.owner_id
                WHERE o2.name = ?
            )
            ORDER BY a.id, o.id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut views: Vec<AssetView> = Vec::new();
        let mut last_asset_id = None;
        for (asset_id, asset_name, owner_name, relationship_type) in rows {
            if last_asset_id != Some(asset_id) {
                views.push(AssetView {
                    name: asset_name,
                    owner_names: Vec::new(),
                    admin_owner_names: Vec::new(),
                });
                last_asset_id = Some(asset_id);
            }
            let view = views.last_mut().expect("pushed above");
            if relationship_type == "ADMIN_ACCESS" {
                view.admin_owner_names.push(owner_name.clone());
            }
            view.owner_names.push(owner_name);
        }

        views.retain(|view| {
            let has_admin = view.admin_owner_names.iter().any(|n| n == owner);
            let has_other = view.owner_names.iter().any(|n| n == owner);
            is_authoritative(has_admin, has_other, !view.admin_owner_names.is_empty())
        });

        if missing_admin_only {
            views.retain(|view| !view.admin_owner_names.iter().any(|n| n == owner));
        }

        Ok(views)
    }

    /// Names of assets with no relationship rows at all.
    pub async fn unowned_assets(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM asset
            WHERE id NOT IN (SELECT asset_id FROM relationship)
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
