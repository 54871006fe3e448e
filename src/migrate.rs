use anyhow::Result;
use sqlx::SqlitePool;

/// Create the persistence schema. Idempotent — `steward init` can be run
/// any number of times.
///
/// `asset.name` intentionally carries no UNIQUE constraint: uniqueness is
/// enforced by the store's lookup-before-write step, and a duplicate found
/// there is reported as a data-integrity fault instead of being silently
/// rejected at insert time.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS owner (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS asset (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL DEFAULT 'REPOSITORY'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS relationship (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            asset_id INTEGER NOT NULL REFERENCES asset(id),
            owner_id INTEGER NOT NULL REFERENCES owner(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_asset_name ON asset(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_owner_name ON owner(name)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_relationship_asset_owner ON relationship(asset_id, owner_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
