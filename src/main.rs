//! # Repo Steward CLI (`steward`)
//!
//! The `steward` binary drives the ownership reconciliation engine. It
//! provides commands for database initialization, running the batch
//! reconciliation pass, and inspecting the resulting ownership records.
//!
//! ## Usage
//!
//! ```bash
//! steward --config ./config/steward.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `steward init` | Create the SQLite database and run schema migrations |
//! | `steward reconcile` | Harvest, classify, and persist repository ownership |
//! | `steward assets --owner NAME` | List repositories an owner is authoritative for |
//! | `steward unowned` | List repositories with no owner relationships |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repo_steward::{config, db, github, migrate, reconcile, store};

/// Repo Steward — reconciles repository ownership on GitHub against an
/// owner registry.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file holding the database path, GitHub settings, and the owner catalog.
#[derive(Parser)]
#[command(
    name = "steward",
    about = "Repo Steward — reconciles GitHub repository ownership against an owner registry",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/steward.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the owner, asset, and
    /// relationship tables. Idempotent — running it multiple times is safe.
    Init,

    /// Run the batch reconciliation pass.
    ///
    /// Lists the organization's public repositories, harvests team access
    /// (including inherited parent-team permissions), classifies every
    /// (repository, owner) pair, and idempotently persists the results.
    Reconcile {
        /// Maximum number of repositories to process (overrides config).
        #[arg(long)]
        limit: Option<usize>,

        /// Harvest and classify without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// List repositories an owner is authoritative for.
    Assets {
        /// Owner name as configured in the owner catalog.
        #[arg(long)]
        owner: String,

        /// Only show repositories where the owner lacks admin access.
        #[arg(long)]
        missing_admin: bool,
    },

    /// List repositories persisted with no owner relationships.
    Unowned,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg.db).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Reconcile { limit, dry_run } => {
            let platform = github::GithubClient::new(&cfg.github)?;
            let pool = db::connect(&cfg.db).await?;
            reconcile::run_reconcile(&cfg, &platform, &pool, limit, dry_run).await?;
            pool.close().await;
        }
        Commands::Assets {
            owner,
            missing_admin,
        } => {
            let pool = db::connect(&cfg.db).await?;
            let store = store::OwnershipStore::new(pool.clone());
            let views = store.assets_for_owner(&owner, missing_admin).await?;
            println!("{:<48} ADMIN OWNERS", "REPOSITORY");
            for view in &views {
                println!("{:<48} {}", view.name, view.admin_owner_names.join(", "));
            }
            println!("{} repositories", views.len());
            pool.close().await;
        }
        Commands::Unowned => {
            let pool = db::connect(&cfg.db).await?;
            let store = store::OwnershipStore::new(pool.clone());
            let names = store.unowned_assets().await?;
            for name in &names {
                println!("{}", name);
            }
            println!("{} unowned repositories", names.len());
            pool.close().await;
        }
    }

    Ok(())
}
