//! # Repo Steward
//!
//! Reconciles organizational ownership of GitHub repositories against a
//! registry of owners (business units and teams).
//!
//! Repo Steward harvests team-permission data per repository — including
//! permissions inherited from parent teams — classifies each
//! (repository, owner) pair into an access verdict, resolves which owners
//! hold authoritative responsibility, and idempotently persists the result
//! as asset/owner/relationship records in SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌───────────┐   ┌──────────┐
//! │   GitHub    │──▶│  Harvester  │──▶│ Rule      │──▶│  SQLite   │
//! │ repos/teams │   │ + parents   │   │ engine +  │   │ asset /  │
//! │  (REST v3)  │   │   cache     │   │ authority │   │ relation │
//! └─────────────┘   └─────────────┘   └───────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! steward init                  # create database
//! steward reconcile             # run the batch pass
//! steward assets --owner HMPPS  # repositories HMPPS is authoritative for
//! steward unowned               # repositories nobody owns
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Typed platform and data-integrity errors |
//! | [`platform`] | Platform capability trait and quota-retry policy |
//! | [`github`] | GitHub REST client |
//! | [`parents`] | Memoized parent-team chain resolution |
//! | [`harvest`] | Per-repository access harvesting |
//! | [`classify`] | Ownership rule engine |
//! | [`authority`] | Authoritative-owner reduction |
//! | [`store`] | Idempotent asset/owner/relationship persistence |
//! | [`reconcile`] | Batch pipeline orchestration |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod authority;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod github;
pub mod harvest;
pub mod migrate;
pub mod models;
pub mod parents;
pub mod platform;
pub mod reconcile;
pub mod store;
