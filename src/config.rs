use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub github: GithubConfig,
    pub owners: Vec<OwnerSpec>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// Organization whose repositories are reconciled.
    pub org: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Maximum repositories to process per run; 0 means unlimited.
    #[serde(default)]
    pub repo_limit: usize,
    /// Team names to skip while harvesting (e.g. org-wide auditor teams
    /// that hold access on every repository).
    #[serde(default)]
    pub ignored_teams: Vec<String>,
    /// Extra seconds to wait past the platform's quota reset timestamp.
    #[serde(default = "default_quota_buffer_secs")]
    pub quota_buffer_secs: u64,
    /// Hard bound on parent-chain walks; exceeding it is a fatal data error.
    #[serde(default = "default_max_parent_depth")]
    pub max_parent_depth: usize,
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_quota_buffer_secs() -> u64 {
    5
}
fn default_max_parent_depth() -> usize {
    32
}

/// One organizational owner: the teams it claims and an optional repository
/// name prefix used as a fuzzy-match fallback. Loaded once per run, never
/// mutated during resolution.
#[derive(Debug, Deserialize, Clone)]
pub struct OwnerSpec {
    pub name: String,
    pub teams: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.github.org.is_empty() {
        anyhow::bail!("github.org must not be empty");
    }

    if config.github.max_parent_depth == 0 {
        anyhow::bail!("github.max_parent_depth must be >= 1");
    }

    if config.owners.is_empty() {
        anyhow::bail!("at least one [[owners]] entry is required");
    }

    let mut seen = HashSet::new();
    for owner in &config.owners {
        if owner.name.is_empty() {
            anyhow::bail!("owner names must not be empty");
        }
        if !seen.insert(owner.name.as_str()) {
            anyhow::bail!("duplicate owner name: '{}'", owner.name);
        }
    }

    Ok(config)
}
