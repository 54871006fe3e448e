//! GitHub REST implementation of the [`Platform`] seam.
//!
//! Talks to the GitHub v3 API with a bearer token read from the environment.
//! Listing endpoints are paginated at 100 items per page. Responses carrying
//! rate-limit exhaustion (403/429 with `x-ratelimit-remaining: 0`) map to
//! [`PlatformError::QuotaExceeded`] with the window's reset timestamp, so
//! the shared retry policy can back off until the quota returns. All other
//! non-success statuses fail immediately.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::GithubConfig;
use crate::error::PlatformError;
use crate::models::{TeamAccess, TeamRef};
use crate::platform::Platform;

const PER_PAGE: usize = 100;

pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    org: String,
    token: String,
}

impl GithubClient {
    /// Build a client from configuration. Fails if the token environment
    /// variable is unset, so a misconfigured run dies before any harvesting.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", config.token_env))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("repo-steward")
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            org: config.org.clone(),
            token,
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, PlatformError> {
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 403 || status.as_u16() == 429 {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok());
            if remaining == Some("0") {
                let resets_at = response
                    .headers()
                    .get("x-ratelimit-reset")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<i64>().ok())
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                    .unwrap_or_else(Utc::now);
                return Err(PlatformError::QuotaExceeded { resets_at });
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Response(format!(
                "{} from {}: {}",
                status, url, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch every page of a listing endpoint and concatenate the arrays.
    async fn get_paginated(&self, base_url: &str) -> Result<Vec<Value>, PlatformError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let sep = if base_url.contains('?') { '&' } else { '?' };
            let url = format!("{}{}per_page={}&page={}", base_url, sep, PER_PAGE, page);
            let json = self.get_json(&url).await?;
            let batch = json.as_array().ok_or_else(|| {
                PlatformError::Response(format!("expected array from {}", url))
            })?;

            let batch_len = batch.len();
            items.extend(batch.iter().cloned());

            if batch_len < PER_PAGE {
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl Platform for GithubClient {
    async fn list_repositories(&self) -> Result<Vec<String>, PlatformError> {
        let url = format!("{}/orgs/{}/repos?type=public", self.api_base, self.org);
        let items = self.get_paginated(&url).await?;
        parse_repositories(&items)
    }

    async fn teams_with_access(
        &self,
        repository: &str,
    ) -> Result<Vec<TeamAccess>, PlatformError> {
        let url = format!("{}/repos/{}/{}/teams", self.api_base, self.org, repository);
        let items = self.get_paginated(&url).await?;
        parse_teams(&items)
    }

    async fn parent_team(&self, slug: &str) -> Result<Option<TeamRef>, PlatformError> {
        let url = format!("{}/orgs/{}/teams/{}", self.api_base, self.org, slug);
        let json = self.get_json(&url).await?;
        Ok(parse_parent(&json))
    }
}

/// Names of public repositories that are neither archived nor forks, in
/// listing order.
fn parse_repositories(items: &[Value]) -> Result<Vec<String>, PlatformError> {
    let mut names = Vec::new();
    for item in items {
        let archived = item.get("archived").and_then(Value::as_bool).unwrap_or(false);
        let fork = item.get("fork").and_then(Value::as_bool).unwrap_or(false);
        if archived || fork {
            continue;
        }
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::Response("repository item missing name".to_string()))?;
        names.push(name.to_string());
    }
    Ok(names)
}

fn parse_teams(items: &[Value]) -> Result<Vec<TeamAccess>, PlatformError> {
    let mut teams = Vec::new();
    for item in items {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::Response("team item missing name".to_string()))?;
        let slug = item
            .get("slug")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::Response("team item missing slug".to_string()))?;
        let permission = item
            .get("permission")
            .and_then(Value::as_str)
            .unwrap_or_default();
        teams.push(TeamAccess {
            team: TeamRef::new(name, slug),
            permission: permission.to_string(),
        });
    }
    Ok(teams)
}

fn parse_parent(team: &Value) -> Option<TeamRef> {
    let parent = team.get("parent")?;
    let name = parent.get("name").and_then(Value::as_str)?;
    let slug = parent.get("slug").and_then(Value::as_str)?;
    Some(TeamRef::new(name, slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_repositories_skips_archived_and_forks() {
        let items = vec![
            json!({"name": "hmpps-auth", "archived": false, "fork": false}),
            json!({"name": "old-thing", "archived": true, "fork": false}),
            json!({"name": "someones-fork", "archived": false, "fork": true}),
        ];
        let names = parse_repositories(&items).unwrap();
        assert_eq!(names, vec!["hmpps-auth"]);
    }

    #[test]
    fn test_parse_repositories_rejects_nameless_item() {
        let items = vec![json!({"archived": false, "fork": false})];
        assert!(parse_repositories(&items).is_err());
    }

    #[test]
    fn test_parse_teams() {
        let items = vec![json!({
            "name": "HMPPS Developers",
            "slug": "hmpps-developers",
            "permission": "admin"
        })];
        let teams = parse_teams(&items).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team.name, "HMPPS Developers");
        assert_eq!(teams[0].team.slug, "hmpps-developers");
        assert_eq!(teams[0].permission, "admin");
    }

    #[test]
    fn test_parse_parent_present_and_absent() {
        let with_parent = json!({
            "name": "HMPPS Developers",
            "slug": "hmpps-developers",
            "parent": {"name": "HMPPS", "slug": "hmpps"}
        });
        let parent = parse_parent(&with_parent).unwrap();
        assert_eq!(parent.name, "HMPPS");
        assert_eq!(parent.slug, "hmpps");

        let without_parent = json!({
            "name": "HMPPS",
            "slug": "hmpps",
            "parent": null
        });
        assert!(parse_parent(&without_parent).is_none());
    }
}
