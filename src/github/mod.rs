//! Read-only access to the handful of GitHub REST endpoints the tracker needs.
//! [GitHubApi] is the seam between fetching and aggregation, [client::GitHubClient] is the
//! real implementation.

pub mod client;
pub mod entities;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ApiError;

use entities::EventFeed;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi {
    /// Recent public events of `username`. GitHub only serves a bounded recent window here.
    async fn user_events(&self, username: &str) -> Result<EventFeed, ApiError>;

    /// `total_count` of an issue search query.
    async fn search_count(&self, query: &str) -> Result<u64, ApiError>;

    /// SHAs of commits in `owner/repo` authored by `author` between `since` and `until`.
    async fn commits_by_author(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<String>, ApiError>;

    /// SHAs of commits reachable from `head` but not from `base`.
    async fn compare(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, ApiError>;
}
