use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{error::ApiError, utils::time::utc_iso};

use super::{
    entities::{CommitRef, CompareResponse, Event, EventFeed, SearchResponse},
    GitHubApi,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

const PER_PAGE: usize = 100;
/// The events endpoint stops at 300 entries.
const EVENT_PAGES: usize = 3;
/// Safety cap for every other listing.
const MAX_PAGES: usize = 10;

/// GitHub API client for making authenticated requests.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers(token))
            .build()
            .map_err(|source| ApiError::Network {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { client, base_url })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &headers, &url, body));
        }

        response.json::<T>().await.map_err(|source| {
            if source.is_decode() {
                ApiError::Decode {
                    url,
                    reason: source.to_string(),
                }
            } else {
                ApiError::Network { url, source }
            }
        })
    }

    /// Requests `path` page by page, see [collect_pages].
    async fn get_pages<P, T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        max_pages: usize,
        extract: impl Fn(P) -> Vec<T> + Send + Sync,
    ) -> Result<(Vec<T>, bool), ApiError>
    where
        P: DeserializeOwned + Send,
        T: Send,
    {
        let extract = &extract;
        collect_pages(max_pages, |page| {
            let mut page_query = query.to_vec();
            page_query.push(("per_page", PER_PAGE.to_string()));
            page_query.push(("page", page.to_string()));
            async move { self.get_json::<P>(path, &page_query).await.map(extract) }
        })
        .await
    }
}

/// Calls `fetch` for `page=1..` until a page comes back with fewer than [PER_PAGE] items or
/// `max_pages` pages were read. The flag tells whether the cap was the reason to stop.
async fn collect_pages<T, F, Fut>(
    max_pages: usize,
    mut fetch: F,
) -> Result<(Vec<T>, bool), ApiError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let mut items = Vec::new();
    for page in 1..=max_pages {
        let batch = fetch(page).await?;
        let len = batch.len();
        items.extend(batch);
        if len < PER_PAGE {
            return Ok((items, false));
        }
    }
    Ok((items, true))
}

fn default_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "x-github-api-version",
        HeaderValue::from_static(API_VERSION),
    );
    if let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}")) {
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    headers
}

/// Maps a non-success response onto the error the user should see.
fn classify_failure(status: StatusCode, headers: &HeaderMap, url: &str, body: String) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }

    let exhausted = header_str(headers, "x-ratelimit-remaining") == Some("0");
    let mentions_limit = body.to_lowercase().contains("rate limit");
    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (exhausted || mentions_limit))
    {
        let reset = header_str(headers, "x-ratelimit-reset")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        return ApiError::RateLimited { reset };
    }

    ApiError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self))]
    async fn user_events(&self, username: &str) -> Result<EventFeed, ApiError> {
        let (events, window_full) = self
            .get_pages(
                &format!("/users/{username}/events"),
                &[],
                EVENT_PAGES,
                |page: Vec<Event>| page,
            )
            .await?;
        debug!("Fetched {} events", events.len());
        Ok(EventFeed {
            events,
            window_full,
        })
    }

    #[instrument(skip(self))]
    async fn search_count(&self, query: &str) -> Result<u64, ApiError> {
        let response: SearchResponse = self
            .get_json(
                "/search/issues",
                &[("q", query.to_string()), ("per_page", "1".to_string())],
            )
            .await?;
        Ok(response.total_count)
    }

    #[instrument(skip(self))]
    async fn commits_by_author(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<String>, ApiError> {
        let (commits, _) = self
            .get_pages(
                &format!("/repos/{owner}/{repo}/commits"),
                &[
                    ("author", author.to_string()),
                    ("since", utc_iso(since)),
                    ("until", utc_iso(until)),
                ],
                MAX_PAGES,
                |page: Vec<CommitRef>| page,
            )
            .await?;
        Ok(commits.into_iter().map(|c| c.sha).collect())
    }

    #[instrument(skip(self))]
    async fn compare(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, ApiError> {
        let (commits, _) = self
            .get_pages(
                &format!("/repos/{owner}/{repo}/compare/{base}...{head}"),
                &[],
                MAX_PAGES,
                |page: CompareResponse| {
                    debug!("Compare reports {} commits in total", page.total_commits);
                    page.commits
                },
            )
            .await?;
        Ok(commits.into_iter().map(|c| c.sha).collect())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{header::HeaderMap, StatusCode};

    use crate::error::ApiError;

    use super::*;

    #[test]
    fn test_unauthorized() {
        let error = classify_failure(
            StatusCode::UNAUTHORIZED,
            &HeaderMap::new(),
            "https://api.github.com/users/x/events",
            "Bad credentials".into(),
        );
        assert!(matches!(error, ApiError::Unauthorized));
    }

    #[test]
    fn test_rate_limit_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-reset", "1768300000".parse().unwrap());

        let error = classify_failure(StatusCode::FORBIDDEN, &headers, "u", String::new());
        match error {
            ApiError::RateLimited { reset } => {
                assert_eq!(reset.unwrap().timestamp(), 1768300000);
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_from_body() {
        let error = classify_failure(
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            "u",
            "API rate limit exceeded for user".into(),
        );
        assert!(matches!(error, ApiError::RateLimited { reset: None }));
    }

    #[test]
    fn test_plain_forbidden_is_status() {
        let error = classify_failure(
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            "u",
            "Resource not accessible by personal access token".into(),
        );
        assert!(matches!(error, ApiError::Status { status: 403, .. }));
    }

    async fn run_pages(
        sizes: &[usize],
        max_pages: usize,
    ) -> (Result<(Vec<usize>, bool), ApiError>, Vec<usize>) {
        let mut requested = Vec::new();
        let result = collect_pages(max_pages, |page| {
            requested.push(page);
            let size = sizes.get(page - 1).copied().unwrap_or(0);
            std::future::ready(Ok((0..size).collect::<Vec<_>>()))
        })
        .await;
        (result, requested)
    }

    #[tokio::test]
    async fn test_pages_stop_on_short_page() {
        let (result, requested) = run_pages(&[PER_PAGE, 30, PER_PAGE], 3).await;
        let (items, capped) = result.unwrap();
        assert_eq!(requested, vec![1, 2]);
        assert_eq!(items.len(), PER_PAGE + 30);
        assert!(!capped);
    }

    #[tokio::test]
    async fn test_pages_full_page_then_empty() {
        let (result, requested) = run_pages(&[PER_PAGE, 0], 3).await;
        let (items, capped) = result.unwrap();
        assert_eq!(requested, vec![1, 2]);
        assert_eq!(items.len(), PER_PAGE);
        assert!(!capped);
    }

    #[tokio::test]
    async fn test_pages_hit_cap() {
        let (result, requested) = run_pages(&[PER_PAGE; 5], 3).await;
        let (items, capped) = result.unwrap();
        assert_eq!(requested, vec![1, 2, 3]);
        assert_eq!(items.len(), 3 * PER_PAGE);
        assert!(capped);
    }

    #[tokio::test]
    async fn test_pages_stop_on_error() {
        let mut requested = Vec::new();
        let result = collect_pages::<u8, _, _>(3, |page| {
            requested.push(page);
            std::future::ready(if page == 2 {
                Err(ApiError::Unauthorized)
            } else {
                Ok(vec![0; PER_PAGE])
            })
        })
        .await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(requested, vec![1, 2]);
    }

    #[test]
    fn test_default_headers_carry_token() {
        let headers = default_headers("abc");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get("x-github-api-version").unwrap(), API_VERSION);
    }
}
