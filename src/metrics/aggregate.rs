use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::ApiError,
    github::{
        entities::{Event, EventFeed, IssueCommentPayload, IssuesPayload, PushPayload},
        GitHubApi,
    },
    utils::time::{date_to_query, utc_day_bounds},
};

use super::{DailyMetrics, DailyReport};

/// Days GitHub keeps user events for.
const EVENT_RETENTION_DAYS: i64 = 90;

/// Gathers every metric of `date`. `today` is only used to judge whether the event feed can still
/// reach that far back.
pub async fn collect_daily_metrics(
    api: &impl GitHubApi,
    config: &Config,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<DailyReport, ApiError> {
    let repo = config.full_repo_name();
    let day = date_to_query(date);

    info!("Fetching PR counts (created / merged) via search...");
    let prs_created = api
        .search_count(&format!(
            "repo:{repo} is:pr author:{} created:{day}",
            config.username
        ))
        .await?;
    let prs_merged = api
        .search_count(&format!(
            "repo:{repo} is:pr author:{} merged:{day}",
            config.username
        ))
        .await?;

    info!("Fetching recent user events (triage / issue closes / pushes)...");
    let feed = api.user_events(&config.username).await?;
    let events_complete = feed_covers(&feed, date, today);
    let day_events = events_of_day(&feed.events, &repo, &config.username, date);
    debug!("{} events of {} match {repo} on {day}", day_events.len(), feed.events.len());

    let issues_triaged = count_issues_triaged(&day_events);
    let issues_resolved = count_issues_resolved(&day_events);

    info!("Counting commits pushed to {repo}...");
    let commits = count_commits(api, config, &day_events, date).await?;

    info!("Fetching open issue / PR snapshot...");
    let open_issues = api
        .search_count(&format!("repo:{repo} is:issue is:open"))
        .await?;
    let open_prs = api
        .search_count(&format!("repo:{repo} is:pr is:open"))
        .await?;

    Ok(DailyReport {
        date,
        metrics: DailyMetrics {
            issues_triaged,
            issues_resolved,
            prs_created,
            prs_merged,
            commits,
            open_issues,
            open_prs,
        },
        events_complete,
    })
}

/// Events in `repo`, performed by `username`, timestamped inside the UTC day.
fn events_of_day<'a>(
    events: &'a [Event],
    repo: &str,
    username: &str,
    date: NaiveDate,
) -> Vec<&'a Event> {
    let (start, end) = utc_day_bounds(date);
    events
        .iter()
        .filter(|e| in_window(e.created_at, start, end))
        .filter(|e| e.is_in(repo) && e.is_by(username))
        .collect()
}

fn in_window(moment: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    moment >= start && moment <= end
}

/// Distinct issues (pull requests excluded) the user commented on.
fn count_issues_triaged(events: &[&Event]) -> u64 {
    let issues: HashSet<u64> = events
        .iter()
        .filter(|e| e.kind == "IssueCommentEvent")
        .filter_map(|e| e.payload_as::<IssueCommentPayload>())
        .filter(|p| !p.issue.is_pull_request())
        .map(|p| p.issue.number)
        .collect();
    issues.len() as u64
}

fn count_issues_resolved(events: &[&Event]) -> u64 {
    events
        .iter()
        .filter(|e| e.kind == "IssuesEvent")
        .filter_map(|e| e.payload_as::<IssuesPayload>())
        .filter(|p| p.action == "closed" && !p.issue.is_pull_request())
        .count() as u64
}

async fn count_commits(
    api: &impl GitHubApi,
    config: &Config,
    events: &[&Event],
    date: NaiveDate,
) -> Result<u64, ApiError> {
    let mut shas = HashSet::<String>::new();

    for event in events.iter().filter(|e| e.kind == "PushEvent") {
        let Some(payload) = event.payload_as::<PushPayload>() else {
            warn!("Push event {} has an unexpected payload, skipping", event.id);
            continue;
        };
        match payload.compare_range() {
            Some((base, head)) => {
                let range = api.compare(&config.owner, &config.repo, base, head).await?;
                if let Some(size) = payload.size.filter(|s| *s != range.len() as u64) {
                    debug!(
                        "Push {} reports {size} commits, compare resolved {}",
                        event.id,
                        range.len()
                    );
                }
                shas.extend(range);
            }
            None => shas.extend(payload.commits.iter().map(|c| c.sha.clone())),
        }
    }

    let (since, until) = utc_day_bounds(date);
    let listed = api
        .commits_by_author(&config.owner, &config.repo, &config.username, since, until)
        .await?;
    shas.extend(listed);

    Ok(shas.len() as u64)
}

/// Whether the fetched events can be trusted to include everything of `date`.
fn feed_covers(feed: &EventFeed, date: NaiveDate, today: NaiveDate) -> bool {
    if today - date > Duration::days(EVENT_RETENTION_DAYS) {
        return false;
    }
    if !feed.window_full {
        return true;
    }
    let (start, _) = utc_day_bounds(date);
    feed.oldest().map_or(true, |oldest| oldest <= start)
}
