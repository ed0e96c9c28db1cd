use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize};

/// One entry of `GET /users/{username}/events`. The payload differs per event type, so it is
/// kept as raw json and decoded on demand with [Event::payload_as].
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: Actor,
    pub repo: EventRepo,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.payload.clone()).ok()
    }

    pub fn is_by(&self, login: &str) -> bool {
        self.actor.login.eq_ignore_ascii_case(login)
    }

    pub fn is_in(&self, full_repo_name: &str) -> bool {
        self.repo.name.eq_ignore_ascii_case(full_repo_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    /// `owner/repo`
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueRef {
    pub number: u64,
    /// Present only when the "issue" is actually a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueRef {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentPayload {
    #[serde(default)]
    pub action: Option<String>,
    pub issue: IssueRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesPayload {
    pub action: String,
    pub issue: IssueRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
    /// Commit count as reported by the event. Not reliable for large pushes.
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub commits: Vec<CommitRef>,
}

impl PushPayload {
    /// The `before...head` range, if `before` points to a real commit. Pushes that create a branch
    /// carry an all-zero `before`.
    pub fn compare_range(&self) -> Option<(&str, &str)> {
        let before = self.before.as_deref()?;
        let head = self.head.as_deref()?;
        if before.is_empty() || before.bytes().all(|b| b == b'0') {
            return None;
        }
        Some((before, head))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub commits: Vec<CommitRef>,
}

/// Recent events of a user. `window_full` is set when every page the client was allowed to read
/// came back full, which means older events exist but were not returned.
#[derive(Debug, Clone, Default)]
pub struct EventFeed {
    pub events: Vec<Event>,
    pub window_full: bool,
}

impl EventFeed {
    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.events.iter().map(|e| e.created_at).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_push_event() {
        let event: Event = serde_json::from_str(
            r#"{
                "id": "1",
                "type": "PushEvent",
                "actor": {"login": "octocat", "id": 1},
                "repo": {"name": "ansible-collections/azure", "id": 2},
                "created_at": "2026-01-13T09:00:00Z",
                "payload": {"push_id": 3, "size": 2, "before": "abc", "head": "def",
                            "commits": [{"sha": "a1"}, {"sha": "a2"}]}
            }"#,
        )
        .unwrap();

        assert!(event.is_by("OctoCat"));
        assert!(event.is_in("ansible-collections/azure"));
        let payload: PushPayload = event.payload_as().unwrap();
        assert_eq!(payload.compare_range(), Some(("abc", "def")));
        assert_eq!(payload.commits.len(), 2);
    }

    #[test]
    fn test_new_branch_push_has_no_range() {
        let payload = PushPayload {
            before: Some("0000000000000000000000000000000000000000".into()),
            head: Some("def".into()),
            size: Some(1),
            commits: vec![],
        };
        assert_eq!(payload.compare_range(), None);
    }

    #[test]
    fn test_comment_on_pull_request() {
        let payload: IssueCommentPayload = serde_json::from_str(
            r#"{"action": "created", "issue": {"number": 7, "pull_request": {"url": "x"}}}"#,
        )
        .unwrap();
        assert!(payload.issue.is_pull_request());
    }
}
