//! Pull request state as materialized by the host API layer.
//!
//! These are read-only inputs; the engine never fetches or mutates them.
//! `Snapshot` bundles everything one evaluation run needs and is the shape of
//! the JSON files accepted by the binary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Projection of a pull request.
pub struct PullRequestView {
    pub author: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default = "default_open")]
    pub is_open: bool,
    pub number: u64,
    #[serde(default)]
    pub label_names: Vec<String>,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub base_branch_name: String,
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Head commit facts used to detect merge pushes.
pub struct CommitInfo {
    pub message: String,
    pub parent_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Review submission state as reported by the host.
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// One submitted review. `sequence` orders submissions; ties keep list order.
pub struct ReviewEvent {
    #[serde(default)]
    pub reviewer_login: Option<String>,
    pub state: ReviewState,
    #[serde(default)]
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
/// Conclusion of a finished CI check run.
pub enum CheckConclusion {
    Success,
    Skipped,
    Failure,
    Neutral,
    Cancelled,
    TimedOut,
    ActionRequired,
    Stale,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// A CI check run; `conclusion` is `None` while it is still running.
pub struct CheckResult {
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,
}

impl CheckResult {
    pub fn is_passing(&self) -> bool {
        matches!(
            self.conclusion,
            Some(CheckConclusion::Success) | Some(CheckConclusion::Skipped)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Everything one evaluation run consumes for a single pull request.
///
/// `requested_reviewers` are the currently pending review requests.
/// `absent_emails` come from the HR roster and are mapped through `sageUsers`;
/// `absent_logins` are used as-is. Both sources are merged.
pub struct Snapshot {
    pub pull_request: PullRequestView,
    #[serde(default)]
    pub changed_files: Vec<String>,
    #[serde(default)]
    pub requested_reviewers: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<ReviewEvent>,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
    #[serde(default)]
    pub absent_emails: Vec<String>,
    #[serde(default)]
    pub absent_logins: Vec<String>,
    #[serde(default)]
    pub head_commit: Option<CommitInfo>,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Trim and lowercase a login so host API and policy casing agree.
pub fn normalize_login(login: &str) -> String {
    login.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_and_unknown_states() {
        let raw = r#"{
            "pullRequest": {"author": "Alice", "number": 7},
            "reviews": [
                {"reviewerLogin": "bob", "state": "APPROVED", "sequence": 1},
                {"state": "COMMENTED"},
                {"reviewerLogin": "carol", "state": "SOMETHING_NEW"}
            ],
            "checks": [{"name": "build", "conclusion": "timed_out"}, {"name": "lint"}]
        }"#;
        let snap: Snapshot = serde_json::from_str(raw).unwrap();
        assert!(snap.pull_request.is_open);
        assert!(!snap.pull_request.is_draft);
        assert_eq!(snap.reviews[1].reviewer_login, None);
        assert_eq!(snap.reviews[2].state, ReviewState::Other);
        assert_eq!(snap.checks[0].conclusion, Some(CheckConclusion::TimedOut));
        assert!(!snap.checks[1].is_passing());
        assert!(snap.head_commit.is_none());
    }

    #[test]
    fn test_normalize_login() {
        assert_eq!(normalize_login("  BoB "), "bob");
    }
}
