//! Decides whether reviewers should be requested at all.
//!
//! Assignment is suppressed for drafts, for pull requests carrying an ignored
//! label, and for pushes that are merge commits the policy opts out of:
//! - `ignoreReassignForMergedPRs`: message starts with `Merge pull request`;
//! - `ignoreReassignForMergeFrom: <branch>`: message starts with
//!   `Merge branch "<branch>"` or `Merge remote-tracking branch "origin/<branch>"`
//!   once curly and single quotes are read as straight double quotes.
//!
//! Both merge checks also require at least two parents. Messages that merely
//! look like merges are still treated as merges.

use crate::models::policy::Options;
use crate::models::pull_request::CommitInfo;
use regex::Regex;
use std::sync::OnceLock;

const MERGE_PR_PREFIX: &str = "Merge pull request";

fn quote_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[\u{2018}\u{2019}\u{201C}\u{201D}'`]").expect("static regex"))
}

/// Return false when review assignment must be skipped.
pub fn should_request_review(
    is_draft: bool,
    options: Option<&Options>,
    current_labels: &[String],
    commit: Option<&CommitInfo>,
) -> bool {
    skip_reason(is_draft, options, current_labels, commit).is_none()
}

/// Like `should_request_review`, but names the matched suppression.
pub fn skip_reason(
    is_draft: bool,
    options: Option<&Options>,
    current_labels: &[String],
    commit: Option<&CommitInfo>,
) -> Option<String> {
    if is_draft {
        return Some("pull request is a draft".to_string());
    }
    let options = options?;

    if let Some(ignored) = options.ignored_labels.as_ref() {
        if let Some(label) = current_labels.iter().find(|l| ignored.contains(l)) {
            return Some(format!("pull request has ignored label '{}'", label));
        }
    }

    let commit = commit?;
    if options.ignore_reassign_for_merged_prs == Some(true) && is_merge_pr_commit(commit) {
        return Some("head commit merges a pull request".to_string());
    }
    if let Some(branch) = options.ignore_reassign_for_merge_from.as_deref() {
        if is_merge_from_branch(commit, branch) {
            return Some(format!("head commit merges branch '{}'", branch));
        }
    }
    None
}

pub fn is_merge_pr_commit(commit: &CommitInfo) -> bool {
    commit.parent_count >= 2 && commit.message.starts_with(MERGE_PR_PREFIX)
}

pub fn is_merge_from_branch(commit: &CommitInfo, branch: &str) -> bool {
    if commit.parent_count < 2 {
        return false;
    }
    let message = quote_chars().replace_all(&commit.message, "\"");
    message.starts_with(&format!("Merge branch \"{}\"", branch))
        || message.starts_with(&format!("Merge remote-tracking branch \"origin/{}\"", branch))
}
