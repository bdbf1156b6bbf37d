//! Shared data models for policy, pull request inputs, and evaluation outputs.

pub mod policy;
pub mod pull_request;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A single policy validation problem located by a JSON-style path.
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Reviewers contributed by one applied rule.
pub struct RulePick {
    pub source: String,
    pub reviewers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Result of the assignment pipeline for one pull request.
pub struct AssignmentPlan {
    pub number: u64,
    pub author: String,
    /// Set when assignment was suppressed; no reviewers are requested then.
    pub skipped: Option<String>,
    pub groups: Vec<String>,
    pub absentees: Vec<String>,
    pub reviewers: Vec<String>,
    pub picks: Vec<RulePick>,
    pub comment: Option<String>,
    /// Index into the snapshot's comments of a comment to update instead of creating.
    pub existing_comment: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Result of the merge pipeline for one pull request.
pub struct MergePlan {
    pub number: u64,
    pub author: String,
    pub groups: Vec<String>,
    pub requested_reviewers: Vec<String>,
    pub mergeable: bool,
    /// Human-readable reason when `mergeable` is false.
    pub reason: Option<String>,
}
