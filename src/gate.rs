//! Merge gate evaluation.
//!
//! Two stages, stopping at the first failure:
//! 1. CI: every required check needs a `success` or `skipped` run.
//! 2. Approvals: at least one review; nobody's latest review requests
//!    changes; every applicable rule with a `required` count has that many
//!    approvals from its reviewers.
//!
//! Rules none of whose reviewers were ever requested are skipped in stage 2,
//! so a rule emptied by absences upstream cannot deadlock the merge. If that
//! leaves no rule at all the gate blocks rather than passing silently.
//!
//! Blocking is not an error: it is reported as a `BlockReason` whose
//! `Display` is the human-readable reason.

use crate::models::policy::Rule;
use crate::models::pull_request::{normalize_login, CheckResult, PullRequestView, ReviewEvent};
use crate::reviews::{bucket_by_state, latest_decision_per_reviewer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDecision {
    Ready,
    Blocked(BlockReason),
}

impl MergeDecision {
    pub fn is_ready(&self) -> bool {
        matches!(self, MergeDecision::Ready)
    }

    pub fn reason(&self) -> Option<&BlockReason> {
        match self {
            MergeDecision::Ready => None,
            MergeDecision::Blocked(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    ChecksNotPassed { checks: Vec<String> },
    NoReviews,
    ChangesRequested { logins: Vec<String> },
    NoApplicableRules,
    MissingApprovals { required: usize, reviewers: Vec<String> },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::ChecksNotPassed { checks } => {
                write!(f, "Waiting on required checks: {}.", checks.join(", "))
            }
            BlockReason::NoReviews => write!(f, "Waiting for reviews."),
            BlockReason::ChangesRequested { logins } => {
                write!(f, "{} required changes.", logins.join(", "))
            }
            BlockReason::NoApplicableRules => write!(
                f,
                "No applicable rules: none of the rule reviewers were requested on this pull request."
            ),
            BlockReason::MissingApprovals {
                required,
                reviewers,
            } => write!(
                f,
                "Waiting {} approve(s) from {} to approve.",
                required,
                reviewers.join(", ")
            ),
        }
    }
}

/// Evaluate CI checks, then approvals.
///
/// `requested` is everyone asked to review (see
/// `reviews::requested_reviewer_logins`); `pending` are the requests still
/// open and are only reported in logs.
pub fn is_fully_approved(
    rules: &[&Rule],
    required_checks: &[String],
    reviews: &[ReviewEvent],
    checks: &[CheckResult],
    requested: &[String],
    pending: &[String],
) -> MergeDecision {
    let outcome = check_ci(required_checks, checks)
        .and_then(|_| check_reviews(rules, reviews, requested, true));
    match outcome {
        Ok(()) => MergeDecision::Ready,
        Err(reason) => {
            tracing::info!(reason = %reason, pending = ?pending, "merge blocked");
            MergeDecision::Blocked(reason)
        }
    }
}

/// Every required check must have at least one passing run.
pub fn check_ci(required_checks: &[String], checks: &[CheckResult]) -> Result<(), BlockReason> {
    let waiting: Vec<String> = required_checks
        .iter()
        .filter(|name| !checks.iter().any(|c| &c.name == *name && c.is_passing()))
        .cloned()
        .collect();
    if waiting.is_empty() {
        Ok(())
    } else {
        Err(BlockReason::ChecksNotPassed { checks: waiting })
    }
}

/// Approval stage. With `skip_unassigned_rules`, rules none of whose
/// reviewers appear in `requested` are ignored.
pub fn check_reviews(
    rules: &[&Rule],
    reviews: &[ReviewEvent],
    requested: &[String],
    skip_unassigned_rules: bool,
) -> Result<(), BlockReason> {
    if reviews.is_empty() {
        return Err(BlockReason::NoReviews);
    }
    let buckets = bucket_by_state(&latest_decision_per_reviewer(reviews));
    if !buckets.required_changes.is_empty() {
        return Err(BlockReason::ChangesRequested {
            logins: buckets.required_changes,
        });
    }

    let requested: Vec<String> = requested.iter().map(|l| normalize_login(l)).collect();
    let to_match: Vec<&Rule> = rules
        .iter()
        .copied()
        .filter(|rule| !skip_unassigned_rules || rule.reviewers.iter().any(|r| requested.contains(r)))
        .collect();
    if to_match.is_empty() {
        return Err(BlockReason::NoApplicableRules);
    }

    for rule in to_match {
        let required = rule.required_approvals();
        if required == 0 {
            continue;
        }
        let mut approvers: Vec<&String> = rule
            .reviewers
            .iter()
            .filter(|r| buckets.approve.contains(*r))
            .collect();
        approvers.sort();
        approvers.dedup();
        if approvers.len() < required {
            return Err(BlockReason::MissingApprovals {
                required,
                reviewers: rule.reviewers.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Reasons a pull request is not a merge candidate at all.
pub enum PreflightBlock {
    Draft { number: u64 },
    NotOpen { number: u64 },
    DoNotMergeLabel { number: u64, label: String },
    ProtectedBase { number: u64, base: String },
}

impl fmt::Display for PreflightBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreflightBlock::Draft { number } => write!(f, "Pull request #{} is a draft", number),
            PreflightBlock::NotOpen { number } => write!(f, "Pull request #{} is not open", number),
            PreflightBlock::DoNotMergeLabel { number, label } => write!(
                f,
                "Pull request #{} contains do-not-merge label '{}'",
                number, label
            ),
            PreflightBlock::ProtectedBase { number, base } => write!(
                f,
                "Pull request #{} targets base branch '{}' which is excluded from merging",
                number, base
            ),
        }
    }
}

/// Check whether a pull request may be considered for merging.
pub fn merge_preflight(
    pr: &PullRequestView,
    do_not_merge_labels: &[String],
    do_not_merge_bases: &[String],
) -> Option<PreflightBlock> {
    if pr.is_draft {
        return Some(PreflightBlock::Draft { number: pr.number });
    }
    if !pr.is_open {
        return Some(PreflightBlock::NotOpen { number: pr.number });
    }
    if let Some(label) = pr
        .label_names
        .iter()
        .find(|l| do_not_merge_labels.contains(l))
    {
        return Some(PreflightBlock::DoNotMergeLabel {
            number: pr.number,
            label: label.clone(),
        });
    }
    if do_not_merge_bases.contains(&pr.base_branch_name) {
        return Some(PreflightBlock::ProtectedBase {
            number: pr.number,
            base: pr.base_branch_name.clone(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pull_request::{CheckConclusion, ReviewState};

    fn rule(reviewers: &[&str], required: Option<u32>) -> Rule {
        Rule {
            reviewers: reviewers.iter().map(|s| s.to_string()).collect(),
            required,
            assign: None,
            if_changed: None,
        }
    }

    fn ev(login: &str, state: ReviewState, sequence: u64) -> ReviewEvent {
        ReviewEvent {
            reviewer_login: Some(login.to_string()),
            state,
            sequence,
        }
    }

    fn check(name: &str, conclusion: Option<CheckConclusion>) -> CheckResult {
        CheckResult {
            name: name.to_string(),
            conclusion,
        }
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_failing_check_blocks_before_reviews() {
        let r = rule(&["bob"], Some(1));
        let decision = is_fully_approved(
            &[&r],
            &strings(&["build"]),
            &[],
            &[check("build", Some(CheckConclusion::Failure))],
            &strings(&["bob"]),
            &[],
        );
        assert_eq!(
            decision,
            MergeDecision::Blocked(BlockReason::ChecksNotPassed {
                checks: strings(&["build"])
            })
        );
        assert!(decision.reason().unwrap().to_string().contains("build"));
    }

    #[test]
    fn test_missing_and_running_checks_are_named() {
        let checks = vec![
            check("build", Some(CheckConclusion::Success)),
            check("lint", None),
            check("docs", Some(CheckConclusion::Skipped)),
        ];
        let err = check_ci(&strings(&["build", "lint", "e2e", "docs"]), &checks).unwrap_err();
        assert_eq!(err.to_string(), "Waiting on required checks: lint, e2e.");
        assert!(check_ci(&[], &[]).is_ok());
    }

    #[test]
    fn test_no_reviews() {
        let r = rule(&["bob"], Some(1));
        let d = is_fully_approved(&[&r], &[], &[], &[], &strings(&["bob"]), &[]);
        assert_eq!(d.reason().unwrap().to_string(), "Waiting for reviews.");
    }

    #[test]
    fn test_latest_changes_requested_blocks() {
        let r = rule(&["bob"], Some(1));
        let reviews = vec![
            ev("bob", ReviewState::Approved, 1),
            ev("bob", ReviewState::ChangesRequested, 2),
        ];
        let d = is_fully_approved(&[&r], &[], &reviews, &[], &strings(&["bob"]), &[]);
        assert_eq!(d.reason().unwrap().to_string(), "bob required changes.");
    }

    #[test]
    fn test_changes_requested_short_circuits_other_approvals() {
        let r = rule(&["bob", "carol"], Some(1));
        let reviews = vec![
            ev("bob", ReviewState::Approved, 1),
            ev("carol", ReviewState::ChangesRequested, 2),
            ev("dave", ReviewState::ChangesRequested, 3),
        ];
        let d = is_fully_approved(&[&r], &[], &reviews, &[], &strings(&["bob", "carol"]), &[]);
        let msg = d.reason().unwrap().to_string();
        assert!(msg.contains("carol") && msg.contains("dave"));
    }

    #[test]
    fn test_missing_approvals_message() {
        let r = rule(&["bob", "carol"], Some(2));
        let reviews = vec![ev("bob", ReviewState::Approved, 1)];
        let d = is_fully_approved(&[&r], &[], &reviews, &[], &strings(&["bob", "carol"]), &[]);
        assert_eq!(
            d.reason().unwrap().to_string(),
            "Waiting 2 approve(s) from bob, carol to approve."
        );
    }

    #[test]
    fn test_unassigned_rule_is_skipped() {
        let assigned = rule(&["bob"], Some(1));
        let absent_team = rule(&["erin", "frank"], Some(1));
        let reviews = vec![ev("Bob", ReviewState::Approved, 1)];
        let d = is_fully_approved(
            &[&assigned, &absent_team],
            &[],
            &reviews,
            &[],
            &strings(&["BOB"]),
            &[],
        );
        assert!(d.is_ready());
        let strict = check_reviews(&[&assigned, &absent_team], &reviews, &strings(&["bob"]), false);
        assert!(matches!(strict, Err(BlockReason::MissingApprovals { .. })));
    }

    #[test]
    fn test_no_rule_left_blocks() {
        let r = rule(&["erin"], Some(1));
        let reviews = vec![ev("bob", ReviewState::Approved, 1)];
        let d = is_fully_approved(&[&r], &[], &reviews, &[], &strings(&["bob"]), &[]);
        assert_eq!(d, MergeDecision::Blocked(BlockReason::NoApplicableRules));
        let none = is_fully_approved(&[], &[], &reviews, &[], &strings(&["bob"]), &[]);
        assert_eq!(none, MergeDecision::Blocked(BlockReason::NoApplicableRules));
    }

    #[test]
    fn test_rule_without_required_count_passes() {
        let r = rule(&["bob", "carol"], None);
        let reviews = vec![ev("bob", ReviewState::Commented, 1)];
        let d = is_fully_approved(&[&r], &[], &reviews, &[], &strings(&["carol"]), &[]);
        assert!(d.is_ready());
    }

    #[test]
    fn test_merge_preflight() {
        let mut pr = PullRequestView {
            author: "alice".into(),
            is_open: true,
            number: 4,
            label_names: strings(&["ready"]),
            base_branch_name: "main".into(),
            ..PullRequestView::default()
        };
        assert_eq!(merge_preflight(&pr, &strings(&["hold"]), &strings(&["release"])), None);
        pr.label_names.push("hold".into());
        assert_eq!(
            merge_preflight(&pr, &strings(&["hold"]), &[]).unwrap().to_string(),
            "Pull request #4 contains do-not-merge label 'hold'"
        );
        pr.is_draft = true;
        assert_eq!(
            merge_preflight(&pr, &[], &[]),
            Some(PreflightBlock::Draft { number: 4 })
        );
        pr.is_draft = false;
        pr.label_names.clear();
        pr.base_branch_name = "release".into();
        assert!(matches!(
            merge_preflight(&pr, &[], &strings(&["release"])),
            Some(PreflightBlock::ProtectedBase { .. })
        ));
        pr.is_open = false;
        assert_eq!(
            merge_preflight(&pr, &[], &[]),
            Some(PreflightBlock::NotOpen { number: 4 })
        );
    }
}
