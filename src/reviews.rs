//! Review decision aggregation.
//!
//! Review events are folded in submission order (`sequence`, then list
//! order). Each reviewer's most recent event is their effective decision;
//! reviewers are reported in the order of their latest activity.

use crate::models::pull_request::{normalize_login, ReviewEvent, ReviewState};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerDecision {
    pub login: String,
    pub state: ReviewState,
    pub total_reviews: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Reviewers grouped by effective decision. Other states are dropped.
pub struct ReviewBuckets {
    pub approve: Vec<String>,
    pub required_changes: Vec<String>,
    pub commented: Vec<String>,
}

/// Collapse events into each reviewer's latest decision.
///
/// Events without a reviewer login are ignored.
pub fn latest_decision_per_reviewer(events: &[ReviewEvent]) -> Vec<ReviewerDecision> {
    let mut ordered: Vec<&ReviewEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.sequence);

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut decisions: Vec<(ReviewerDecision, usize)> = Vec::new();
    for (at, event) in ordered.into_iter().enumerate() {
        let Some(login) = event.reviewer_login.as_deref().map(normalize_login) else {
            continue;
        };
        if login.is_empty() {
            continue;
        }
        match slots.get(&login) {
            Some(&slot) => {
                let (decision, last) = &mut decisions[slot];
                decision.state = event.state;
                decision.total_reviews += 1;
                *last = at;
            }
            None => {
                slots.insert(login.clone(), decisions.len());
                decisions.push((
                    ReviewerDecision {
                        login,
                        state: event.state,
                        total_reviews: 1,
                    },
                    at,
                ));
            }
        }
    }
    decisions.sort_by_key(|(_, last)| *last);
    decisions.into_iter().map(|(d, _)| d).collect()
}

pub fn bucket_by_state(decisions: &[ReviewerDecision]) -> ReviewBuckets {
    let mut buckets = ReviewBuckets::default();
    for d in decisions {
        match d.state {
            ReviewState::Approved => buckets.approve.push(d.login.clone()),
            ReviewState::ChangesRequested => buckets.required_changes.push(d.login.clone()),
            ReviewState::Commented => buckets.commented.push(d.login.clone()),
            _ => {}
        }
    }
    tracing::debug!(
        approve = ?buckets.approve,
        required_changes = ?buckets.required_changes,
        commented = ?buckets.commented,
        "review buckets"
    );
    buckets
}

/// Everyone who was asked to review: pending requests plus anyone who
/// already reviewed (the host drops a request once its review lands).
pub fn requested_reviewer_logins(pending: &[String], events: &[ReviewEvent]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let reviewed = events.iter().filter_map(|e| e.reviewer_login.as_deref());
    for login in pending.iter().map(String::as_str).chain(reviewed) {
        let login = normalize_login(login);
        if !login.is_empty() && !out.contains(&login) {
            out.push(login);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(login: Option<&str>, state: ReviewState, sequence: u64) -> ReviewEvent {
        ReviewEvent {
            reviewer_login: login.map(|s| s.to_string()),
            state,
            sequence,
        }
    }

    #[test]
    fn test_latest_event_wins_and_counts_total() {
        let events = vec![
            ev(Some("bob"), ReviewState::Approved, 1),
            ev(Some("carol"), ReviewState::Commented, 2),
            ev(Some("Bob"), ReviewState::ChangesRequested, 3),
        ];
        let out = latest_decision_per_reviewer(&events);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].login, "carol");
        assert_eq!(out[1].login, "bob");
        assert_eq!(out[1].state, ReviewState::ChangesRequested);
        assert_eq!(out[1].total_reviews, 2);
    }

    #[test]
    fn test_sequence_orders_out_of_order_input() {
        let events = vec![
            ev(Some("bob"), ReviewState::ChangesRequested, 5),
            ev(Some("bob"), ReviewState::Approved, 9),
            ev(Some("bob"), ReviewState::Commented, 2),
        ];
        let out = latest_decision_per_reviewer(&events);
        assert_eq!(out[0].state, ReviewState::Approved);
        assert_eq!(out[0].total_reviews, 3);
    }

    #[test]
    fn test_events_without_reviewer_are_discarded() {
        let events = vec![
            ev(None, ReviewState::ChangesRequested, 1),
            ev(Some("  "), ReviewState::ChangesRequested, 2),
            ev(Some("bob"), ReviewState::Approved, 3),
        ];
        let out = latest_decision_per_reviewer(&events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].login, "bob");
    }

    #[test]
    fn test_buckets_drop_unrecognized_states() {
        let events = vec![
            ev(Some("a"), ReviewState::Approved, 1),
            ev(Some("b"), ReviewState::ChangesRequested, 2),
            ev(Some("c"), ReviewState::Commented, 3),
            ev(Some("d"), ReviewState::Approved, 4),
            ev(Some("d"), ReviewState::Dismissed, 5),
            ev(Some("e"), ReviewState::Pending, 6),
        ];
        let buckets = bucket_by_state(&latest_decision_per_reviewer(&events));
        assert_eq!(buckets.approve, vec!["a"]);
        assert_eq!(buckets.required_changes, vec!["b"]);
        assert_eq!(buckets.commented, vec!["c"]);
    }

    #[test]
    fn test_requested_union_dedups_and_normalizes() {
        let pending = vec!["Carol".to_string(), "dave".to_string()];
        let events = vec![
            ev(Some("bob"), ReviewState::Approved, 1),
            ev(Some("CAROL"), ReviewState::Commented, 2),
            ev(None, ReviewState::Commented, 3),
        ];
        assert_eq!(
            requested_reviewer_logins(&pending, &events),
            vec!["carol", "dave", "bob"]
        );
    }
}
