//! Per-pull-request pipelines over materialized inputs.
//!
//! - Assignment: request gate, classification, absentee resolution,
//!   reviewer selection, comment rendering.
//! - Merge: preflight, classification, rule resolution, requested-reviewer
//!   union, merge gate.
//!
//! Snapshots are independent, so batches are evaluated in parallel with one
//! random source per snapshot.

use crate::absence::absent_logins;
use crate::classify::classify;
use crate::comment::{find_marked_comment, render_assignment_comment};
use crate::errors::SnapshotError;
use crate::gate::{is_fully_approved, merge_preflight};
use crate::models::policy::{Policy, Rule};
use crate::models::pull_request::{normalize_login, Snapshot};
use crate::models::{AssignmentPlan, MergePlan, RulePick};
use crate::request_gate::skip_reason;
use crate::reviews::requested_reviewer_logins;
use crate::select::{applicable_rules, select_reviewers, thread_random, RandomSource, RngSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
/// Merge exclusions configured outside the policy document.
pub struct MergeSettings<'a> {
    pub do_not_merge_labels: &'a [String],
    pub do_not_merge_on_base_branch: &'a [String],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Snapshot>),
    One(Box<Snapshot>),
}

/// Read a snapshot file holding either one snapshot object or an array.
pub fn load_snapshots(path: &Path) -> Result<Vec<Snapshot>, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: OneOrMany = serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match parsed {
        OneOrMany::Many(v) => v,
        OneOrMany::One(s) => vec![*s],
    })
}

/// Decide which reviewers to request for one pull request.
pub fn plan_assignment(policy: &Policy, snap: &Snapshot, rng: &mut dyn RandomSource) -> AssignmentPlan {
    let pr = &snap.pull_request;
    let mut plan = AssignmentPlan {
        number: pr.number,
        author: normalize_login(&pr.author),
        skipped: None,
        groups: Vec::new(),
        absentees: Vec::new(),
        reviewers: Vec::new(),
        picks: Vec::new(),
        comment: None,
        existing_comment: None,
    };

    if let Some(reason) = skip_reason(
        pr.is_draft,
        policy.options.as_ref(),
        &pr.label_names,
        snap.head_commit.as_ref(),
    ) {
        tracing::info!(pr = pr.number, reason = %reason, "review assignment skipped");
        plan.skipped = Some(reason);
        return plan;
    }

    plan.groups = classify(&policy.file_changes_groups, &snap.changed_files);
    plan.absentees = absent_logins(policy.sage_users.as_ref(), &snap.absent_emails);
    for login in &snap.absent_logins {
        let login = normalize_login(login);
        if !plan.absentees.contains(&login) {
            plan.absentees.push(login);
        }
    }

    // Submitted reviews drop out of the pending list but stay sticky.
    let requested = requested_reviewer_logins(&snap.requested_reviewers, &snap.reviews);
    let selection = select_reviewers(
        &pr.author,
        &plan.groups,
        policy,
        &requested,
        &plan.absentees,
        rng,
    );
    if selection.reviewers.is_empty() {
        tracing::info!(pr = pr.number, author = %plan.author, "no reviewers matched");
    }

    if policy.wants_comment() {
        let message_id = policy.message_id();
        plan.comment = Some(render_assignment_comment(&selection, &plan.groups, message_id));
        plan.existing_comment = message_id.and_then(|id| find_marked_comment(&snap.comments, id));
    }
    plan.picks = selection
        .picks
        .iter()
        .map(|p| RulePick {
            source: p.source.to_string(),
            reviewers: p.reviewers.clone(),
        })
        .collect();
    plan.reviewers = selection.reviewers;
    plan
}

/// Decide whether one pull request may be merged.
pub fn plan_merge(policy: &Policy, snap: &Snapshot, settings: MergeSettings<'_>) -> MergePlan {
    let pr = &snap.pull_request;
    let requested = requested_reviewer_logins(&snap.requested_reviewers, &snap.reviews);
    let mut plan = MergePlan {
        number: pr.number,
        author: normalize_login(&pr.author),
        groups: Vec::new(),
        requested_reviewers: requested,
        mergeable: false,
        reason: None,
    };

    if let Some(block) = merge_preflight(
        pr,
        settings.do_not_merge_labels,
        settings.do_not_merge_on_base_branch,
    ) {
        tracing::warn!(pr = pr.number, reason = %block, "not a merge candidate");
        plan.reason = Some(block.to_string());
        return plan;
    }

    plan.groups = classify(&policy.file_changes_groups, &snap.changed_files);
    let rules: Vec<&Rule> = applicable_rules(&pr.author, &plan.groups, policy)
        .into_iter()
        .map(|a| a.rule)
        .collect();
    let decision = is_fully_approved(
        &rules,
        policy.required_checks(),
        &snap.reviews,
        &snap.checks,
        &plan.requested_reviewers,
        &snap.requested_reviewers,
    );
    plan.mergeable = decision.is_ready();
    plan.reason = decision.reason().map(|r| r.to_string());
    plan
}

/// Plan assignments for many pull requests in parallel.
///
/// With a seed, snapshot `i` draws from a generator seeded with `seed + i`,
/// making the whole batch reproducible.
pub fn plan_assignment_batch(policy: &Policy, snaps: &[Snapshot], seed: Option<u64>) -> Vec<AssignmentPlan> {
    snaps
        .par_iter()
        .enumerate()
        .map(|(i, snap)| match seed {
            Some(seed) => {
                let mut rng = RngSource(StdRng::seed_from_u64(seed.wrapping_add(i as u64)));
                plan_assignment(policy, snap, &mut rng)
            }
            None => plan_assignment(policy, snap, &mut thread_random()),
        })
        .collect()
}

pub fn plan_merge_batch(policy: &Policy, snaps: &[Snapshot], settings: MergeSettings<'_>) -> Vec<MergePlan> {
    snaps
        .par_iter()
        .map(|snap| plan_merge(policy, snap, settings))
        .collect()
}
