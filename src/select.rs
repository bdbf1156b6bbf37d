//! Reviewer selection.
//!
//! Rule resolution:
//! - the author's own rules apply in declaration order; a rule with
//!   `ifChanged` applies only if one of those groups was classified;
//! - authors without rules fall back to `defaultRules.byFileGroups`, taking
//!   the rules of each classified group;
//! - otherwise nothing applies.
//!
//! Per rule, eligible reviewers are the rule's reviewers minus the author and
//! absentees. Without an `assign` cap everyone eligible is picked. With a cap,
//! already-requested eligible reviewers are kept first and the rest is drawn
//! at random without replacement until the cap (clamped to the pool) is met.

use crate::models::policy::{Policy, Rule};
use crate::models::pull_request::normalize_login;
use rand::Rng;
use std::fmt;

/// Source of uniform random indices.
pub trait RandomSource {
    /// Return an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Adapter for any `rand` generator.
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

pub fn thread_random() -> RngSource<rand::rngs::ThreadRng> {
    RngSource(rand::thread_rng())
}

/// Replays a fixed sequence of indices; values past the end of the range are
/// clamped to the last index and an exhausted script yields 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: Vec<usize>,
    pos: usize,
}

impl ScriptedRandom {
    pub fn new(script: impl Into<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
            pos: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn pick(&mut self, len: usize) -> usize {
        let v = self.script.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        v.min(len - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where an applied rule was declared. Indexes are zero-based.
pub enum RuleSource {
    Author { login: String, index: usize },
    Group { group: String, index: usize },
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Author { login, index } => write!(f, "rule #{} for {}", index + 1, login),
            RuleSource::Group { group, index } => {
                write!(f, "default rule #{} for group {}", index + 1, group)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A rule that applies to the pull request, with its provenance.
pub struct AppliedRule<'a> {
    pub source: RuleSource,
    pub rule: &'a Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Reviewers one rule contributed.
pub struct RuleSelection {
    pub source: RuleSource,
    pub reviewers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Union of all picks plus the per-rule breakdown.
pub struct Selection {
    pub reviewers: Vec<String>,
    pub picks: Vec<RuleSelection>,
}

/// Resolve the rules that apply to a pull request by `author` touching `groups`.
pub fn applicable_rules<'a>(author: &str, groups: &[String], policy: &'a Policy) -> Vec<AppliedRule<'a>> {
    let author = normalize_login(author);
    if let Some(rules) = policy.rules_by_creator.get(&author) {
        return rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| match &rule.if_changed {
                Some(wanted) => wanted.iter().any(|g| groups.contains(g)),
                None => true,
            })
            .map(|(index, rule)| AppliedRule {
                source: RuleSource::Author {
                    login: author.clone(),
                    index,
                },
                rule,
            })
            .collect();
    }

    tracing::info!(author = %author, "no rules for author");
    let Some(by_group) = policy
        .default_rules
        .as_ref()
        .and_then(|d| d.by_file_groups.as_ref())
    else {
        return Vec::new();
    };
    tracing::info!("using default rules");
    let mut out = Vec::new();
    for group in groups {
        let Some(rules) = by_group.get(group) else {
            continue;
        };
        for (index, rule) in rules.iter().enumerate() {
            out.push(AppliedRule {
                source: RuleSource::Group {
                    group: group.clone(),
                    index,
                },
                rule,
            });
        }
    }
    out
}

/// Select the reviewers to request for a pull request.
pub fn select_reviewers(
    author: &str,
    groups: &[String],
    policy: &Policy,
    already_requested: &[String],
    absent: &[String],
    rng: &mut dyn RandomSource,
) -> Selection {
    let author_norm = normalize_login(author);
    let requested: Vec<String> = already_requested.iter().map(|l| normalize_login(l)).collect();
    let absent: Vec<String> = absent.iter().map(|l| normalize_login(l)).collect();

    let mut selection = Selection::default();
    for applied in applicable_rules(author, groups, policy) {
        let picked = pick_for_rule(applied.rule, &author_norm, &requested, &absent, rng);
        tracing::debug!(source = %applied.source, reviewers = ?picked, "rule picked reviewers");
        for login in &picked {
            if !selection.reviewers.contains(login) {
                selection.reviewers.push(login.clone());
            }
        }
        selection.picks.push(RuleSelection {
            source: applied.source,
            reviewers: picked,
        });
    }
    selection
}

fn pick_for_rule(
    rule: &Rule,
    author: &str,
    requested: &[String],
    absent: &[String],
    rng: &mut dyn RandomSource,
) -> Vec<String> {
    let mut eligible: Vec<String> = Vec::new();
    for reviewer in &rule.reviewers {
        if reviewer == author || absent.contains(reviewer) || eligible.contains(reviewer) {
            continue;
        }
        eligible.push(reviewer.clone());
    }

    let Some(limit) = rule.assign_limit() else {
        return eligible;
    };
    let target = limit.min(eligible.len());

    let (mut picked, mut pool): (Vec<String>, Vec<String>) =
        eligible.into_iter().partition(|r| requested.contains(r));
    while picked.len() < target && !pool.is_empty() {
        let idx = rng.pick(pool.len());
        picked.push(pool.remove(idx));
    }
    picked
}
