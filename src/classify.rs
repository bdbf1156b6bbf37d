//! File-change group classification.
//!
//! A group matches when any changed path matches any of its glob patterns.
//! Matching is case-sensitive; `*` and `?` stop at `/`, `**` spans
//! directories, and wildcards do not match a leading dot.

use glob::{MatchOptions, Pattern};
use std::collections::BTreeMap;

pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Return the names of groups matched by `changed_files`, in first-match order.
pub fn classify(groups: &BTreeMap<String, Vec<String>>, changed_files: &[String]) -> Vec<String> {
    let compiled: Vec<(&String, Vec<Pattern>)> = groups
        .iter()
        .map(|(name, patterns)| {
            let pats = patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect();
            (name, pats)
        })
        .collect();

    let mut matched: Vec<String> = Vec::new();
    for file in changed_files {
        for (name, patterns) in &compiled {
            if matched.iter().any(|m| m == *name) {
                continue;
            }
            if patterns
                .iter()
                .any(|p| p.matches_with(file, MATCH_OPTIONS))
            {
                matched.push((*name).clone());
            }
        }
    }
    tracing::debug!(groups = ?matched, files = changed_files.len(), "classified changed files");
    matched
}
