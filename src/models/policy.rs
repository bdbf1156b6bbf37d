//! Review policy schema consumed by the engine.
//!
//! Key components:
//! - `rulesByCreator`: per-author rule lists, keyed by normalized login.
//! - `defaultRules.byFileGroups`: fallback rules keyed by file-change group,
//!   used only for authors without an entry in `rulesByCreator`.
//! - `fileChangesGroups`: named glob pattern lists used to classify changed files.
//! - `options`: assignment suppression, required CI checks and comment settings.
//! - `sageUsers`: login to HR roster e-mail mapping used for absentee lookup.
//!
//! Instances are produced by `validate::validate_policy` and are never mutated
//! afterwards. All logins (map keys and reviewer entries) are trimmed and
//! lowercased.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Validated policy document.
pub struct Policy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Options>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rules: Option<DefaultRules>,
    pub rules_by_creator: BTreeMap<String, Vec<Rule>>,
    pub file_changes_groups: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sage_users: Option<BTreeMap<String, Vec<SageUser>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Behavior switches under `options`.
pub struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_reassign_for_merged_prs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_reassign_for_merge_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_checks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_message: Option<WithMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Comment settings; `message_id` keys the marker used to update in place.
pub struct WithMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A reviewer pool with approval and assignment thresholds.
///
/// `required`: minimum distinct approvals from `reviewers`.
/// `assign`: how many reviewers to request; `None` or `0` requests everyone eligible.
/// `if_changed`: group names gating the rule; the rule applies when any matched.
pub struct Rule {
    pub reviewers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_changed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Fallback rules for authors without their own rule list.
pub struct DefaultRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_file_groups: Option<BTreeMap<String, Vec<Rule>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Roster identity of a login in the HR system.
pub struct SageUser {
    pub email: String,
}

impl Policy {
    /// Whether an assignment comment should be rendered (`options.withMessage` set).
    pub fn wants_comment(&self) -> bool {
        self.options
            .as_ref()
            .is_some_and(|o| o.with_message.is_some())
    }

    pub fn required_checks(&self) -> &[String] {
        self.options
            .as_ref()
            .and_then(|o| o.required_checks.as_deref())
            .unwrap_or(&[])
    }

    pub fn message_id(&self) -> Option<&str> {
        self.options
            .as_ref()
            .and_then(|o| o.with_message.as_ref())
            .and_then(|m| m.message_id.as_deref())
    }
}

impl Rule {
    /// Whether the rule caps the number of requested reviewers.
    pub fn assign_limit(&self) -> Option<usize> {
        match self.assign {
            Some(n) if n > 0 => Some(n as usize),
            _ => None,
        }
    }

    pub fn required_approvals(&self) -> usize {
        self.required.unwrap_or(0) as usize
    }
}
