//! Policy loading and validation.
//!
//! The policy document (YAML or JSON) is parsed into a JSON value tree and
//! walked once. Every problem is recorded as a `ValidationIssue` with a
//! `$.`-rooted path so the caller sees all of them at once. Normalization:
//! - logins under `rulesByCreator` and `sageUsers`, and every rule reviewer,
//!   are trimmed and lowercased;
//! - `ignoreReassignForMergedPRs` accepts `"true"`/`"false"` strings;
//! - numeric fields accept integer strings;
//! - unknown fields are dropped;
//! - optional fields set to `null` are treated as absent.

use crate::errors::PolicyError;
use crate::models::policy::{DefaultRules, Options, Policy, Rule, SageUser, WithMessage};
use crate::models::pull_request::normalize_login;
use crate::models::ValidationIssue;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read, parse, and validate the policy document at `path`.
pub fn load_policy(path: &Path) -> Result<Policy, PolicyError> {
    let text = fs::read_to_string(path).map_err(|source| PolicyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_document(&text).map_err(|message| PolicyError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    validate_policy(&raw)
}

/// Parse YAML (a superset of JSON) into a JSON value tree.
pub fn parse_document(text: &str) -> Result<Json, String> {
    serde_yaml::from_str::<Json>(text).map_err(|e| e.to_string())
}

/// Validate and normalize a raw policy document.
pub fn validate_policy(raw: &Json) -> Result<Policy, PolicyError> {
    let mut v = Validator::default();
    let policy = v.policy(raw);
    match policy {
        Some(p) if v.issues.is_empty() => {
            tracing::debug!(
                authors = p.rules_by_creator.len(),
                groups = p.file_changes_groups.len(),
                "policy validated"
            );
            Ok(p)
        }
        _ => Err(PolicyError::Invalid { issues: v.issues }),
    }
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn issue(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn policy(&mut self, raw: &Json) -> Option<Policy> {
        let Some(root) = raw.as_object() else {
            self.issue("$", "policy must be an object");
            return None;
        };

        let rules_by_creator = match root.get("rulesByCreator") {
            None => {
                self.issue("$.rulesByCreator", "is required");
                None
            }
            Some(v) => self.rules_by_creator(v, "$.rulesByCreator"),
        };
        let file_changes_groups = match root.get("fileChangesGroups") {
            None => {
                self.issue("$.fileChangesGroups", "is required");
                None
            }
            Some(v) => self.file_changes_groups(v, "$.fileChangesGroups"),
        };
        let options = optional(root, "options").and_then(|v| self.options(v, "$.options"));
        let default_rules =
            optional(root, "defaultRules").and_then(|v| self.default_rules(v, "$.defaultRules"));
        let sage_users =
            optional(root, "sageUsers").and_then(|v| self.sage_users(v, "$.sageUsers"));

        Some(Policy {
            options,
            default_rules,
            rules_by_creator: rules_by_creator?,
            file_changes_groups: file_changes_groups?,
            sage_users,
        })
    }

    fn object<'a>(&mut self, v: &'a Json, path: &str) -> Option<&'a Map<String, Json>> {
        match v.as_object() {
            Some(o) => Some(o),
            None => {
                self.issue(path, "must be an object");
                None
            }
        }
    }

    fn string(&mut self, v: &Json, path: &str) -> Option<String> {
        match v.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.issue(path, "must be a string");
                None
            }
        }
    }

    fn string_list(&mut self, v: &Json, path: &str) -> Option<Vec<String>> {
        let Some(items) = v.as_array() else {
            self.issue(path, "must be an array of strings");
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match self.string(item, &format!("{}[{}]", path, i)) {
                Some(s) => out.push(s),
                None => ok = false,
            }
        }
        ok.then_some(out)
    }

    fn login_list(&mut self, v: &Json, path: &str) -> Option<Vec<String>> {
        let raw = self.string_list(v, path)?;
        let mut out = Vec::with_capacity(raw.len());
        for (i, login) in raw.iter().enumerate() {
            let norm = normalize_login(login);
            if norm.is_empty() {
                self.issue(&format!("{}[{}]", path, i), "login must not be blank");
                continue;
            }
            out.push(norm);
        }
        Some(out)
    }

    fn count(&mut self, v: &Json, path: &str) -> Option<u32> {
        let parsed = match v {
            Json::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            }),
            Json::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        match parsed.and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.issue(path, "must be a non-negative integer");
                None
            }
        }
    }

    fn boolean(&mut self, v: &Json, path: &str) -> Option<bool> {
        match v {
            Json::Bool(b) => Some(*b),
            Json::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
            Json::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
            _ => {
                self.issue(path, "must be a boolean");
                None
            }
        }
    }

    fn rule(&mut self, v: &Json, path: &str) -> Option<Rule> {
        let obj = self.object(v, path)?;
        let reviewers = match obj.get("reviewers") {
            None | Some(Json::Null) => {
                self.issue(&format!("{}.reviewers", path), "is required");
                None
            }
            Some(r) => self.login_list(r, &format!("{}.reviewers", path)),
        };
        let required = optional(obj, "required").and_then(|r| self.count(r, &format!("{}.required", path)));
        let assign = optional(obj, "assign").and_then(|a| self.count(a, &format!("{}.assign", path)));
        let if_changed = optional(obj, "ifChanged")
            .and_then(|g| self.string_list(g, &format!("{}.ifChanged", path)));
        Some(Rule {
            reviewers: reviewers?,
            required,
            assign,
            if_changed,
        })
    }

    fn rule_list(&mut self, v: &Json, path: &str) -> Option<Vec<Rule>> {
        let Some(items) = v.as_array() else {
            self.issue(path, "must be an array of rules");
            return None;
        };
        let rules: Vec<Rule> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.rule(item, &format!("{}[{}]", path, i)))
            .collect();
        Some(rules)
    }

    fn rules_by_creator(&mut self, v: &Json, path: &str) -> Option<BTreeMap<String, Vec<Rule>>> {
        let obj = self.object(v, path)?;
        let mut out: BTreeMap<String, Vec<Rule>> = BTreeMap::new();
        for (login, rules) in obj {
            let Some(rules) = self.rule_list(rules, &format!("{}.{}", path, login)) else {
                continue;
            };
            let key = normalize_login(login);
            if key.is_empty() {
                self.issue(&format!("{}.{}", path, login), "login must not be blank");
                continue;
            }
            if out.contains_key(&key) {
                tracing::warn!(login = %key, "duplicate author entry after normalization; rules concatenated");
            }
            out.entry(key).or_default().extend(rules);
        }
        Some(out)
    }

    fn file_changes_groups(
        &mut self,
        v: &Json,
        path: &str,
    ) -> Option<BTreeMap<String, Vec<String>>> {
        let obj = self.object(v, path)?;
        let mut out = BTreeMap::new();
        for (name, patterns) in obj {
            let group_path = format!("{}.{}", path, name);
            let Some(patterns) = self.string_list(patterns, &group_path) else {
                continue;
            };
            for (i, pat) in patterns.iter().enumerate() {
                if let Err(e) = glob::Pattern::new(pat) {
                    self.issue(
                        &format!("{}[{}]", group_path, i),
                        format!("invalid glob pattern '{}': {}", pat, e.msg),
                    );
                }
            }
            out.insert(name.clone(), patterns);
        }
        Some(out)
    }

    fn default_rules(&mut self, v: &Json, path: &str) -> Option<DefaultRules> {
        let obj = self.object(v, path)?;
        let by_file_groups = optional(obj, "byFileGroups").and_then(|g| {
            let gpath = format!("{}.byFileGroups", path);
            let groups = self.object(g, &gpath)?;
            let mut out = BTreeMap::new();
            for (name, rules) in groups {
                if let Some(rules) = self.rule_list(rules, &format!("{}.{}", gpath, name)) {
                    out.insert(name.clone(), rules);
                }
            }
            Some(out)
        });
        Some(DefaultRules { by_file_groups })
    }

    fn options(&mut self, v: &Json, path: &str) -> Option<Options> {
        let obj = self.object(v, path)?;
        let ignored_labels = optional(obj, "ignoredLabels")
            .and_then(|l| self.string_list(l, &format!("{}.ignoredLabels", path)));
        let ignore_reassign_for_merged_prs = optional(obj, "ignoreReassignForMergedPRs")
            .and_then(|b| self.boolean(b, &format!("{}.ignoreReassignForMergedPRs", path)));
        let ignore_reassign_for_merge_from = optional(obj, "ignoreReassignForMergeFrom")
            .and_then(|s| self.string(s, &format!("{}.ignoreReassignForMergeFrom", path)));
        let required_checks = optional(obj, "requiredChecks")
            .and_then(|c| self.string_list(c, &format!("{}.requiredChecks", path)));
        let with_message = optional(obj, "withMessage").and_then(|m| {
            let mpath = format!("{}.withMessage", path);
            let mobj = self.object(m, &mpath)?;
            let message_id = optional(mobj, "messageId")
                .and_then(|id| self.string(id, &format!("{}.messageId", mpath)));
            Some(WithMessage { message_id })
        });
        Some(Options {
            ignored_labels,
            ignore_reassign_for_merged_prs,
            ignore_reassign_for_merge_from,
            required_checks,
            with_message,
        })
    }

    fn sage_users(&mut self, v: &Json, path: &str) -> Option<BTreeMap<String, Vec<SageUser>>> {
        let obj = self.object(v, path)?;
        let mut out = BTreeMap::new();
        for (login, entries) in obj {
            let lpath = format!("{}.{}", path, login);
            let Some(items) = entries.as_array() else {
                self.issue(&lpath, "must be an array of {email} entries");
                continue;
            };
            let mut users = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let ipath = format!("{}[{}]", lpath, i);
                let Some(entry) = self.object(item, &ipath) else {
                    continue;
                };
                match entry.get("email") {
                    None | Some(Json::Null) => self.issue(&format!("{}.email", ipath), "is required"),
                    Some(e) => {
                        if let Some(email) = self.string(e, &format!("{}.email", ipath)) {
                            users.push(SageUser { email });
                        }
                    }
                }
            }
            let key = normalize_login(login);
            if key.is_empty() {
                self.issue(&lpath, "login must not be blank");
                continue;
            }
            out.insert(key, users);
        }
        Some(out)
    }
}

/// Look up an optional key; `null` counts as absent.
fn optional<'a>(obj: &'a Map<String, Json>, key: &str) -> Option<&'a Json> {
    obj.get(key).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::tempdir;

    fn issues_of(raw: Json) -> Vec<ValidationIssue> {
        match validate_policy(&raw) {
            Err(PolicyError::Invalid { issues }) => issues,
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_fields_reported_together() {
        let issues = issues_of(json!({}));
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["$.rulesByCreator", "$.fileChangesGroups"]);
        assert!(issues.iter().all(|i| i.message == "is required"));
    }

    #[test]
    fn test_minimal_policy_passes() {
        let p = validate_policy(&json!({
            "options": {},
            "defaultRules": {},
            "rulesByCreator": {},
            "fileChangesGroups": {}
        }))
        .unwrap();
        assert!(p.rules_by_creator.is_empty());
        assert_eq!(p.options, Some(Options::default()));
        assert_eq!(p.default_rules, Some(DefaultRules::default()));
    }

    #[test]
    fn test_coerces_merged_pr_flag_from_string() {
        let p = validate_policy(&json!({
            "options": {"ignoreReassignForMergedPRs": "false", "ignoreReassignForMergeFrom": "main"},
            "rulesByCreator": {},
            "fileChangesGroups": {}
        }))
        .unwrap();
        let o = p.options.unwrap();
        assert_eq!(o.ignore_reassign_for_merged_prs, Some(false));
        assert_eq!(o.ignore_reassign_for_merge_from.as_deref(), Some("main"));
    }

    #[test]
    fn test_lowercases_and_trims_logins() {
        let p = validate_policy(&json!({
            "rulesByCreator": {
                " Alice ": [{"reviewers": ["  BoB", "Carol "], "required": 1, "assign": "1"}]
            },
            "fileChangesGroups": {"src": ["src/**"]},
            "sageUsers": {"BoB": [{"email": "bob@example.com"}]}
        }))
        .unwrap();
        let rules = &p.rules_by_creator["alice"];
        assert_eq!(rules[0].reviewers, vec!["bob", "carol"]);
        assert_eq!(rules[0].required, Some(1));
        assert_eq!(rules[0].assign, Some(1));
        assert!(p.sage_users.unwrap().contains_key("bob"));
    }

    #[test]
    fn test_strips_unknown_fields() {
        let p = validate_policy(&json!({
            "rulesByCreator": {"a": [{"reviewers": ["b"], "color": "red"}]},
            "fileChangesGroups": {},
            "whatever": true
        }))
        .unwrap();
        assert_eq!(p.rules_by_creator["a"][0].reviewers, vec!["b"]);
        let out = serde_json::to_value(&p).unwrap();
        assert!(out.get("whatever").is_none());
    }

    #[test]
    fn test_rejects_negative_counts_bad_globs_and_missing_emails() {
        let issues = issues_of(json!({
            "rulesByCreator": {"a": [{"reviewers": ["b"], "required": -1, "assign": 1.5}]},
            "fileChangesGroups": {"bad": ["src/[a"]},
            "sageUsers": {"b": [{}]},
            "options": {"ignoreReassignForMergedPRs": "maybe"}
        }));
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"$.rulesByCreator.a[0].required"));
        assert!(paths.contains(&"$.rulesByCreator.a[0].assign"));
        assert!(paths.contains(&"$.fileChangesGroups.bad[0]"));
        assert!(paths.contains(&"$.sageUsers.b[0].email"));
        assert!(paths.contains(&"$.options.ignoreReassignForMergedPRs"));
    }

    #[test]
    fn test_rule_without_reviewers_is_invalid() {
        let issues = issues_of(json!({
            "rulesByCreator": {"a": [{"required": 1}]},
            "fileChangesGroups": {}
        }));
        assert_eq!(issues[0].path, "$.rulesByCreator.a[0].reviewers");
    }

    #[test]
    fn test_blank_author_and_roster_keys_are_invalid() {
        let issues = issues_of(json!({
            "rulesByCreator": {"  ": [{"reviewers": ["b"]}], "a": [{"reviewers": ["b"]}]},
            "fileChangesGroups": {},
            "sageUsers": {"": [{"email": "x@example.com"}]}
        }));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, "$.rulesByCreator.  ");
        assert_eq!(issues[0].message, "login must not be blank");
        assert_eq!(issues[1].path, "$.sageUsers.");
        assert_eq!(issues[1].message, "login must not be blank");
    }

    #[test]
    fn test_duplicate_authors_after_normalization_are_concatenated() {
        let p = validate_policy(&json!({
            "rulesByCreator": {"Alice": [{"reviewers": ["b"]}], "alice": [{"reviewers": ["c"]}]},
            "fileChangesGroups": {}
        }))
        .unwrap();
        assert_eq!(p.rules_by_creator["alice"].len(), 2);
    }

    #[test]
    fn test_load_policy_from_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.yml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            "{}",
            r#"
options:
  requiredChecks: [build]
  withMessage:
    messageId: reviewers
rulesByCreator:
  Alice:
    - reviewers: [Bob, carol]
      required: 1
      assign: 1
      ifChanged: [backend]
defaultRules:
  byFileGroups:
    backend:
      - reviewers: [dave]
        required: 1
fileChangesGroups:
  backend: ["server/**"]
"#
        )
        .unwrap();
        let p = load_policy(&path).unwrap();
        assert_eq!(p.required_checks(), ["build".to_string()]);
        assert_eq!(p.message_id(), Some("reviewers"));
        assert_eq!(
            p.rules_by_creator["alice"][0].if_changed,
            Some(vec!["backend".to_string()])
        );
        let defaults = p.default_rules.unwrap().by_file_groups.unwrap();
        assert_eq!(defaults["backend"][0].reviewers, vec!["dave"]);
    }

    #[test]
    fn test_load_policy_reports_missing_and_unparsable_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        assert!(matches!(load_policy(&missing), Err(PolicyError::Read { .. })));
        let broken = dir.path().join("broken.yml");
        fs::write(&broken, "rulesByCreator: [unclosed").unwrap();
        assert!(matches!(load_policy(&broken), Err(PolicyError::Parse { .. })));
    }
}
