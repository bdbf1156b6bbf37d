//! Configuration discovery and effective settings resolution.
//!
//! reviewgate reads `reviewgate.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `policy`: `.github/review-policy.yml`
//! - `output`: `human`
//! - `merge.doNotMergeLabels|doNotMergeOnBaseBranch`: empty
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_POLICY: &str = ".github/review-policy.yml";

#[derive(Debug, Default, Deserialize, Clone)]
/// Merge-related configuration section under `[merge]`.
pub struct MergeCfg {
    #[serde(rename = "doNotMergeLabels")]
    pub do_not_merge_labels: Option<Vec<String>>,
    #[serde(rename = "doNotMergeOnBaseBranch")]
    pub do_not_merge_on_base_branch: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `reviewgate.toml|yaml`.
pub struct GateConfig {
    pub policy: Option<String>,
    pub output: Option<String>,
    pub merge: Option<MergeCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub policy: String,
    pub output: String,
    pub do_not_merge_labels: Vec<String>,
    pub do_not_merge_on_base_branch: Vec<String>,
}

impl Effective {
    pub fn policy_path(&self) -> PathBuf {
        self.repo_root.join(&self.policy)
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `reviewgate.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("reviewgate.toml").exists()
            || cur.join("reviewgate.yaml").exists()
            || cur.join("reviewgate.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `GateConfig` from `reviewgate.toml` or `reviewgate.yaml|yml` if present.
///
/// An unreadable or malformed file is logged and treated as absent.
pub fn load_config(root: &Path) -> Option<GateConfig> {
    let toml_path = root.join("reviewgate.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str::<GateConfig>(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!(path = %toml_path.display(), error = %e, "ignoring malformed config");
                None
            }
        };
    }
    for yml in ["reviewgate.yaml", "reviewgate.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str::<GateConfig>(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "ignoring malformed config");
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_policy: Option<&str>,
    cli_output: Option<&str>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let policy = cli_policy
        .map(|s| s.to_string())
        .or(cfg.policy)
        .unwrap_or_else(|| DEFAULT_POLICY.to_string());

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let merge = cfg.merge.unwrap_or_default();

    Effective {
        repo_root,
        policy,
        output,
        do_not_merge_labels: merge.do_not_merge_labels.unwrap_or_default(),
        do_not_merge_on_base_branch: merge.do_not_merge_on_base_branch.unwrap_or_default(),
    }
}
