//! Typed errors for loading inputs.
//!
//! - `PolicyError`: policy document unreadable, unparsable, or invalid.
//! - `SnapshotError`: pull request snapshot files unreadable or unparsable.
//!
//! Gate failures are not errors; see `gate::BlockReason`.

use crate::models::ValidationIssue;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before any evaluation runs.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to read policy at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Policy at {path} is not valid YAML or JSON: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid policy: {}", render_issues(.issues))]
    Invalid { issues: Vec<ValidationIssue> },
}

/// Errors from reading snapshot input files.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.path, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}
