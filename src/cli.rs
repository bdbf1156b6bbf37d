//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "reviewgate",
    version,
    about = "Review assignment and merge gating for pull requests",
    long_about = "reviewgate — decide who reviews a pull request and whether it may merge, from a declarative review policy and a snapshot of the pull request.\n\nConfiguration precedence: CLI > reviewgate.toml > defaults.",
    after_help = "Examples:\n  reviewgate validate --policy .github/review-policy.yml\n  reviewgate assign --snapshot pr.json --seed 42\n  reviewgate gate --snapshot prs.json --output json\n  reviewgate groups src/main.rs docs/index.md",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, global = true, default_value = "warn", help = "Log filter (tracing env-filter syntax)")]
    pub log_level: String,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current reviewgate version.")]
    Version,
    /// Validate the review policy
    #[command(
        about = "Validate the review policy",
        long_about = "Parse and validate the policy document, listing every offending field.",
        after_help = "Examples:\n  reviewgate validate\n  reviewgate validate --policy review.yml --output json"
    )]
    Validate {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the policy document, relative to the repository root")]
        policy: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Classify changed files into policy groups
    #[command(
        about = "Classify changed files",
        long_about = "Print the file-change groups matched by the given paths.",
        after_help = "Examples:\n  reviewgate groups server/api.rs README.md"
    )]
    Groups {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the policy document, relative to the repository root")]
        policy: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Changed file paths")]
        files: Vec<String>,
    },
    /// Select reviewers for pull requests
    #[command(
        about = "Select reviewers",
        long_about = "Compute the reviewers to request and the assignment comment for each snapshot.",
        after_help = "Examples:\n  reviewgate assign --snapshot pr.json\n  reviewgate assign --snapshot prs.json --seed 7 --output json"
    )]
    Assign {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the policy document, relative to the repository root")]
        policy: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Snapshot JSON file (one object or an array)")]
        snapshot: String,
        #[arg(long, help = "Seed for a reproducible random draw")]
        seed: Option<u64>,
    },
    /// Evaluate the merge gate for pull requests
    #[command(
        about = "Evaluate the merge gate",
        long_about = "Check required CI checks and approvals for each snapshot. Exits non-zero when any pull request is blocked.",
        after_help = "Examples:\n  reviewgate gate --snapshot pr.json"
    )]
    Gate {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the policy document, relative to the repository root")]
        policy: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Snapshot JSON file (one object or an array)")]
        snapshot: String,
    },
}
