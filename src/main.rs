//! reviewgate CLI binary entry point.
//! Loads policy and snapshots, delegates to the engine and prints results.

use clap::Parser;
use reviewgate::cli::{Cli, Commands};
use reviewgate::config::{self, Effective};
use reviewgate::errors::PolicyError;
use reviewgate::evaluate::{self, MergeSettings};
use reviewgate::models::policy::Policy;
use reviewgate::models::pull_request::Snapshot;
use reviewgate::utils::{error_prefix, note_prefix};
use reviewgate::{classify, output, validate};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn resolve(repo_root: Option<String>, policy: Option<String>, output: Option<String>) -> Effective {
    let eff = config::resolve_effective(repo_root.as_deref(), policy.as_deref(), output.as_deref());
    if eff.output != "json" && config::load_config(&eff.repo_root).is_none() {
        eprintln!("{} No reviewgate.toml found; using defaults.", note_prefix());
    }
    eff
}

fn load_policy_or_exit(eff: &Effective) -> Policy {
    match validate::load_policy(&eff.policy_path()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn load_snapshots_or_exit(path: &str) -> Vec<Snapshot> {
    match evaluate::load_snapshots(Path::new(path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate {
            repo_root,
            policy,
            output,
        } => {
            let eff = resolve(repo_root, policy, output);
            let path = eff.policy_path();
            let shown = path.to_string_lossy().to_string();
            match validate::load_policy(&path) {
                Ok(_) => output::print_validation(&shown, &[], &eff.output),
                Err(PolicyError::Invalid { issues }) => {
                    output::print_validation(&shown, &issues, &eff.output);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("{} {}", error_prefix(), e);
                    std::process::exit(2);
                }
            }
        }
        Commands::Groups {
            repo_root,
            policy,
            output,
            files,
        } => {
            let eff = resolve(repo_root, policy, output);
            let policy = load_policy_or_exit(&eff);
            let groups = classify::classify(&policy.file_changes_groups, &files);
            output::print_groups(&groups, &eff.output);
        }
        Commands::Assign {
            repo_root,
            policy,
            output,
            snapshot,
            seed,
        } => {
            let eff = resolve(repo_root, policy, output);
            let policy = load_policy_or_exit(&eff);
            let snaps = load_snapshots_or_exit(&snapshot);
            let plans = evaluate::plan_assignment_batch(&policy, &snaps, seed);
            output::print_assign(&plans, &eff.output);
        }
        Commands::Gate {
            repo_root,
            policy,
            output,
            snapshot,
        } => {
            let eff = resolve(repo_root, policy, output);
            let policy = load_policy_or_exit(&eff);
            let snaps = load_snapshots_or_exit(&snapshot);
            let settings = MergeSettings {
                do_not_merge_labels: &eff.do_not_merge_labels,
                do_not_merge_on_base_branch: &eff.do_not_merge_on_base_branch,
            };
            let plans = evaluate::plan_merge_batch(&policy, &snaps, settings);
            output::print_gate(&plans, &eff.output);
            if plans.iter().any(|p| !p.mergeable) {
                std::process::exit(1);
            }
        }
    }
}
