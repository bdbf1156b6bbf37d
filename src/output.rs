//! Output rendering for assign, gate, groups, and validate commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::models::{AssignmentPlan, MergePlan, ValidationIssue};
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to render JSON output: {}", e),
    }
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Print assignment plans in the requested format.
pub fn print_assign(plans: &[AssignmentPlan], output: &str) {
    match output {
        "json" => print_json(&compose_assign_json(plans)),
        _ => {
            let color = use_colors(output);
            for p in plans {
                let head = format!("#{} by {}", p.number, p.author);
                let head = if color { head.bold().to_string() } else { head };
                if let Some(reason) = &p.skipped {
                    let tag = if color {
                        "⏭️  skipped:".yellow().bold().to_string()
                    } else {
                        "⏭️  skipped:".to_string()
                    };
                    println!("{} {} ({})", tag, head, reason);
                    continue;
                }
                let tag = if color {
                    "📥 request:".green().bold().to_string()
                } else {
                    "📥 request:".to_string()
                };
                println!("{} {} -> {}", tag, head, list_or_dash(&p.reviewers));
                println!("    groups: {}", list_or_dash(&p.groups));
                if !p.absentees.is_empty() {
                    println!("    absent: {}", p.absentees.join(", "));
                }
                for pick in &p.picks {
                    println!("    {}: {}", pick.source, list_or_dash(&pick.reviewers));
                }
                if let Some(body) = &p.comment {
                    let action = match p.existing_comment {
                        Some(_) => "update comment",
                        None => "create comment",
                    };
                    println!("    {}:\n{}", action, body);
                }
            }
        }
    }
}

/// Print merge gate results.
pub fn print_gate(plans: &[MergePlan], output: &str) {
    match output {
        "json" => print_json(&compose_gate_json(plans)),
        _ => {
            let color = use_colors(output);
            for p in plans {
                if p.mergeable {
                    let tag = if color {
                        "✔ mergeable:".green().bold().to_string()
                    } else {
                        "✔ mergeable:".to_string()
                    };
                    println!("{} #{} by {}", tag, p.number, p.author);
                } else {
                    let tag = if color {
                        "✖ blocked:".red().bold().to_string()
                    } else {
                        "✖ blocked:".to_string()
                    };
                    println!(
                        "{} #{} by {} — {}",
                        tag,
                        p.number,
                        p.author,
                        p.reason.as_deref().unwrap_or("PR is not fully approved")
                    );
                }
            }
            let summary = format!(
                "— Summary — mergeable={} blocked={} total={}",
                plans.iter().filter(|p| p.mergeable).count(),
                plans.iter().filter(|p| !p.mergeable).count(),
                plans.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

pub fn print_groups(groups: &[String], output: &str) {
    match output {
        "json" => print_json(&json!({ "groups": groups })),
        _ => {
            for g in groups {
                println!("{}", g);
            }
        }
    }
}

/// Print validation issues, or a confirmation when there are none.
pub fn print_validation(path: &str, issues: &[ValidationIssue], output: &str) {
    match output {
        "json" => print_json(&json!({
            "policy": path,
            "valid": issues.is_empty(),
            "issues": issues,
        })),
        _ => {
            let color = use_colors(output);
            if issues.is_empty() {
                if color {
                    println!("{} {}", "✔ valid:".green().bold(), path);
                } else {
                    println!("✔ valid: {}", path);
                }
                return;
            }
            for is in issues {
                let sev = if color {
                    "⟦error⟧".red().bold().to_string()
                } else {
                    "⟦error⟧".to_string()
                };
                println!("✖ {} {} ❲{}❳ — {}", sev, path, is.path, is.message);
            }
        }
    }
}

/// Compose assignment JSON (pure) for testing/snapshot purposes.
pub fn compose_assign_json(plans: &[AssignmentPlan]) -> JsonVal {
    let summary = json!({
        "skipped": plans.iter().filter(|p| p.skipped.is_some()).count(),
        "requested": plans.iter().map(|p| p.reviewers.len()).sum::<usize>(),
        "total": plans.len(),
    });
    json!({ "results": plans, "summary": summary })
}

/// Compose gate JSON (pure) for testing/snapshot purposes.
pub fn compose_gate_json(plans: &[MergePlan]) -> JsonVal {
    let summary = json!({
        "mergeable": plans.iter().filter(|p| p.mergeable).count(),
        "blocked": plans.iter().filter(|p| !p.mergeable).count(),
        "total": plans.len(),
    });
    json!({ "results": plans, "summary": summary })
}
