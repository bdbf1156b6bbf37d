//! Assignment comment rendering.
//!
//! The body lists matched file groups and what each rule contributed. With a
//! message id, a hidden marker is embedded so later runs can find and update
//! the same comment.

use crate::select::Selection;

pub fn comment_marker(message_id: &str) -> String {
    format!("<!-- reviewgate:{} -->", message_id)
}

/// Index of the first comment carrying the marker for `message_id`.
pub fn find_marked_comment(comments: &[String], message_id: &str) -> Option<usize> {
    let marker = comment_marker(message_id);
    comments.iter().position(|body| body.contains(&marker))
}

pub fn render_assignment_comment(
    selection: &Selection,
    groups: &[String],
    message_id: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(id) = message_id {
        out.push_str(&comment_marker(id));
        out.push('\n');
    }
    out.push_str("### Review assignment\n\n");

    let groups_line = if groups.is_empty() {
        "none".to_string()
    } else {
        groups
            .iter()
            .map(|g| format!("`{}`", g))
            .collect::<Vec<_>>()
            .join(", ")
    };
    out.push_str(&format!("Changed file groups: {}\n\n", groups_line));

    if selection.picks.is_empty() {
        out.push_str("No rules matched this pull request.\n");
        return out;
    }
    out.push_str("| Rule | Reviewers |\n|---|---|\n");
    for pick in &selection.picks {
        let who = if pick.reviewers.is_empty() {
            "_nobody available_".to_string()
        } else {
            mentions(&pick.reviewers)
        };
        out.push_str(&format!("| {} | {} |\n", pick.source, who));
    }
    if !selection.reviewers.is_empty() {
        out.push_str(&format!("\nRequested: {}\n", mentions(&selection.reviewers)));
    }
    out
}

fn mentions(logins: &[String]) -> String {
    logins
        .iter()
        .map(|l| format!("@{}", l))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{RuleSelection, RuleSource};

    fn selection() -> Selection {
        Selection {
            reviewers: vec!["bob".into(), "carol".into()],
            picks: vec![
                RuleSelection {
                    source: RuleSource::Author {
                        login: "alice".into(),
                        index: 0,
                    },
                    reviewers: vec!["bob".into()],
                },
                RuleSelection {
                    source: RuleSource::Author {
                        login: "alice".into(),
                        index: 1,
                    },
                    reviewers: vec!["carol".into(), "bob".into()],
                },
            ],
        }
    }

    #[test]
    fn test_render_with_marker_and_groups() {
        let body = render_assignment_comment(&selection(), &["backend".into()], Some("assign"));
        assert!(body.starts_with("<!-- reviewgate:assign -->\n"));
        assert!(body.contains("Changed file groups: `backend`"));
        assert!(body.contains("| rule #2 for alice | @carol, @bob |"));
        assert!(body.contains("Requested: @bob, @carol"));
    }

    #[test]
    fn test_render_without_rules_or_marker() {
        let body = render_assignment_comment(&Selection::default(), &[], None);
        assert!(!body.contains("<!--"));
        assert!(body.contains("Changed file groups: none"));
        assert!(body.contains("No rules matched"));
    }

    #[test]
    fn test_find_marked_comment() {
        let comments = vec![
            "LGTM".to_string(),
            format!("{}\nold body", comment_marker("assign")),
            format!("{}\nother", comment_marker("assign-2")),
        ];
        assert_eq!(find_marked_comment(&comments, "assign"), Some(1));
        assert_eq!(find_marked_comment(&comments, "assign-2"), Some(2));
        assert_eq!(find_marked_comment(&comments, "missing"), None);
    }
}
