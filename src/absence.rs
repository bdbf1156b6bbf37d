//! Absentee resolution through the `sageUsers` roster mapping.

use crate::models::policy::SageUser;
use std::collections::BTreeMap;

/// Map the e-mails of people out today to policy logins.
///
/// A login is absent when any of its roster e-mails is listed; comparison
/// ignores case and surrounding whitespace.
pub fn absent_logins(
    sage_users: Option<&BTreeMap<String, Vec<SageUser>>>,
    out_today: &[String],
) -> Vec<String> {
    let Some(users) = sage_users else {
        return Vec::new();
    };
    let out: Vec<String> = out_today.iter().map(|e| e.trim().to_lowercase()).collect();
    users
        .iter()
        .filter(|(_, entries)| {
            entries
                .iter()
                .any(|u| out.contains(&u.email.trim().to_lowercase()))
        })
        .map(|(login, _)| login.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> BTreeMap<String, Vec<SageUser>> {
        ["duck", "dog", "cow"]
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    vec![SageUser {
                        email: format!("{}@example.com", name),
                    }],
                )
            })
            .collect()
    }

    #[test]
    fn test_maps_listed_emails_to_logins() {
        let users = roster();
        let out = vec!["dragon@example.com".to_string(), " Dog@Example.com".to_string()];
        assert_eq!(absent_logins(Some(&users), &out), vec!["dog"]);
    }

    #[test]
    fn test_no_match_or_no_roster_is_empty() {
        let users = roster();
        let out = vec!["human@example.com".to_string()];
        assert!(absent_logins(Some(&users), &out).is_empty());
        assert!(absent_logins(None, &out).is_empty());
    }
}
