//! Users known to the built-in identity service.
//!
//! `SKAT_USERS` holds comma-separated `token=name[:role[+role]]` entries,
//! e.g. `s3cret=alice:admin,t0ken=bob`.

use std::env;

use tracing::warn;

use crate::services::identity::User;

pub fn users_from_env() -> Vec<(String, User)> {
    env::var("SKAT_USERS")
        .map(|raw| parse_users(&raw))
        .unwrap_or_default()
}

pub fn parse_users(raw: &str) -> Vec<(String, User)> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = parse_entry(entry);
            if parsed.is_none() {
                warn!("ignoring malformed SKAT_USERS entry");
            }
            parsed
        })
        .collect()
}

fn parse_entry(entry: &str) -> Option<(String, User)> {
    let (token, rest) = entry.split_once('=')?;
    let (name, roles): (&str, Vec<&str>) = match rest.split_once(':') {
        Some((name, roles)) => (name, roles.split('+').map(str::trim).collect()),
        None => (rest, Vec::new()),
    };
    let token = token.trim();
    let name = name.trim();
    if token.is_empty() || name.is_empty() {
        return None;
    }
    let roles = roles
        .into_iter()
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    Some((
        token.to_string(),
        User {
            name: name.to_string(),
            roles,
        },
    ))
}
