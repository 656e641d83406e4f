//! Helper utilities for resolving the remote session token from environment
//! variables or configuration.

use std::env;

/// Environment variable checked first for the session token.
pub const ENV_TOKEN: &str = "TAREA_TOKEN";

/// Resolve the token using the standard fallback order (env → configured value).
#[must_use]
pub fn resolve_token(configured: Option<&str>) -> Option<String> {
    let mut fetch = |key: &'static str| env::var(key).ok();
    resolve_token_with(&mut fetch, configured)
}

/// Same as [`resolve_token`] with an injectable environment lookup.
pub fn resolve_token_with(
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
    configured: Option<&str>,
) -> Option<String> {
    env_value_with(&[ENV_TOKEN], fetch).or_else(|| {
        configured
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    })
}

fn env_value_with(
    candidates: &[&'static str],
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
) -> Option<String> {
    candidates.iter().find_map(|key| {
        fetch(key).and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        })
    })
}
