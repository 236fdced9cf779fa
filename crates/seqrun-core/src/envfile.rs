//! Flat `KEY=VALUE` env file parsing on top of `dotenvy`.
//!
//! Pairs are returned in file order and never written into the current
//! process environment.

use crate::error::{Result, RunError};
use std::path::Path;

/// Parses the env file at `path`.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        if e.not_found() {
            RunError::config(path, "file not found")
        } else {
            RunError::config(path, e.to_string())
        }
    })?;

    let mut pairs = Vec::new();
    for item in iter {
        let pair = item.map_err(|e| RunError::config(path, e.to_string()))?;
        pairs.push(pair);
    }

    tracing::debug!(path = %path.display(), keys = pairs.len(), "parsed env file");
    Ok(pairs)
}

/// Parses env file text. `origin` is only used in error messages.
pub fn parse_env_str(content: &str, origin: &Path) -> Result<Vec<(String, String)>> {
    dotenvy::from_read_iter(content.as_bytes())
        .map(|item| item.map_err(|e| RunError::config(origin, e.to_string())))
        .collect()
}

/// Last value for `key`, matching the "later assignment wins" rule of a
/// sourced shell file.
pub fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
