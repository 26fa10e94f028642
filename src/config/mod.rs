// src/config/mod.rs
pub mod ai;
pub mod app;

use std::path::Path;

/// Load `.env.default` and then `.env` (overriding) from `root`.
/// Missing files are fine; returns how many of the two were read.
pub fn load_env_files<P: AsRef<Path>>(root: P) -> usize {
    let root = root.as_ref();
    let mut loaded = 0;
    if dotenvy::from_path(root.join(".env.default")).is_ok() {
        loaded += 1;
    }
    if dotenvy::from_path_override(root.join(".env")).is_ok() {
        loaded += 1;
    }
    loaded
}

/// Resolve an `"ENV"` placeholder against `var`; anything else is returned as is.
pub(crate) fn resolve_env_placeholder(value: &str, var: &str) -> Option<String> {
    if value.trim().eq_ignore_ascii_case("env") {
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    } else {
        Some(value.to_string())
    }
}
