//! # Path Identity
//!
//! Include cycle detection compares files by canonical absolute path. This
//! module is the only place that computes one.
//!
//! [`canonicalize_best_effort`] resolves symlinks and `.`/`..` segments when
//! the target exists. When it does not, the longest existing ancestor is
//! canonicalized and the remaining segments are appended after lexical
//! normalization, so a missing file still gets a stable absolute identity
//! that can be reported to the user.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory without touching the
/// filesystem. Returns `path` unchanged if the current directory is unknown.
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Canonicalize `path`, falling back to a normalized absolute path when the
/// target (or part of it) does not exist.
pub fn canonicalize_best_effort(path: &Path) -> PathBuf {
    let absolute = absolute(path);
    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    let normalized = normalize_lexically(&absolute);
    tracing::debug!(path = %normalized.display(), "path does not exist, canonicalizing ancestor");
    let mut existing = normalized.as_path();
    let mut missing: Vec<OsString> = Vec::new();
    loop {
        if let Ok(mut canonical) = std::fs::canonicalize(existing) {
            for segment in missing.iter().rev() {
                canonical.push(segment);
            }
            return canonical;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return normalized,
        }
    }
}

/// Drop `.` segments and fold `..` into the preceding segment.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
