//! Path reduction.
//!
//! Flushing an ancestor path already invalidates its descendants at the
//! dispatcher, so a descendant purge after its ancestor is redundant
//! network I/O. The reducer collapses the merged path set to the minimal
//! covering set; when the store's base path itself was resolved, no finer
//! granularity is achievable and the whole reduction short-circuits.

use std::collections::HashSet;

use crate::domain::paths;

/// Collapse a resolved path set to its minimal covering set.
///
/// Candidates are sorted shallowest-first (ties lexicographic, so the
/// result is deterministic) and admitted only if no already-admitted path
/// is a strict ancestor. Quadratic, but n is tens of paths per change.
pub fn reduce(resolved: &HashSet<String>, base_path: &str) -> Vec<String> {
    let base = paths::normalize(base_path);
    if resolved.iter().any(|path| paths::normalize(path) == base) {
        return vec![base];
    }

    let mut candidates: Vec<String> = resolved.iter().map(|path| paths::normalize(path)).collect();
    candidates.sort_by(|a, b| {
        paths::segment_count(a)
            .cmp(&paths::segment_count(b))
            .then_with(|| a.cmp(b))
    });
    candidates.dedup();

    let mut admitted: Vec<String> = Vec::new();
    for candidate in candidates {
        if admitted
            .iter()
            .any(|kept| paths::is_descendant_of(&candidate, kept))
        {
            continue;
        }
        admitted.push(candidate);
    }
    admitted
}
