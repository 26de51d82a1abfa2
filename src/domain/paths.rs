//! Path arithmetic for purge targets.
//!
//! Purge paths come from two shapes of source: repository node paths (which
//! carry a `/jcr:content/...` tail below the owning page) and catalog entity
//! URLs (which carry a trailing page suffix). Both are normalized here so
//! the reducer compares like with like.

/// Suffix appended to page paths when rendered (and the truncation marker
/// for catalog entity URLs).
pub const PAGE_SUFFIX: &str = ".html";

const CONTENT_NODE_MARKER: &str = "/jcr:content";

/// Normalize a purge candidate: collapse duplicate separators, drop any
/// trailing separator, and strip a trailing page suffix so suffix variants
/// of one path cannot coexist in a result set.
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut last_was_sep = false;
    for ch in path.trim().chars() {
        if ch == '/' {
            if !last_was_sep {
                normalized.push(ch);
            }
            last_was_sep = true;
        } else {
            normalized.push(ch);
            last_was_sep = false;
        }
    }
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    if let Some(stripped) = normalized.strip_suffix(PAGE_SUFFIX) {
        return stripped.to_string();
    }
    normalized
}

/// Number of segments in a path; `/a/b` and `/a/b/` both count 2.
pub fn segment_count(path: &str) -> usize {
    path.split('/').filter(|segment| !segment.is_empty()).count()
}

/// True when `candidate` is a strict descendant of `ancestor`.
///
/// Equality is not descent; prefix matching requires a separator boundary so
/// `/a/bc` never counts as a descendant of `/a/b`.
pub fn is_descendant_of(candidate: &str, ancestor: &str) -> bool {
    if candidate == ancestor {
        return false;
    }
    let ancestor = ancestor.trim_end_matches('/');
    candidate
        .strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Map a matching content-node path to the purge path of its owning page:
/// everything below `/jcr:content` is stripped and the page suffix appended.
///
/// Node paths without a content-node tail are taken to be page paths
/// already.
pub fn page_path_for_node(node_path: &str) -> String {
    let page = match node_path.find(CONTENT_NODE_MARKER) {
        Some(index) => &node_path[..index],
        None => node_path.trim_end_matches('/'),
    };
    format!("{page}{PAGE_SUFFIX}")
}

/// Keep the prefix of a catalog-entity URL up to (and excluding) a trailing
/// page suffix: `/p/q.html` becomes `/p/q`. URLs without the suffix pass
/// through unchanged.
pub fn truncate_at_suffix(url: &str) -> &str {
    url.strip_suffix(PAGE_SUFFIX).unwrap_or(url)
}

/// Join a storefront page path and a catalog entity URL into the purge path
/// shape the dispatcher caches under: `<page>.html/<entity-url>`.
pub fn entity_purge_path(page_path: &str, entity_url: &str) -> String {
    let entity = truncate_at_suffix(entity_url.trim_start_matches('/'));
    format!(
        "{}{PAGE_SUFFIX}/{entity}",
        page_path.trim_end_matches('/')
    )
}
