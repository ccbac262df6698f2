//! Active navigation link.
//!
//! A nav link is active when its `href` names the page being viewed. The
//! site root counts as `index.html`.

pub const INDEX_PAGE: &str = "index.html";

/// Last segment of a URL path; `index.html` for the site root or a
/// directory path.
pub fn current_page(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(INDEX_PAGE)
}

pub fn is_active(href: &str, current: &str) -> bool {
    href == current
}

/// The hrefs that should carry the `active` class for `path`.
pub fn active_links<'a>(hrefs: &[&'a str], path: &str) -> Vec<&'a str> {
    let current = current_page(path);
    hrefs
        .iter()
        .copied()
        .filter(|href| is_active(href, current))
        .collect()
}
