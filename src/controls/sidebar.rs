use crate::error::Result;
use crate::events::{EventState, Handler, Listener};
use crate::page::Page;

pub(crate) fn rebind_sidebar_links(page: &mut Page) -> Result<usize> {
    let links = page.select_all(&page.conventions.sidebar_link_selector)?;
    for link in &links {
        // A clone carries no listeners anywhere in its subtree.
        let descendants = page.dom.query_selector_all_from(*link, "*")?;
        let mut dropped = descendants
            .into_iter()
            .map(|node| page.listeners.clear_node(node))
            .sum::<usize>();
        dropped += page.listeners.take_ownership(
            *link,
            "click",
            Listener {
                capture: false,
                handler: Handler::LogNavigation,
            },
        );
        if dropped > 0 {
            let label = page.trace_node_label(*link);
            page.trace_line(format!("[sidebar] rebound {label} dropped={dropped}"));
        }
    }
    page.console_log(format!("Sidebar links fixed: {}", links.len()));
    Ok(links.len())
}

pub(crate) fn log_navigation(page: &mut Page, event: &mut EventState) -> Result<()> {
    let link = event.current_target;
    let destination = if page.is_tag(link, "a") || page.is_tag(link, "area") {
        page.dom
            .attr(link, "href")
            .map(|href| resolve_href(&page.document_url, &href))
            .unwrap_or_default()
    } else {
        "undefined".to_string()
    };
    page.console_log(format!("Navigating to: {destination}"));
    Ok(())
}

/// Resolves `href` against `base` the way an anchor's `href` property reads back.
///
/// Handles absolute, protocol-relative, root-relative, query-only, fragment-only
/// and path-relative references. When `base` has no `scheme://authority` part the
/// reference is returned as written.
pub fn resolve_href(base: &str, href: &str) -> String {
    let href = href.trim();
    if has_scheme(href) {
        return href.to_string();
    }
    let Some(parts) = BaseUrl::parse(base) else {
        return href.to_string();
    };

    if let Some(rest) = href.strip_prefix("//") {
        return format!("{}://{rest}", parts.scheme);
    }
    if href.is_empty() {
        return parts.without_fragment();
    }
    if href.starts_with('#') {
        return format!("{}{href}", parts.without_fragment());
    }
    if href.starts_with('?') {
        return format!("{}://{}{}{href}", parts.scheme, parts.authority, parts.path);
    }

    let (path, suffix) = match href.find(['?', '#']) {
        Some(idx) => href.split_at(idx),
        None => (href, ""),
    };
    let merged = if path.starts_with('/') {
        path.to_string()
    } else {
        let dir = match parts.path.rfind('/') {
            Some(idx) => &parts.path[..=idx],
            None => "/",
        };
        format!("{dir}{path}")
    };
    format!(
        "{}://{}{}{suffix}",
        parts.scheme,
        parts.authority,
        remove_dot_segments(&merged)
    )
}

struct BaseUrl<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: String,
    query: &'a str,
}

impl<'a> BaseUrl<'a> {
    fn parse(base: &'a str) -> Option<Self> {
        let (scheme, rest) = base.split_once("://")?;
        if !is_scheme(scheme) {
            return None;
        }
        let rest = rest.split('#').next().unwrap_or_default();
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let (path, query) = match tail.find('?') {
            Some(idx) => tail.split_at(idx),
            None => (tail, ""),
        };
        let path = if path.is_empty() { "/".to_string() } else { path.to_string() };
        Some(Self {
            scheme,
            authority,
            path,
            query,
        })
    }

    fn without_fragment(&self) -> String {
        format!("{}://{}{}{}", self.scheme, self.authority, self.path, self.query)
    }
}

fn has_scheme(href: &str) -> bool {
    href.split_once(':')
        .is_some_and(|(scheme, _)| is_scheme(scheme))
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let segments: Vec<&str> = path.split('/').skip(1).collect();
    let last = segments.len().saturating_sub(1);
    for (idx, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if idx == last {
                    output.push("");
                }
            }
            ".." => {
                output.pop();
                if idx == last {
                    output.push("");
                }
            }
            other => output.push(other),
        }
    }
    format!("/{}", output.join("/"))
}
