use std::time::Duration;

use crate::page::{NodeId, Page};
use crate::timeline::{TimerTask, Timeline};

/// The `href` of `link` when clicking it should go through the page transition.
///
/// Only same-origin paths qualify. Protocol-relative (`//host/...`) and absolute URLs are
/// other origins, and `target="_blank"` opens a new context; those are left to the browser.
pub fn internal_href(page: &Page, link: NodeId) -> Option<String> {
    let href = page.attr(link, "href")?;
    if !href.starts_with('/') || href.starts_with("//") {
        return None;
    }
    if page.attr(link, "target") == Some("_blank") {
        return None;
    }
    Some(href.to_string())
}

/// Dim the page and follow `href` once `delay` has passed
pub fn begin_transition(page: &mut Page, timeline: &mut Timeline, href: String, delay: Duration) {
    let body = page.body();
    page.set_style(body, "opacity", "0.7");
    page.set_style(body, "transition", "opacity 0.3s ease");
    timeline.schedule(delay, TimerTask::Navigate(href));
}
