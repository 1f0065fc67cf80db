use chrono::{DateTime, Utc};
use feedwire_types::Severity;
use std::time::Duration;

use crate::effects::{Effect, Effects};
use crate::logging::LogConfig;
use crate::log_notification;
use crate::page::{find_all, NodeId, Page, Role};
use crate::timeline::{TimerTask, Timeline};

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Stack of self-expiring flash messages.
///
/// The `.flash-messages` container is created on first use and reused for the lifetime of
/// the page. If something removed it in the meantime (the startup auto-hide does), a new
/// one is created.
pub struct Notifier {
    container: Option<NodeId>,
    active: Vec<(NodeId, Notification)>,
    ttl: Duration,
    fade: Duration,
    log_config: LogConfig,
}

impl Notifier {
    pub fn new(ttl: Duration, fade: Duration, log_config: LogConfig) -> Self {
        Self {
            container: None,
            active: Vec::new(),
            ttl,
            fade,
            log_config,
        }
    }

    /// Append a notification and schedule its expiry
    pub fn show(
        &mut self,
        page: &mut Page,
        timeline: &mut Timeline,
        message: impl Into<String>,
        severity: Severity,
    ) -> NodeId {
        let message = message.into();
        let container = self.container(page);

        let node = page.create("div");
        page.add_class(node, "flash");
        page.add_class(node, severity.as_str());
        page.set_text(node, message.clone());
        page.append(container, node);

        log_notification!(self.log_config, "show {}: {}", severity.as_str(), message);

        self.active.push((
            node,
            Notification {
                message,
                severity,
                created_at: Utc::now(),
            },
        ));
        timeline.schedule(self.ttl, TimerTask::FadeNotification(node));
        node
    }

    /// First expiry phase: start the fade-out and schedule removal
    pub fn fade(&mut self, page: &mut Page, timeline: &mut Timeline, node: NodeId) {
        Effects::new(page, timeline).play_and_hold(node, Effect::FadeOut, self.fade);
        timeline.schedule(self.fade, TimerTask::RemoveNotification(node));
    }

    /// Second expiry phase
    pub fn remove(&mut self, page: &mut Page, node: NodeId) {
        page.detach(node);
        if let Some(i) = self.active.iter().position(|(n, _)| *n == node) {
            let (_, notification) = self.active.remove(i);
            log_notification!(self.log_config, "expired: {}", notification.message);
        }
    }

    /// Notifications currently on screen, oldest first
    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter().map(|(_, n)| n)
    }

    /// Forget notifications whose element is no longer on the page
    pub fn prune(&mut self, page: &Page) {
        self.active.retain(|(node, _)| page.is_attached(*node));
    }

    fn container(&mut self, page: &mut Page) -> NodeId {
        if let Some(container) = self.container {
            if page.is_attached(container) {
                return container;
            }
        }

        let container = match find_all(page, Role::FlashContainer).first() {
            Some(&existing) => existing,
            None => {
                let created = page.create("div");
                page.add_class(created, "flash-messages");
                page.append(page.body(), created);
                created
            }
        };
        self.container = Some(container);
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ElementSpec;

    fn notifier() -> Notifier {
        Notifier::new(
            Duration::from_secs(5),
            Duration::from_millis(500),
            LogConfig::disabled(),
        )
    }

    #[test]
    fn test_container_is_created_once_and_reused() {
        let mut page = Page::new();
        let mut timeline = Timeline::new();
        let mut notifier = notifier();

        let a = notifier.show(&mut page, &mut timeline, "one", Severity::Info);
        let b = notifier.show(&mut page, &mut timeline, "two", Severity::Error);

        let containers = find_all(&page, Role::FlashContainer);
        assert_eq!(containers.len(), 1);
        assert_eq!(page.children(containers[0]), [a, b]);
        assert!(page.has_class(b, "flash"));
        assert!(page.has_class(b, "error"));
        assert_eq!(page.text(b), "two");
    }

    #[test]
    fn test_server_rendered_container_is_reused() {
        let mut page = Page::with_body([ElementSpec::new("div")
            .class("flash-messages")
            .attr("id", "server-flash")]);
        let mut timeline = Timeline::new();
        let mut notifier = notifier();

        let node = notifier.show(&mut page, &mut timeline, "hi", Severity::Success);
        assert_eq!(page.parent(node), page.find_by_id("server-flash"));
    }

    #[test]
    fn test_removed_container_is_recreated() {
        let mut page = Page::new();
        let mut timeline = Timeline::new();
        let mut notifier = notifier();

        let first = notifier.show(&mut page, &mut timeline, "one", Severity::Info);
        let old_container = page.parent(first).unwrap();
        page.detach(old_container);
        notifier.prune(&page);
        assert_eq!(notifier.active().count(), 0);

        let second = notifier.show(&mut page, &mut timeline, "two", Severity::Info);
        assert_ne!(page.parent(second), Some(old_container));
        assert!(page.is_attached(second));
    }

    #[test]
    fn test_expiry_is_fade_then_remove() {
        let mut page = Page::new();
        let mut timeline = Timeline::new();
        let mut notifier = notifier();
        let node = notifier.show(&mut page, &mut timeline, "bye", Severity::Warning);

        assert_eq!(
            timeline.pop_due(Duration::from_secs(10)),
            Some(TimerTask::FadeNotification(node))
        );
        notifier.fade(&mut page, &mut timeline, node);
        assert_eq!(page.style(node, "animation"), Some("fadeOut 0.5s ease-out"));
        assert!(page.is_attached(node));

        assert_eq!(
            timeline.pop_due(Duration::from_secs(10)),
            Some(TimerTask::RemoveNotification(node))
        );
        assert_eq!(timeline.now(), Duration::from_millis(5500));
        notifier.remove(&mut page, node);
        assert!(!page.is_attached(node));
        assert_eq!(notifier.active().count(), 0);
    }
}
