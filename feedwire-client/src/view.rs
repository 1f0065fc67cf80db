use feedwire_types::Severity;
use std::time::Duration;

use crate::config::InteractionConfig;
use crate::effects::{Effect, Effects};
use crate::host::{BadgeFeed, Host};
use crate::logging::LogConfig;
use crate::notify::{Notification, Notifier};
use crate::page::{find_all, NodeId, Page, Role};
use crate::timeline::{TimerTask, Timeline};
use crate::{log_debug, log_timer};

const BADGE_PULSE: Duration = Duration::from_secs(2);

/// Everything that lives exactly as long as the page: the element tree, its clock, the
/// notification stack and the presentational state around them.
pub struct View {
    pub(crate) page: Page,
    pub(crate) timeline: Timeline,
    pub(crate) notifier: Notifier,
    pub(crate) config: InteractionConfig,
    pub(crate) log_config: LogConfig,
    badges: Box<dyn BadgeFeed>,
    open_menu: Option<NodeId>,
}

impl View {
    pub fn new(
        page: Page,
        config: InteractionConfig,
        log_config: LogConfig,
        badges: Box<dyn BadgeFeed>,
    ) -> Self {
        let notifier = Notifier::new(
            config.notification_ttl(),
            config.notification_fade(),
            log_config.clone(),
        );
        Self {
            page,
            timeline: Timeline::new(),
            notifier,
            config,
            log_config,
            badges,
            open_menu: None,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    pub fn effects(&mut self) -> Effects<'_> {
        Effects::new(&mut self.page, &mut self.timeline)
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> NodeId {
        self.notifier
            .show(&mut self.page, &mut self.timeline, message, severity)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.active().cloned().collect()
    }

    /// Move the clock forward by `by`, running every timer task that falls due
    pub fn advance(&mut self, by: Duration, host: &dyn Host) {
        let until = self.timeline.now() + by;
        while let Some(task) = self.timeline.pop_due(until) {
            log_timer!(self.log_config, "t={:?} {:?}", self.timeline.now(), task);
            self.run_task(task, host);
        }
        self.timeline.settle_at(until);
    }

    fn run_task(&mut self, task: TimerTask, host: &dyn Host) {
        match task {
            TimerTask::ClearAnimation(node) => self.page.clear_style(node, "animation"),
            TimerTask::FadeNotification(node) => {
                if self.page.is_attached(node) {
                    self.notifier.fade(&mut self.page, &mut self.timeline, node);
                } else {
                    self.notifier.prune(&self.page);
                }
            }
            TimerTask::RemoveNotification(node) => self.notifier.remove(&mut self.page, node),
            TimerTask::FadeFlashContainer(node) => {
                self.page.set_style(node, "transition", "opacity 0.5s");
                self.page.set_style(node, "opacity", "0");
                self.timeline
                    .schedule(self.config.notification_fade(), TimerTask::RemoveNode(node));
            }
            TimerTask::RemoveNode(node) => {
                self.page.detach(node);
                self.notifier.prune(&self.page);
            }
            TimerTask::Navigate(href) => {
                log_debug!(self.log_config, "navigating to {}", href);
                host.navigate(&href);
            }
            TimerTask::SeedBadges => self.seed_badges(),
        }
    }

    /// Fill every navigation badge with a count and keep it pulsing
    pub fn seed_badges(&mut self) {
        for (i, badge) in find_all(&self.page, Role::NavBadge).into_iter().enumerate() {
            let count = self.badges.count_for(i);
            self.page.set_text(badge, count.to_string());
            self.effects().play_forever(badge, Effect::Pulse, BADGE_PULSE);
        }
    }

    /// Open `menu`, or close it if it is the one already open. At most one menu is open.
    pub fn toggle_options_menu(&mut self, menu: NodeId) -> bool {
        if let Some(open) = self.open_menu.take() {
            if open != menu {
                self.page.remove_class(open, "open");
            }
        }
        let opened = self.page.toggle_class(menu, "open");
        self.open_menu = opened.then_some(menu);
        opened
    }
}
