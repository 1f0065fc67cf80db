use crate::api::ActionGateway;
use crate::config::InteractionConfig;
use crate::dispatch::Dispatcher;
use crate::host::{BadgeFeed, Host, RandomBadges};
use crate::log_debug;
use crate::logging::LogConfig;
use crate::page::{find_all, ElementSpec, Page, Role};
use crate::timeline::TimerTask;
use crate::view::View;

const INJECTED_STYLE: &str = "@keyframes fadeOut { from { opacity: 1; transform: translateX(0); } \
to { opacity: 0; transform: translateX(100%); } } \
.flash { transition: all 0.3s ease; }";

/// Builds the page's dispatcher and seeds the decorative state once, at load
pub struct Bootstrap {
    config: InteractionConfig,
    log_config: LogConfig,
    badges: Box<dyn BadgeFeed>,
}

impl Bootstrap {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            log_config: LogConfig::default(),
            badges: Box::new(RandomBadges),
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn with_badge_feed(mut self, badges: impl BadgeFeed + 'static) -> Self {
        self.badges = Box::new(badges);
        self
    }

    pub fn start<G: ActionGateway, H: Host>(self, mut page: Page, gateway: G, host: H) -> Dispatcher<G, H> {
        let cards = find_all(&page, Role::PostCard);
        for (i, &card) in cards.iter().enumerate() {
            let delay = self.config.stagger() * i as u32;
            page.set_style(card, "animation-delay", format!("{}s", delay.as_secs_f64()));
        }

        let head = page.head();
        page.insert(head, &ElementSpec::new("style").text(INJECTED_STYLE));

        let server_flash = find_all(&page, Role::FlashContainer).first().copied();

        let mut view = View::new(page, self.config.clone(), self.log_config.clone(), self.badges);
        view.timeline
            .schedule(self.config.badge_delay(), TimerTask::SeedBadges);
        if let Some(container) = server_flash {
            view.timeline
                .schedule(self.config.flash_autohide(), TimerTask::FadeFlashContainer(container));
        }

        log_debug!(
            self.log_config,
            "bootstrapped page: {} posts, server flash: {}",
            cards.len(),
            server_flash.is_some()
        );
        Dispatcher::new(view, gateway, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ActionRequest, ActionResponse, ApiError, ApiResult};
    use crate::host::{FixedBadges, RecordingHost};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Offline;

    #[async_trait(?Send)]
    impl ActionGateway for Offline {
        async fn perform(&self, _request: &ActionRequest) -> ApiResult<ActionResponse> {
            Err(ApiError::Malformed("offline".to_string()))
        }
    }

    fn page() -> Page {
        Page::with_body([
            ElementSpec::new("nav").child(
                ElementSpec::new("a")
                    .class("nav-link")
                    .attr("href", "/notifications")
                    .child(ElementSpec::new("span").class("badge").attr("id", "badge")),
            ),
            ElementSpec::new("div")
                .class("flash-messages")
                .attr("id", "flash")
                .child(ElementSpec::new("div").class("flash success").text("Welcome back")),
            ElementSpec::new("div").class("post-card").attr("id", "p1"),
            ElementSpec::new("div").class("post-card").attr("id", "p2"),
            ElementSpec::new("div").class("post-card").attr("id", "p3"),
        ])
    }

    fn start() -> Dispatcher<Offline, RecordingHost> {
        Bootstrap::new(InteractionConfig::default())
            .with_log_config(LogConfig::disabled())
            .with_badge_feed(FixedBadges(vec![3]))
            .start(page(), Offline, RecordingHost::new("http://feed.local"))
    }

    #[test]
    fn test_post_cards_are_staggered() {
        let d = start();
        d.with_page(|page| {
            let delays: Vec<_> = ["p1", "p2", "p3"]
                .iter()
                .map(|id| page.style(page.find_by_id(id).unwrap(), "animation-delay").map(str::to_string))
                .collect();
            assert_eq!(
                delays,
                vec![Some("0s".to_string()), Some("0.1s".to_string()), Some("0.2s".to_string())]
            );
        });
    }

    #[test]
    fn test_fade_out_keyframes_are_injected() {
        let d = start();
        d.with_page(|page| {
            let head = page.children(page.head());
            assert_eq!(head.len(), 1);
            assert_eq!(page.tag(head[0]), "style");
            let css = page.text(head[0]);
            assert!(css.contains("@keyframes fadeOut"));
            assert!(css.contains("from { opacity: 1; transform: translateX(0); }"));
            assert!(css.contains("to { opacity: 0; transform: translateX(100%); }"));
            assert!(css.contains(".flash { transition: all 0.3s ease; }"));
        });
    }

    #[test]
    fn test_badges_are_seeded_after_delay() {
        let d = start();
        let badge = d.node_by_id("badge").unwrap();

        d.advance(Duration::from_millis(1999));
        d.with_page(|page| assert_eq!(page.text(badge), ""));

        d.advance(Duration::from_millis(1));
        d.with_page(|page| {
            assert_eq!(page.text(badge), "3");
            assert_eq!(page.style(badge, "animation"), Some("pulse 2s infinite"));
        });
    }

    #[test]
    fn test_server_flash_hides_then_goes_away() {
        let d = start();
        let flash = d.node_by_id("flash").unwrap();

        d.advance(Duration::from_secs(5));
        d.with_page(|page| {
            assert_eq!(page.style(flash, "opacity"), Some("0"));
            assert_eq!(page.style(flash, "transition"), Some("opacity 0.5s"));
            assert!(page.is_attached(flash));
        });

        d.advance(Duration::from_millis(500));
        d.with_page(|page| assert!(!page.is_attached(flash)));
    }
}
