//! Event delegation for the feed page.
//!
//! One [`Dispatcher`] receives every event of the page. Each event is classified into an
//! intent; remote intents go through the [`Coordinator`] and the gateway, local ones are
//! handled on the spot. The page state sits in a `RefCell` that is never borrowed across
//! the gateway call, so other events keep being handled while a request is in flight.

mod coordinator;
mod event;
mod intent;
mod render;


pub use coordinator::{
    parse_count, Coordinator, FlightKey, FollowState, InFlight, LikeState, PendingMark, Phase,
    Rejection, RequestToken, Settlement, Ticket, GENERIC_COMMENT_ERROR, GENERIC_ERROR,
};
pub use event::{EventKind, UiEvent};
pub use intent::{classify, Intent, IntentClass, IntentKind, Target};
pub use render::comment_element;

use feedwire_types::Severity;
use std::cell::RefCell;
use std::time::Duration;

use crate::api::ActionGateway;
use crate::host::{Host, ShareData};
use crate::navigation::begin_transition;
use crate::notify::Notification;
use crate::page::{closest, find_within, NodeId, Page, Role};
use crate::view::View;
use crate::{log_dispatch, log_request};

const SHARE_TITLE: &str = "Check out this post on InstaClone";
const SHARE_TEXT: &str = "I found this interesting post on InstaClone";

/// What became of one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No intent matched
    Ignored,
    /// Handled locally, or a remote completion that arrived for an already released slot
    Handled,
    Rejected(Rejection),
    Applied,
    RolledBack { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub intent: Option<IntentKind>,
    /// Whether the browser's default action for the event must be suppressed
    pub default_prevented: bool,
    pub outcome: Outcome,
}

impl Dispatch {
    fn ignored() -> Self {
        Self {
            intent: None,
            default_prevented: false,
            outcome: Outcome::Ignored,
        }
    }
}

struct Session {
    view: View,
    coordinator: Coordinator,
}

pub struct Dispatcher<G, H> {
    session: RefCell<Session>,
    gateway: G,
    host: H,
}

impl<G: ActionGateway, H: Host> Dispatcher<G, H> {
    pub fn new(view: View, gateway: G, host: H) -> Self {
        Self {
            session: RefCell::new(Session {
                view,
                coordinator: Coordinator::new(),
            }),
            gateway,
            host,
        }
    }

    /// Handle one page event to completion
    pub async fn dispatch(&self, event: UiEvent) -> Dispatch {
        if event.kind.is_hover() {
            return self.hover(event);
        }

        let intent = {
            let session = self.session.borrow();
            let intent = classify(&session.view.page, &event);
            log_dispatch!(session.view.log_config, "{:?} -> {:?}", event, intent);
            intent
        };
        let Some(intent) = intent else {
            return Dispatch::ignored();
        };

        let kind = intent.kind();
        let outcome = if intent.class().is_some() {
            self.run_remote(intent).await
        } else {
            self.run_local(intent)
        };

        Dispatch {
            intent: Some(kind),
            default_prevented: kind.prevents_default(),
            outcome,
        }
    }

    async fn run_remote(&self, intent: Intent) -> Outcome {
        let (ticket, log_config) = {
            let mut session = self.session.borrow_mut();
            let Session { view, coordinator } = &mut *session;
            match coordinator.begin(view, &intent) {
                Ok(ticket) => (ticket, view.log_config.clone()),
                Err(rejection) => {
                    log_dispatch!(view.log_config, "{:?} rejected: {}", intent.kind(), rejection);
                    return Outcome::Rejected(rejection);
                }
            }
        };

        let guard = FlightGuard {
            session: &self.session,
            key: ticket.key.clone(),
            token: ticket.token,
            armed: true,
        };
        log_request!(log_config, "POST {}", ticket.request.path());
        let result = self.gateway.perform(&ticket.request).await;
        log_request!(log_config, "POST {} -> {:?}", ticket.request.path(), result);
        guard.disarm();

        let mut session = self.session.borrow_mut();
        let Session { view, coordinator } = &mut *session;
        match coordinator.settle(view, &ticket, result) {
            Settlement::Applied => Outcome::Applied,
            Settlement::RolledBack { message } => Outcome::RolledBack { message },
            Settlement::Stale => Outcome::Handled,
        }
    }

    fn run_local(&self, intent: Intent) -> Outcome {
        let mut session = self.session.borrow_mut();
        let Session { view, coordinator } = &mut *session;

        match intent {
            Intent::DraftCommentChanged { target, has_text } => {
                if coordinator.phase(IntentClass::Comment, &target.id) == Phase::Pending {
                    return Outcome::Handled;
                }
                if let Some(submit) = find_within(&view.page, target.node, Role::CommentSubmit) {
                    view.page.set_disabled(submit, !has_text);
                }
                Outcome::Handled
            }
            Intent::ShowPostOptions(target) => {
                let page = &view.page;
                let menu = closest(page, target.node, Role::PostCard)
                    .and_then(|card| find_within(page, card, Role::OptionsMenu))
                    .or_else(|| find_within(page, target.node, Role::OptionsMenu));
                match menu {
                    Some(menu) => {
                        let open = view.toggle_options_menu(menu);
                        log_dispatch!(view.log_config, "options for post {} open={}", target.id, open);
                        Outcome::Handled
                    }
                    None => {
                        log_dispatch!(view.log_config, "no options menu for post {}", target.id);
                        Outcome::Ignored
                    }
                }
            }
            Intent::SharePost(target) => {
                let url = format!("{}/post/{}", self.host.origin(), target.id);
                if self.host.can_share() {
                    let data = ShareData {
                        title: SHARE_TITLE.to_string(),
                        text: SHARE_TEXT.to_string(),
                        url,
                    };
                    if let Err(e) = self.host.share(&data) {
                        log_dispatch!(view.log_config, "share dismissed: {}", e);
                    }
                } else {
                    match self.host.write_clipboard(&url) {
                        Ok(()) => {
                            view.notify("Post link copied to clipboard!", Severity::Success);
                        }
                        Err(e) => log::warn!(target: "dispatch", "Failed to copy {}: {}", url, e),
                    }
                }
                Outcome::Handled
            }
            Intent::Navigate { href, .. } => {
                let delay = view.config.navigation_delay();
                begin_transition(&mut view.page, &mut view.timeline, href, delay);
                Outcome::Handled
            }
            other => {
                log_dispatch!(view.log_config, "{:?} has no local handler", other.kind());
                Outcome::Ignored
            }
        }
    }

    fn hover(&self, event: UiEvent) -> Dispatch {
        let mut session = self.session.borrow_mut();
        let view = &mut session.view;
        let Some(control) = closest(&view.page, event.target, Role::Hoverable) else {
            return Dispatch::ignored();
        };
        if event.kind == EventKind::MouseEnter {
            view.effects().lift(control);
        } else {
            view.effects().settle(control);
        }
        Dispatch {
            intent: None,
            default_prevented: false,
            outcome: Outcome::Handled,
        }
    }

    /// Advance the page clock, running due timer tasks
    pub fn advance(&self, by: Duration) {
        self.session.borrow_mut().view.advance(by, &self.host);
    }

    pub fn now(&self) -> Duration {
        self.session.borrow().view.now()
    }

    pub fn with_page<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        f(&self.session.borrow().view.page)
    }

    pub fn with_page_mut<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        f(&mut self.session.borrow_mut().view.page)
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.with_page(|page| page.find_by_id(id))
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.session.borrow().view.notifications()
    }

    pub fn phase(&self, class: IntentClass, target_id: &str) -> Phase {
        self.session.borrow().coordinator.phase(class, target_id)
    }

    /// Number of requests currently in flight
    pub fn pending(&self) -> usize {
        self.session.borrow().coordinator.pending_count()
    }

    pub fn like_state(&self, post_id: &str) -> Option<LikeState> {
        self.session.borrow().coordinator.like_state(post_id)
    }

    pub fn follow_state(&self, user_id: &str) -> Option<FollowState> {
        self.session.borrow().coordinator.follow_state(user_id)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

/// Releases an in-flight slot if the request future is dropped before it completes
struct FlightGuard<'a> {
    session: &'a RefCell<Session>,
    key: FlightKey,
    token: RequestToken,
    armed: bool,
}

impl FlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut session) = self.session.try_borrow_mut() {
            let Session { view, coordinator } = &mut *session;
            coordinator.abandon(view, &self.key, self.token);
        }
    }
}
