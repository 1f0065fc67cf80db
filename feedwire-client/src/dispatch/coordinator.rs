use feedwire_types::{PostId, Severity, UserId};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use super::intent::{Intent, IntentClass, Target};
use super::render;
use crate::api::{ActionRequest, ActionResponse, ApiError, ApiResult};
use crate::page::{closest, find_within, Content, NodeId, Page, Role};
use crate::view::View;
use crate::log_reconcile;

pub const GENERIC_ERROR: &str = "An error occurred";
pub const GENERIC_COMMENT_ERROR: &str = "An error occurred while posting comment";

/// Identity of an in-flight slot: one per intent class and target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightKey {
    pub class: IntentClass,
    pub target_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
}

/// Monotonic id of a started request, used to recognize stale completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone)]
pub struct InFlight {
    pub intent: Intent,
    pub started_at: Duration,
    pub previous: Vec<PendingMark>,
    pub token: RequestToken,
}

/// Handed out by [`Coordinator::begin`]; the request to send and the slot to settle
#[derive(Debug, Clone)]
pub struct Ticket {
    pub key: FlightKey,
    pub token: RequestToken,
    pub request: ActionRequest,
}

/// Why an intent did not start a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Comment text is empty")]
    EmptyComment,

    #[error("A request for this target is already pending")]
    AlreadyPending,

    #[error("Intent does not go to the server")]
    NotRemote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    RolledBack { message: String },
    /// No matching record: the slot was already released
    Stale,
}

/// Last confirmed like state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: u64,
}

/// Last confirmed follow state of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowState {
    pub following: bool,
}

/// Owns every in-flight record and the confirmed state of the entities acted on.
///
/// The page is a projection of this state: toggles change only after a response has been
/// parsed, and the pending marks put on a control are cleared before the outcome is
/// rendered.
#[derive(Debug, Default)]
pub struct Coordinator {
    next_token: u64,
    in_flight: HashMap<FlightKey, InFlight>,
    likes: HashMap<String, LikeState>,
    follows: HashMap<String, FollowState>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the intent's slot from idle to pending and mark the page accordingly
    pub fn begin(&mut self, view: &mut View, intent: &Intent) -> Result<Ticket, Rejection> {
        let (class, target) = match (intent.class(), intent.target()) {
            (Some(class), Some(target)) => (class, target),
            _ => return Err(Rejection::NotRemote),
        };

        if let Intent::SubmitComment { text, .. } = intent {
            if text.is_empty() {
                return Err(Rejection::EmptyComment);
            }
        }

        let key = FlightKey {
            class,
            target_id: target.id.clone(),
        };
        if self.in_flight.contains_key(&key) {
            log_reconcile!(view.log_config, "rejected {:?}: already pending", key);
            return Err(Rejection::AlreadyPending);
        }

        let request = match intent {
            Intent::Like(t) | Intent::Unlike(t) => {
                self.seed_like(&view.page, t);
                ActionRequest::Like {
                    post_id: PostId::from(t.id.as_str()),
                }
            }
            Intent::SubmitComment { target, text } => ActionRequest::Comment {
                post_id: PostId::from(target.id.as_str()),
                text: text.clone(),
            },
            Intent::Follow(t) | Intent::Unfollow(t) => {
                self.follows
                    .entry(t.id.clone())
                    .or_insert_with(|| FollowState {
                        following: view.page.has_class(t.node, "following"),
                    });
                ActionRequest::Follow {
                    user_id: UserId::from(t.id.as_str()),
                }
            }
            _ => return Err(Rejection::NotRemote),
        };

        let previous = mark_pending(&mut view.page, class, target);

        self.next_token += 1;
        let token = RequestToken(self.next_token);
        log_reconcile!(
            view.log_config,
            "pending {:?} token={} at {:?}",
            key,
            token.0,
            view.now()
        );
        self.in_flight.insert(
            key.clone(),
            InFlight {
                intent: intent.clone(),
                started_at: view.now(),
                previous,
                token,
            },
        );

        Ok(Ticket {
            key,
            token,
            request,
        })
    }

    /// Leave the pending phase with the gateway's result: render it or roll back
    pub fn settle(
        &mut self,
        view: &mut View,
        ticket: &Ticket,
        result: ApiResult<ActionResponse>,
    ) -> Settlement {
        let record = match self.take(&ticket.key, ticket.token) {
            Some(record) => record,
            None => {
                log_reconcile!(view.log_config, "stale completion for {:?}", ticket.key);
                return Settlement::Stale;
            }
        };

        for mark in &record.previous {
            mark.clear(&mut view.page);
        }

        let elapsed = view.now().saturating_sub(record.started_at);
        let result = result.and_then(|response| self.apply(view, &record.intent, response));
        match result {
            Ok(()) => {
                log_reconcile!(view.log_config, "applied {:?} after {:?}", ticket.key, elapsed);
                Settlement::Applied
            }
            Err(e) => {
                let message = e
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| generic_message(ticket.key.class).to_string());
                log_reconcile!(view.log_config, "rolled back {:?}: {}", ticket.key, e);
                view.notify(message.clone(), Severity::Error);
                Settlement::RolledBack { message }
            }
        }
    }

    /// Release a slot whose request never completed, reverting its pending marks
    pub fn abandon(&mut self, view: &mut View, key: &FlightKey, token: RequestToken) {
        if let Some(record) = self.take(key, token) {
            for mark in &record.previous {
                mark.clear(&mut view.page);
            }
            log_reconcile!(view.log_config, "abandoned {:?}", key);
        }
    }

    pub fn phase(&self, class: IntentClass, target_id: &str) -> Phase {
        let key = FlightKey {
            class,
            target_id: target_id.to_string(),
        };
        if self.in_flight.contains_key(&key) {
            Phase::Pending
        } else {
            Phase::Idle
        }
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn in_flight(&self, key: &FlightKey) -> Option<&InFlight> {
        self.in_flight.get(key)
    }

    pub fn like_state(&self, post_id: &str) -> Option<LikeState> {
        self.likes.get(post_id).copied()
    }

    pub fn follow_state(&self, user_id: &str) -> Option<FollowState> {
        self.follows.get(user_id).copied()
    }

    fn take(&mut self, key: &FlightKey, token: RequestToken) -> Option<InFlight> {
        if self.in_flight.get(key).is_some_and(|r| r.token == token) {
            self.in_flight.remove(key)
        } else {
            None
        }
    }

    fn seed_like(&mut self, page: &Page, target: &Target) {
        self.likes.entry(target.id.clone()).or_insert_with(|| LikeState {
            liked: page.has_class(target.node, "liked"),
            count: like_count_node(page, target.node)
                .map(|n| parse_count(&page.text(n)))
                .unwrap_or(0),
        });
    }

    fn apply(
        &mut self,
        view: &mut View,
        intent: &Intent,
        response: ActionResponse,
    ) -> ApiResult<()> {
        match (intent, response) {
            (Intent::Like(t) | Intent::Unlike(t), ActionResponse::Like { liked }) => {
                let cached = self.likes.get(&t.id).copied().unwrap_or(LikeState {
                    liked: !liked,
                    count: 0,
                });
                let state = if cached.liked == liked {
                    cached
                } else if liked {
                    LikeState {
                        liked,
                        count: cached.count.saturating_add(1),
                    }
                } else {
                    LikeState {
                        liked,
                        count: cached.count.saturating_sub(1),
                    }
                };
                self.likes.insert(t.id.clone(), state);
                let count = like_count_node(&view.page, t.node);
                render::render_like(view, t.node, count, state);
                Ok(())
            }
            (Intent::Follow(t) | Intent::Unfollow(t), ActionResponse::Follow { following }) => {
                let state = FollowState { following };
                self.follows.insert(t.id.clone(), state);
                render::render_follow(view, t.node, state);
                Ok(())
            }
            (Intent::SubmitComment { target, .. }, ActionResponse::Comment(comment)) => {
                let page = &view.page;
                let list = closest(page, target.node, Role::PostCard)
                    .and_then(|card| find_within(page, card, Role::CommentList))
                    .or_else(|| find_within(page, target.node, Role::CommentList));
                let input = find_within(page, target.node, Role::CommentInput);
                render::render_comment(view, list, input, &comment);
                Ok(())
            }
            (intent, response) => Err(ApiError::Malformed(format!(
                "{:?} answered with {:?}",
                intent.kind(),
                response
            ))),
        }
    }
}

/// What marking a control as pending changed, and nothing else. Other writes to the
/// control while the request is out (animations, hover) survive clearing the mark.
#[derive(Debug, Clone)]
pub struct PendingMark {
    control: NodeId,
    was_disabled: bool,
    had_pending_class: bool,
    label: Option<Content>,
}

impl PendingMark {
    pub fn control(&self) -> NodeId {
        self.control
    }

    fn clear(&self, page: &mut Page) {
        if !self.had_pending_class {
            page.remove_class(self.control, "pending");
        }
        page.set_disabled(self.control, self.was_disabled);
        if let Some(label) = &self.label {
            page.put_content(self.control, label);
        }
    }
}

/// Disable the affordance and show it as busy
fn mark_pending(page: &mut Page, class: IntentClass, target: &Target) -> Vec<PendingMark> {
    let control = match class {
        IntentClass::Comment => find_within(page, target.node, Role::CommentSubmit),
        IntentClass::Like | IntentClass::Follow => Some(target.node),
    };
    let Some(control) = control else {
        return Vec::new();
    };

    let mut mark = PendingMark {
        control,
        was_disabled: page.is_disabled(control),
        had_pending_class: page.has_class(control, "pending"),
        label: None,
    };
    page.add_class(control, "pending");
    page.set_disabled(control, true);
    if class != IntentClass::Like {
        let loading = page.create("div");
        page.add_class(loading, "loading");
        mark.label = Some(page.swap_content(control, loading));
    }
    vec![mark]
}

fn like_count_node(page: &Page, trigger: NodeId) -> Option<NodeId> {
    closest(page, trigger, Role::PostCard)
        .and_then(|card| find_within(page, card, Role::LikeCount))
        .or_else(|| find_within(page, trigger, Role::LikeCount))
}

fn generic_message(class: IntentClass) -> &'static str {
    match class {
        IntentClass::Comment => GENERIC_COMMENT_ERROR,
        IntentClass::Like | IntentClass::Follow => GENERIC_ERROR,
    }
}

/// Leading integer of a rendered count such as `"12 likes"`; 0 when there is none
pub fn parse_count(text: &str) -> u64 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
