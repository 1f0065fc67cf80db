use feedwire_types::EntityKind;

use super::event::{EventKind, UiEvent};
use crate::navigation::internal_href;
use crate::page::{closest, find_within, NodeId, Page, Role};

/// The entity a gesture applies to, discovered from the page on every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: EntityKind,
    pub id: String,
    /// Element the gesture came through; the coordinator never outlives the page
    pub node: NodeId,
}

impl Target {
    fn new(kind: EntityKind, id: &str, node: NodeId) -> Self {
        Self {
            kind,
            id: id.to_string(),
            node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Like(Target),
    Unlike(Target),
    /// `text` is already trimmed and may be empty; validation rejects it later
    SubmitComment { target: Target, text: String },
    DraftCommentChanged { target: Target, has_text: bool },
    Follow(Target),
    Unfollow(Target),
    ShowPostOptions(Target),
    SharePost(Target),
    Navigate { href: String, link: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Like,
    Unlike,
    SubmitComment,
    DraftCommentChanged,
    Follow,
    Unfollow,
    ShowPostOptions,
    SharePost,
    Navigate,
}

impl IntentKind {
    /// Whether the browser's own handling of the event must be suppressed
    pub fn prevents_default(&self) -> bool {
        matches!(
            self,
            IntentKind::Like
                | IntentKind::Unlike
                | IntentKind::SubmitComment
                | IntentKind::Follow
                | IntentKind::Unfollow
                | IntentKind::Navigate
        )
    }
}

/// Intents that share one in-flight slot per target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntentClass {
    Like,
    Comment,
    Follow,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Like(_) => IntentKind::Like,
            Intent::Unlike(_) => IntentKind::Unlike,
            Intent::SubmitComment { .. } => IntentKind::SubmitComment,
            Intent::DraftCommentChanged { .. } => IntentKind::DraftCommentChanged,
            Intent::Follow(_) => IntentKind::Follow,
            Intent::Unfollow(_) => IntentKind::Unfollow,
            Intent::ShowPostOptions(_) => IntentKind::ShowPostOptions,
            Intent::SharePost(_) => IntentKind::SharePost,
            Intent::Navigate { .. } => IntentKind::Navigate,
        }
    }

    /// In-flight class for intents that go to the server; `None` for local-only intents
    pub fn class(&self) -> Option<IntentClass> {
        match self {
            Intent::Like(_) | Intent::Unlike(_) => Some(IntentClass::Like),
            Intent::SubmitComment { .. } => Some(IntentClass::Comment),
            Intent::Follow(_) | Intent::Unfollow(_) => Some(IntentClass::Follow),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&Target> {
        match self {
            Intent::Like(t)
            | Intent::Unlike(t)
            | Intent::Follow(t)
            | Intent::Unfollow(t)
            | Intent::ShowPostOptions(t)
            | Intent::SharePost(t) => Some(t),
            Intent::SubmitComment { target, .. } | Intent::DraftCommentChanged { target, .. } => {
                Some(target)
            }
            Intent::Navigate { .. } => None,
        }
    }
}

/// Map a raw event to the intent it expresses, if any. Reads the page, never writes it.
pub fn classify(page: &Page, event: &UiEvent) -> Option<Intent> {
    match event.kind {
        EventKind::Click => classify_click(page, event.target),
        EventKind::Submit => classify_submit(page, event.target),
        EventKind::Input => classify_input(page, event.target),
        EventKind::MouseEnter | EventKind::MouseLeave => None,
    }
}

fn classify_click(page: &Page, node: NodeId) -> Option<Intent> {
    if let Some(trigger) = closest(page, node, Role::LikeTrigger) {
        let target = Target::new(EntityKind::Post, post_id_for(page, trigger)?, trigger);
        return Some(if page.has_class(trigger, "liked") {
            Intent::Unlike(target)
        } else {
            Intent::Like(target)
        });
    }

    if let Some(trigger) = closest(page, node, Role::FollowTrigger) {
        let user_id = non_empty(page.attr(trigger, "data-user-id"))?;
        let target = Target::new(EntityKind::User, user_id, trigger);
        return Some(if page.has_class(trigger, "following") {
            Intent::Unfollow(target)
        } else {
            Intent::Follow(target)
        });
    }

    if let Some(trigger) = closest(page, node, Role::PostOptions) {
        // Entries of the open menu sit inside the trigger and still navigate
        if let Some(link) = closest(page, node, Role::InternalLink) {
            if closest(page, link, Role::PostOptions) == Some(trigger) {
                if let Some(href) = internal_href(page, link) {
                    return Some(Intent::Navigate { href, link });
                }
            }
        }
        let target = Target::new(EntityKind::Post, post_id_for(page, trigger)?, trigger);
        return Some(Intent::ShowPostOptions(target));
    }

    if let Some(trigger) = closest(page, node, Role::ShareTrigger) {
        let target = Target::new(EntityKind::Post, post_id_for(page, trigger)?, trigger);
        return Some(Intent::SharePost(target));
    }

    if let Some(link) = closest(page, node, Role::InternalLink) {
        let href = internal_href(page, link)?;
        return Some(Intent::Navigate { href, link });
    }

    None
}

fn classify_submit(page: &Page, node: NodeId) -> Option<Intent> {
    let form = closest(page, node, Role::CommentForm)?;
    let target = Target::new(EntityKind::Comment, post_id_for(page, form)?, form);
    let text = find_within(page, form, Role::CommentInput)
        .map(|input| page.value(input).trim().to_string())
        .unwrap_or_default();
    Some(Intent::SubmitComment { target, text })
}

fn classify_input(page: &Page, node: NodeId) -> Option<Intent> {
    let input = closest(page, node, Role::CommentInput)?;
    let form = closest(page, input, Role::CommentForm)?;
    let target = Target::new(EntityKind::Comment, post_id_for(page, form)?, form);
    Some(Intent::DraftCommentChanged {
        target,
        has_text: !page.value(input).trim().is_empty(),
    })
}

/// Post id carried by `node` itself, else by its enclosing post card
fn post_id_for(page: &Page, node: NodeId) -> Option<&str> {
    non_empty(page.attr(node, "data-post-id")).or_else(|| {
        closest(page, node, Role::PostCard).and_then(|card| non_empty(page.attr(card, "data-post-id")))
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
