use super::{NodeId, Page};

/// Semantic role of an element in the feed markup.
///
/// A role may be rendered by more than one markup pattern; callers only ever ask for the
/// role and never see which pattern matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    PostCard,
    LikeTrigger,
    LikeIcon,
    LikeCount,
    CommentForm,
    CommentInput,
    CommentSubmit,
    CommentList,
    FollowTrigger,
    ShareTrigger,
    PostOptions,
    OptionsMenu,
    InternalLink,
    NavBadge,
    Hoverable,
    FlashContainer,
}

struct Pattern {
    tag: Option<&'static str>,
    classes: &'static [&'static str],
    attr: Option<&'static str>,
    /// Class some ancestor (excluding the element itself) must carry
    inside: Option<&'static str>,
}

const fn classes(classes: &'static [&'static str]) -> Pattern {
    Pattern {
        tag: None,
        classes,
        attr: None,
        inside: None,
    }
}

const POST_CARD: &[Pattern] = &[classes(&["post-card"])];
const LIKE_TRIGGER: &[Pattern] = &[classes(&["like-btn"]), classes(&["action-btn", "like"])];
const LIKE_ICON: &[Pattern] = &[Pattern {
    tag: Some("i"),
    classes: &[],
    attr: None,
    inside: None,
}];
const LIKE_COUNT: &[Pattern] = &[classes(&["like-count"])];
const COMMENT_FORM: &[Pattern] = &[classes(&["comment-form"])];
const COMMENT_INPUT: &[Pattern] = &[classes(&["comment-input"])];
const COMMENT_SUBMIT: &[Pattern] = &[classes(&["comment-submit"])];
const COMMENT_LIST: &[Pattern] = &[classes(&["post-comments"])];
const FOLLOW_TRIGGER: &[Pattern] = &[classes(&["follow-btn"])];
const SHARE_TRIGGER: &[Pattern] = &[classes(&["share-btn"])];
const POST_OPTIONS: &[Pattern] = &[classes(&["post-options"])];
const OPTIONS_MENU: &[Pattern] = &[classes(&["post-options-menu"])];
const INTERNAL_LINK: &[Pattern] = &[Pattern {
    tag: Some("a"),
    classes: &[],
    attr: Some("href"),
    inside: None,
}];
const NAV_BADGE: &[Pattern] = &[Pattern {
    tag: None,
    classes: &["badge"],
    attr: None,
    inside: Some("nav-link"),
}];
const HOVERABLE: &[Pattern] = &[classes(&["btn"]), classes(&["action-btn"])];
const FLASH_CONTAINER: &[Pattern] = &[classes(&["flash-messages"])];

impl Role {
    fn patterns(self) -> &'static [Pattern] {
        match self {
            Role::PostCard => POST_CARD,
            Role::LikeTrigger => LIKE_TRIGGER,
            Role::LikeIcon => LIKE_ICON,
            Role::LikeCount => LIKE_COUNT,
            Role::CommentForm => COMMENT_FORM,
            Role::CommentInput => COMMENT_INPUT,
            Role::CommentSubmit => COMMENT_SUBMIT,
            Role::CommentList => COMMENT_LIST,
            Role::FollowTrigger => FOLLOW_TRIGGER,
            Role::ShareTrigger => SHARE_TRIGGER,
            Role::PostOptions => POST_OPTIONS,
            Role::OptionsMenu => OPTIONS_MENU,
            Role::InternalLink => INTERNAL_LINK,
            Role::NavBadge => NAV_BADGE,
            Role::Hoverable => HOVERABLE,
            Role::FlashContainer => FLASH_CONTAINER,
        }
    }
}

impl Pattern {
    fn matches(&self, page: &Page, node: NodeId) -> bool {
        if let Some(tag) = self.tag {
            if page.tag(node) != tag {
                return false;
            }
        }
        if !self.classes.iter().all(|c| page.has_class(node, c)) {
            return false;
        }
        if let Some(attr) = self.attr {
            if page.attr(node, attr).is_none() {
                return false;
            }
        }
        match self.inside {
            Some(class) => page.ancestors(node).skip(1).any(|a| page.has_class(a, class)),
            None => true,
        }
    }
}

/// Whether `node` plays `role`
pub fn matches(page: &Page, node: NodeId, role: Role) -> bool {
    role.patterns().iter().any(|p| p.matches(page, node))
}

/// Nearest element playing `role`, starting at `node` itself and walking up
pub fn closest(page: &Page, node: NodeId, role: Role) -> Option<NodeId> {
    page.ancestors(node).find(|&n| matches(page, n, role))
}

/// First element playing `role` inside `root` (root included), in document order
pub fn find_within(page: &Page, root: NodeId, role: Role) -> Option<NodeId> {
    page.descendants(root)
        .into_iter()
        .find(|&n| matches(page, n, role))
}

/// Every attached element playing `role`, in document order
pub fn find_all(page: &Page, role: Role) -> Vec<NodeId> {
    page.descendants(page.root())
        .into_iter()
        .filter(|&n| matches(page, n, role))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ElementSpec;

    fn feed() -> Page {
        Page::with_body([
            ElementSpec::new("nav").child(
                ElementSpec::new("a")
                    .class("nav-link")
                    .attr("href", "/notifications")
                    .child(ElementSpec::new("span").class("badge").attr("id", "nav-badge")),
            ),
            ElementSpec::new("span").class("badge").attr("id", "loose-badge"),
            ElementSpec::new("div")
                .class("post-card")
                .attr("data-post-id", "1")
                .child(
                    ElementSpec::new("button")
                        .class("like-btn")
                        .attr("id", "like-1")
                        .child(ElementSpec::new("i").class("far fa-heart").attr("id", "icon-1")),
                ),
            ElementSpec::new("div")
                .class("post-card")
                .attr("data-post-id", "2")
                .child(
                    ElementSpec::new("button")
                        .class("action-btn like")
                        .attr("id", "like-2"),
                ),
        ])
    }

    #[test]
    fn test_closest_walks_up_from_nested_icon() {
        let page = feed();
        let icon = page.find_by_id("icon-1").unwrap();
        let like = page.find_by_id("like-1").unwrap();

        assert_eq!(closest(&page, icon, Role::LikeTrigger), Some(like));
        assert_eq!(
            closest(&page, icon, Role::PostCard).and_then(|c| page.attr(c, "data-post-id")),
            Some("1")
        );
    }

    #[test]
    fn test_like_trigger_aliases_resolve_to_same_role() {
        let page = feed();
        let plain = page.find_by_id("like-1").unwrap();
        let action = page.find_by_id("like-2").unwrap();

        assert!(matches(&page, plain, Role::LikeTrigger));
        assert!(matches(&page, action, Role::LikeTrigger));
        assert!(matches(&page, action, Role::Hoverable));
    }

    #[test]
    fn test_unrelated_target_resolves_to_nothing() {
        let page = feed();
        let nav_badge = page.find_by_id("nav-badge").unwrap();
        assert_eq!(closest(&page, nav_badge, Role::LikeTrigger), None);
        assert_eq!(closest(&page, nav_badge, Role::PostCard), None);
    }

    #[test]
    fn test_nav_badge_requires_nav_link_ancestor() {
        let page = feed();
        let badges = find_all(&page, Role::NavBadge);
        assert_eq!(badges, vec![page.find_by_id("nav-badge").unwrap()]);
    }
}
