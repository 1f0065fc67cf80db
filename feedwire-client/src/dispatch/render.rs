//! Projection of confirmed entity state onto the page

use feedwire_types::{Comment, Severity};

use super::coordinator::{FollowState, LikeState};
use crate::effects::Effect;
use crate::page::{find_within, ElementSpec, NodeId, Role};
use crate::view::View;

pub fn render_like(view: &mut View, trigger: NodeId, count: Option<NodeId>, state: LikeState) {
    let page = &mut view.page;
    if state.liked {
        page.add_class(trigger, "liked");
    } else {
        page.remove_class(trigger, "liked");
    }
    if let Some(icon) = find_within(page, trigger, Role::LikeIcon) {
        if state.liked {
            page.replace_class(icon, "far", "fas");
        } else {
            page.replace_class(icon, "fas", "far");
        }
    }

    let bounce = view.config.like_bounce();
    let pulse = view.config.pulse();
    if state.liked {
        view.effects().play(trigger, Effect::Bounce, bounce);
    }
    if let Some(count) = count {
        view.page.set_text(count, format!("{} likes", state.count));
        view.effects().play(count, Effect::Pulse, pulse);
    }
}

pub fn render_follow(view: &mut View, trigger: NodeId, state: FollowState) {
    let page = &mut view.page;
    if state.following {
        page.set_text(trigger, "Following");
        page.add_class(trigger, "following");
        page.set_style(trigger, "background", "var(--success)");
    } else {
        page.set_text(trigger, "Follow");
        page.remove_class(trigger, "following");
        page.set_style(trigger, "background", "var(--primary)");
    }
    let pulse = view.config.pulse();
    view.effects().play(trigger, Effect::Pulse, pulse);
}

/// Append a server-confirmed comment to `list`, clear the draft and warn about flagged content
pub fn render_comment(view: &mut View, list: Option<NodeId>, input: Option<NodeId>, comment: &Comment) {
    if let Some(list) = list {
        let node = view.page.insert(list, &comment_element(comment));
        let fade_in = view.config.comment_fade_in();
        view.effects().play_and_hold(node, Effect::FadeIn, fade_in);
    }
    if let Some(input) = input {
        view.page.set_value(input, "");
    }
    if comment.bullying_detected {
        view.notify(
            format!(
                "Cyberbullying detected! Your reputation score is now {}/10",
                comment.user_reputation
            ),
            Severity::Warning,
        );
    }
}

/// Element tree for one comment. Every field goes in as text or an attribute value.
pub fn comment_element(comment: &Comment) -> ElementSpec {
    let mut root = ElementSpec::new("div").class("comment");
    if comment.bullying_detected {
        root = root.class("bullying-detected");
    }
    if let Some(id) = comment.id {
        root = root.attr("data-comment-id", id.to_string());
    }

    let warning = comment
        .bullying_detected
        .then(|| ElementSpec::new("div").class("bullying-warning").text("⚠️ Cyberbullying detected"));

    root.child(
        ElementSpec::new("img")
            .class("comment-avatar")
            .attr("src", format!("/static/images/{}", comment.author_pic))
            .attr("alt", comment.author.clone()),
    )
    .child(
        ElementSpec::new("div")
            .class("comment-content")
            .child(
                ElementSpec::new("a")
                    .class("comment-author")
                    .attr("href", format!("/profile/{}", urlencoding::encode(&comment.author)))
                    .text(comment.author.clone()),
            )
            .child(ElementSpec::new("div").class("comment-text").text(comment.text.clone()))
            .child(ElementSpec::new("div").class("comment-time").text(comment.created_at.clone()))
            .child_opt(warning),
    )
}
