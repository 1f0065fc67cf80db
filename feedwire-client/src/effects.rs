use std::time::Duration;

use crate::page::{NodeId, Page};
use crate::timeline::{TimerTask, Timeline};

/// Transient visual feedback. Purely presentational; no state depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Pulse,
    Bounce,
    FadeIn,
    FadeOut,
}

impl Effect {
    pub fn keyframes(&self) -> &'static str {
        match self {
            Effect::Pulse => "pulse",
            Effect::Bounce => "bounce",
            Effect::FadeIn => "fadeIn",
            Effect::FadeOut => "fadeOut",
        }
    }

    fn easing(&self) -> &'static str {
        match self {
            Effect::Pulse | Effect::Bounce => "ease",
            Effect::FadeIn | Effect::FadeOut => "ease-out",
        }
    }

    /// CSS `animation` shorthand for one run of `duration`
    pub fn css(&self, duration: Duration) -> String {
        format!("{} {}s {}", self.keyframes(), duration.as_secs_f64(), self.easing())
    }
}

/// Access to element styling and the timeline, scoped to a single page
pub struct Effects<'a> {
    page: &'a mut Page,
    timeline: &'a mut Timeline,
}

impl<'a> Effects<'a> {
    pub fn new(page: &'a mut Page, timeline: &'a mut Timeline) -> Self {
        Self { page, timeline }
    }

    /// Run `effect` once and clear the animation when it is over
    pub fn play(&mut self, node: NodeId, effect: Effect, duration: Duration) {
        self.page.set_style(node, "animation", effect.css(duration));
        self.timeline
            .schedule(duration, TimerTask::ClearAnimation(node));
    }

    /// Run `effect` once and leave the final frame in place
    pub fn play_and_hold(&mut self, node: NodeId, effect: Effect, duration: Duration) {
        self.page.set_style(node, "animation", effect.css(duration));
    }

    /// Repeat `effect` until the element goes away
    pub fn play_forever(&mut self, node: NodeId, effect: Effect, period: Duration) {
        self.page.set_style(
            node,
            "animation",
            format!("{} {}s infinite", effect.keyframes(), period.as_secs_f64()),
        );
    }

    /// Raise a control under the pointer
    pub fn lift(&mut self, node: NodeId) {
        self.page.set_style(node, "transform", "translateY(-2px)");
    }

    pub fn settle(&mut self, node: NodeId) {
        self.page.set_style(node, "transform", "translateY(0)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_matches_keyframe_conventions() {
        assert_eq!(Effect::Bounce.css(Duration::from_millis(600)), "bounce 0.6s ease");
        assert_eq!(Effect::FadeOut.css(Duration::from_millis(500)), "fadeOut 0.5s ease-out");
        assert_eq!(Effect::Pulse.css(Duration::from_secs(2)), "pulse 2s ease");
    }

    #[test]
    fn test_play_schedules_clear() {
        let mut page = Page::new();
        let mut timeline = Timeline::new();
        let node = page.create("span");

        Effects::new(&mut page, &mut timeline).play(node, Effect::Pulse, Duration::from_millis(300));

        assert_eq!(page.style(node, "animation"), Some("pulse 0.3s ease"));
        assert!(timeline.is_scheduled(&TimerTask::ClearAnimation(node)));
    }

    #[test]
    fn test_play_forever_is_not_cleared() {
        let mut page = Page::new();
        let mut timeline = Timeline::new();
        let badge = page.create("span");

        Effects::new(&mut page, &mut timeline).play_forever(badge, Effect::Pulse, Duration::from_secs(2));

        assert_eq!(page.style(badge, "animation"), Some("pulse 2s infinite"));
        assert_eq!(timeline.pending(), 0);
    }
}
