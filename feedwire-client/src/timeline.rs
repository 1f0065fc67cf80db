//! Virtual clock for delayed page work.
//!
//! Everything the page does "later" is a [`TimerTask`] queued here: clearing an animation,
//! fading and removing a notification, following a link after the transition, seeding
//! badges. The host advances the clock; due tasks come out in due order, ties broken by
//! scheduling order.

use std::time::Duration;

use crate::page::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    ClearAnimation(NodeId),
    FadeNotification(NodeId),
    RemoveNotification(NodeId),
    FadeFlashContainer(NodeId),
    RemoveNode(NodeId),
    Navigate(String),
    SeedBadges,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: TimerTask,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now: Duration,
    seq: u64,
    queue: Vec<Scheduled>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the page was loaded
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: TimerTask) {
        let due = self.now + delay;
        let seq = self.seq;
        self.seq += 1;
        // Keep the queue sorted by (due, seq) so the head is always the next task
        let at = self
            .queue
            .partition_point(|s| (s.due, s.seq) <= (due, seq));
        self.queue.insert(at, Scheduled { due, seq, task });
    }

    /// Take the next task due at or before `until`, moving the clock to its due time
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerTask> {
        if self.queue.first().is_some_and(|s| s.due <= until) {
            let next = self.queue.remove(0);
            self.now = self.now.max(next.due);
            Some(next.task)
        } else {
            None
        }
    }

    /// Move the clock forward to `until` once no task before it remains
    pub fn settle_at(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.first().map(|s| s.due)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, task: &TimerTask) -> bool {
        self.queue.iter().any(|s| &s.task == task)
    }
}
