use serde::{Deserialize, Serialize};

use crate::page::NodeId;

/// Kind of a raw page event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    Submit,
    Input,
    #[serde(rename = "enter")]
    MouseEnter,
    #[serde(rename = "leave")]
    MouseLeave,
}

impl EventKind {
    pub fn is_hover(&self) -> bool {
        matches!(self, EventKind::MouseEnter | EventKind::MouseLeave)
    }
}

/// A raw event as delivered by the host, before any interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiEvent {
    pub kind: EventKind,
    pub target: NodeId,
}

impl UiEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self { kind, target }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn submit(target: NodeId) -> Self {
        Self::new(EventKind::Submit, target)
    }

    pub fn input(target: NodeId) -> Self {
        Self::new(EventKind::Input, target)
    }
}
