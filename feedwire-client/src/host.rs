use anyhow::{anyhow, Result};
use serde::Serialize;
use std::cell::RefCell;

/// Payload handed to the platform share sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Capabilities of the environment the page runs in
pub trait Host {
    /// Scheme, host and port of the page, without a trailing slash
    fn origin(&self) -> String;

    fn can_share(&self) -> bool;

    fn share(&self, data: &ShareData) -> Result<()>;

    fn write_clipboard(&self, text: &str) -> Result<()>;

    /// Leave the current page
    fn navigate(&self, href: &str);
}

/// Source of the counts shown on navigation badges
pub trait BadgeFeed {
    fn count_for(&mut self, index: usize) -> u32;
}

/// Placeholder counts in `1..=5` until a real unread-count endpoint exists
#[derive(Debug, Default)]
pub struct RandomBadges;

impl BadgeFeed for RandomBadges {
    fn count_for(&mut self, _index: usize) -> u32 {
        // 255 is the only byte value that would favour the low counts
        loop {
            let id = uuid::Uuid::new_v4();
            if let Some(&byte) = id.as_bytes().iter().find(|&&b| b < 255) {
                return u32::from(byte % 5) + 1;
            }
        }
    }
}

/// Always the same counts, cycling through `counts`
#[derive(Debug, Clone)]
pub struct FixedBadges(pub Vec<u32>);

impl BadgeFeed for FixedBadges {
    fn count_for(&mut self, index: usize) -> u32 {
        if self.0.is_empty() {
            return 0;
        }
        self.0[index % self.0.len()]
    }
}

/// Something the page asked the host to do
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    Shared(ShareData),
    Copied { text: String },
    Navigated { href: String },
}

/// Host that performs nothing and records every request, in order
#[derive(Debug)]
pub struct RecordingHost {
    origin: String,
    share_supported: bool,
    clipboard_available: bool,
    actions: RefCell<Vec<HostAction>>,
}

impl RecordingHost {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            share_supported: false,
            clipboard_available: true,
            actions: RefCell::new(Vec::new()),
        }
    }

    pub fn with_native_share(mut self, supported: bool) -> Self {
        self.share_supported = supported;
        self
    }

    pub fn with_clipboard(mut self, available: bool) -> Self {
        self.clipboard_available = available;
        self
    }

    pub fn actions(&self) -> Vec<HostAction> {
        self.actions.borrow().clone()
    }
}

impl Host for RecordingHost {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn can_share(&self) -> bool {
        self.share_supported
    }

    fn share(&self, data: &ShareData) -> Result<()> {
        self.actions.borrow_mut().push(HostAction::Shared(data.clone()));
        Ok(())
    }

    fn write_clipboard(&self, text: &str) -> Result<()> {
        if !self.clipboard_available {
            return Err(anyhow!("clipboard is not available"));
        }
        self.actions.borrow_mut().push(HostAction::Copied {
            text: text.to_string(),
        });
        Ok(())
    }

    fn navigate(&self, href: &str) {
        self.actions.borrow_mut().push(HostAction::Navigated {
            href: href.to_string(),
        });
    }
}
