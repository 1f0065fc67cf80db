use async_trait::async_trait;
use feedwire_types::{Comment, PostId, UserId};

use super::ApiResult;

/// One remote action, ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Like { post_id: PostId },
    Comment { post_id: PostId, text: String },
    Follow { user_id: UserId },
}

impl ActionRequest {
    /// Endpoint path relative to the server base URL
    pub fn path(&self) -> String {
        match self {
            ActionRequest::Like { post_id } => endpoint("like", post_id.as_str()),
            ActionRequest::Comment { post_id, .. } => endpoint("comment", post_id.as_str()),
            ActionRequest::Follow { user_id } => endpoint("follow", user_id.as_str()),
        }
    }
}

pub(crate) fn endpoint(action: &str, id: &str) -> String {
    format!("/{}/{}", action, urlencoding::encode(id))
}

/// Normalized success shape of a remote action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse {
    Like { liked: bool },
    Comment(Comment),
    Follow { following: bool },
}

/// Performs remote actions. A single request/response exchange per call, no retries.
///
/// Runs on the page's single thread, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait ActionGateway {
    async fn perform(&self, request: &ActionRequest) -> ApiResult<ActionResponse>;
}
