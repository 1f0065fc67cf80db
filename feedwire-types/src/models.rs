use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a post as rendered in `data-post-id`. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

/// Identifier of a user as rendered in `data-user-id`. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

macro_rules! impl_id {
    ($ty:ident) => {
        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

impl_id!(PostId);
impl_id!(UserId);

/// Body for endpoints that take no payload; serializes to `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowResponse {
    pub following: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub comment: Option<Comment>,
}

/// A comment as created by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<i64>,
    pub author: String,
    #[serde(default)]
    pub author_pic: String,
    pub text: String,
    /// Already formatted for display by the server
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub bullying_detected: bool,
    #[serde(default)]
    pub user_reputation: f64,
    #[serde(default)]
    pub reputation_loss: f64,
}

/// Application-level failure reported in the response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
