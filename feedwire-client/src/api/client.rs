use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::gateway::endpoint;
use super::{ActionGateway, ActionRequest, ActionResponse, ApiError, ApiResult};
use feedwire_types::*;

/// HTTP client for the like/comment/follow endpoints
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the session cookie sent with every request (`name=value`)
    pub fn set_session_cookie(&mut self, cookie: Option<String>) {
        self.session_cookie = cookie;
    }

    fn add_session(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(cookie) = &self.session_cookie {
            req.header(reqwest::header::COOKIE, cookie)
        } else {
            req
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let req = self.add_session(self.client.post(&url).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Normalize a response into either the success shape or an [`ApiError`].
    ///
    /// An `error` field wins over the status code: the server reports refusals such as
    /// "Not logged in" with a 4xx status and a JSON body meant for the user.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) if status.is_success() => return Err(ApiError::Decode(e)),
            Err(_) => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: clean_error_body(status, body),
                })
            }
        };

        if value.get("error").is_some() {
            if let Ok(ErrorResponse { error }) = serde_json::from_value(value.clone()) {
                return Err(ApiError::Application(error));
            }
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: clean_error_body(status, body),
            });
        }

        serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// Toggle the current user's like on a post
    pub async fn like_post(&self, post_id: &PostId) -> ApiResult<LikeResponse> {
        let path = endpoint("like", post_id.as_str());
        self.post_json(&path, &EmptyRequest::default()).await
    }

    /// Post a comment; the server returns the stored comment
    pub async fn comment_on_post(&self, post_id: &PostId, text: &str) -> ApiResult<Comment> {
        let path = endpoint("comment", post_id.as_str());
        let request = CommentRequest {
            comment: text.to_string(),
        };
        let response: CommentResponse = self.post_json(&path, &request).await?;

        match response.comment {
            Some(comment) if response.success => Ok(comment),
            _ => Err(ApiError::Malformed(
                "comment response without success and comment".to_string(),
            )),
        }
    }

    /// Toggle whether the current user follows `user_id`
    pub async fn follow_user(&self, user_id: &UserId) -> ApiResult<FollowResponse> {
        let path = endpoint("follow", user_id.as_str());
        self.post_json(&path, &EmptyRequest::default()).await
    }
}

#[async_trait(?Send)]
impl ActionGateway for ApiClient {
    async fn perform(&self, request: &ActionRequest) -> ApiResult<ActionResponse> {
        match request {
            ActionRequest::Like { post_id } => {
                let response = self.like_post(post_id).await?;
                Ok(ActionResponse::Like {
                    liked: response.liked,
                })
            }
            ActionRequest::Comment { post_id, text } => {
                let comment = self.comment_on_post(post_id, text).await?;
                Ok(ActionResponse::Comment(comment))
            }
            ActionRequest::Follow { user_id } => {
                let response = self.follow_user(user_id).await?;
                Ok(ActionResponse::Follow {
                    following: response.following,
                })
            }
        }
    }
}

/// HTML error pages (proxies, nginx) are useless in a log line
fn clean_error_body(status: reqwest::StatusCode, body: String) -> String {
    if body.contains("<html>") || body.contains("<!DOCTYPE") {
        format!("Server returned {} error. Please check the server URL.", status.as_u16())
    } else {
        body
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        let base_url = std::env::var(crate::server_config::SERVER_URL_ENV)
            .unwrap_or_else(|_| crate::server_config::DEFAULT_SERVER_URL.to_string());
        Self::new(base_url)
    }
}
