use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use feedwire::api::{ActionGateway, ActionRequest, ActionResponse, ApiClient, ApiError};
use feedwire_types::{CommentRequest, PostId, UserId};
use serde_json::json;

async fn like(Path(post_id): Path<String>) -> Response {
    match post_id.as_str() {
        "locked" => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not logged in" }))).into_response(),
        "proxy" => (
            StatusCode::BAD_GATEWAY,
            "<!DOCTYPE html><html><body>Bad Gateway</body></html>",
        )
            .into_response(),
        "garbled" => (StatusCode::OK, "liked!").into_response(),
        "odd" => Json(json!({ "unexpected": 1 })).into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" }))).into_response(),
        _ => Json(json!({ "liked": true })).into_response(),
    }
}

async fn comment(Path(post_id): Path<String>, Json(body): Json<CommentRequest>) -> Response {
    if body.comment.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Comment cannot be empty" })),
        )
            .into_response();
    }
    if post_id == "quiet" {
        return Json(json!({ "success": false })).into_response();
    }
    Json(json!({
        "success": true,
        "comment": {
            "id": 5,
            "author": "alice",
            "author_pic": "alice.png",
            "text": body.comment,
            "created_at": "2024-05-01 10:00",
            "bullying_detected": false,
            "user_reputation": 9.5,
            "reputation_loss": 0
        }
    }))
    .into_response()
}

async fn follow(Path(_user_id): Path<String>, headers: HeaderMap) -> Response {
    let logged_in = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("session=abc"));
    if logged_in {
        Json(json!({ "following": true })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not logged in" }))).into_response()
    }
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/like/:post_id", post(like))
        .route("/comment/:post_id", post(comment))
        .route("/follow/:user_id", post(follow));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn like_request(id: &str) -> ActionRequest {
    ActionRequest::Like {
        post_id: PostId::from(id),
    }
}

#[tokio::test]
async fn test_like_success() {
    let client = ApiClient::new(spawn_server().await);

    let response = client.perform(&like_request("7")).await.unwrap();

    assert_eq!(response, ActionResponse::Like { liked: true });
}

#[tokio::test]
async fn test_error_field_wins_over_status() {
    let client = ApiClient::new(spawn_server().await);

    let err = client.perform(&like_request("locked")).await.unwrap_err();

    assert!(matches!(err, ApiError::Application(ref m) if m == "Not logged in"), "got {:?}", err);
    assert_eq!(err.server_message(), Some("Not logged in"));
}

#[tokio::test]
async fn test_html_error_page_becomes_status_error() {
    let client = ApiClient::new(spawn_server().await);

    let err = client.perform(&like_request("proxy")).await.unwrap_err();

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "Server returned 502 error. Please check the server URL.");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_without_error_field() {
    let client = ApiClient::new(spawn_server().await);

    let err = client.perform(&like_request("crash")).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, .. }), "got {:?}", err);
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unparseable_and_unexpected_bodies() {
    let client = ApiClient::new(spawn_server().await);

    let garbled = client.perform(&like_request("garbled")).await.unwrap_err();
    assert!(matches!(garbled, ApiError::Decode(_)), "got {:?}", garbled);

    let odd = client.perform(&like_request("odd")).await.unwrap_err();
    assert!(matches!(odd, ApiError::Malformed(_)), "got {:?}", odd);
}

#[tokio::test]
async fn test_comment_round_trip() {
    let client = ApiClient::new(spawn_server().await);

    let response = client
        .perform(&ActionRequest::Comment {
            post_id: PostId::from("7"),
            text: "hello".to_string(),
        })
        .await
        .unwrap();

    match response {
        ActionResponse::Comment(comment) => {
            assert_eq!(comment.author, "alice");
            assert_eq!(comment.text, "hello");
            assert_eq!(comment.id, Some(5));
            assert_eq!(comment.user_reputation, 9.5);
        }
        other => panic!("expected comment, got {:?}", other),
    }
}

#[tokio::test]
async fn test_comment_without_success_is_malformed() {
    let client = ApiClient::new(spawn_server().await);

    let err = client
        .perform(&ActionRequest::Comment {
            post_id: PostId::from("quiet"),
            text: "hello".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_session_cookie_is_sent() {
    let base_url = spawn_server().await;
    let request = ActionRequest::Follow {
        user_id: UserId::from("42"),
    };

    let anonymous = ApiClient::new(base_url.clone());
    let err = anonymous.perform(&request).await.unwrap_err();
    assert_eq!(err.server_message(), Some("Not logged in"));

    let mut client = ApiClient::new(base_url);
    client.set_session_cookie(Some("session=abc".to_string()));
    let response = client.perform(&request).await.unwrap();
    assert_eq!(response, ActionResponse::Follow { following: true });
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(format!("http://{}", addr));
    let err = client.perform(&like_request("7")).await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
}
