use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use feedwire::api::ApiClient;
use feedwire::bootstrap::Bootstrap;
use feedwire::config::InteractionConfig;
use feedwire::dispatch::{Dispatcher, IntentKind, Outcome, UiEvent};
use feedwire::host::{FixedBadges, HostAction, RecordingHost};
use feedwire::logging::LogConfig;
use feedwire::page::{ElementSpec, Page, PageSpec};
use feedwire_types::{CommentRequest, Severity};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Minimal stand-in for the feed server: remembers likes, refuses follows
#[derive(Clone, Default)]
struct FeedServer {
    liked: Arc<Mutex<HashSet<String>>>,
}

async fn like(State(server): State<FeedServer>, Path(post_id): Path<String>) -> Response {
    let mut liked = server.liked.lock().unwrap();
    let now_liked = if liked.remove(&post_id) {
        false
    } else {
        liked.insert(post_id);
        true
    };
    Json(json!({ "liked": now_liked })).into_response()
}

async fn comment(Json(body): Json<CommentRequest>) -> Response {
    let flagged = body.comment.contains("loser");
    Json(json!({
        "success": true,
        "comment": {
            "author": "alice",
            "author_pic": "alice.png",
            "text": body.comment,
            "created_at": "just now",
            "bullying_detected": flagged,
            "user_reputation": if flagged { 4 } else { 10 }
        }
    }))
    .into_response()
}

async fn follow() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "error": "Cannot follow yourself" }))).into_response()
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/like/:post_id", post(like))
        .route("/comment/:post_id", post(comment))
        .route("/follow/:user_id", post(follow))
        .with_state(FeedServer::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn feed_page() -> Page {
    let card = ElementSpec::new("div")
        .class("post-card")
        .attr("data-post-id", "7")
        .child(
            ElementSpec::new("button")
                .class("like-btn")
                .attr("id", "like")
                .child(ElementSpec::new("i").class("far fa-heart")),
        )
        .child(ElementSpec::new("span").class("like-count").attr("id", "count").text("3 likes"))
        .child(ElementSpec::new("div").class("post-comments").attr("id", "comments"))
        .child(
            ElementSpec::new("form")
                .class("comment-form")
                .attr("data-post-id", "7")
                .attr("id", "form")
                .child(ElementSpec::new("input").class("comment-input").attr("id", "input"))
                .child(ElementSpec::new("button").class("comment-submit").attr("id", "submit").text("Post")),
        );
    let spec = PageSpec {
        head: Vec::new(),
        body: vec![
            ElementSpec::new("a").class("nav-link").attr("href", "/").child(
                ElementSpec::new("span").class("badge").attr("id", "badge"),
            ),
            ElementSpec::new("button")
                .class("btn follow-btn")
                .attr("data-user-id", "me")
                .attr("id", "follow")
                .text("Follow"),
            card,
        ],
    };
    Page::from_spec(&spec)
}

async fn start() -> Dispatcher<ApiClient, RecordingHost> {
    let client = ApiClient::new(spawn_server().await);
    Bootstrap::new(InteractionConfig::default())
        .with_log_config(LogConfig::disabled())
        .with_badge_feed(FixedBadges(vec![2]))
        .start(feed_page(), client, RecordingHost::new("http://feed.local"))
}

fn id(d: &Dispatcher<ApiClient, RecordingHost>, id: &str) -> feedwire::page::NodeId {
    d.node_by_id(id).unwrap()
}

#[tokio::test]
async fn test_like_then_unlike_against_server() {
    let d = start().await;
    let like = id(&d, "like");
    let count = id(&d, "count");

    let first = d.dispatch(UiEvent::click(like)).await;
    assert_eq!(first.intent, Some(IntentKind::Like));
    assert_eq!(first.outcome, Outcome::Applied);
    d.with_page(|page| {
        assert!(page.has_class(like, "liked"));
        assert_eq!(page.text(count), "4 likes");
    });

    let second = d.dispatch(UiEvent::click(like)).await;
    assert_eq!(second.intent, Some(IntentKind::Unlike));
    assert_eq!(second.outcome, Outcome::Applied);
    d.with_page(|page| {
        assert!(!page.has_class(like, "liked"));
        assert_eq!(page.text(count), "3 likes");
    });
}

#[tokio::test]
async fn test_comment_flow_with_warning_expiry() {
    let d = start().await;
    let input = id(&d, "input");

    d.with_page_mut(|page| page.set_value(input, "you loser"));
    d.dispatch(UiEvent::input(input)).await;
    let result = d.dispatch(UiEvent::submit(id(&d, "form"))).await;

    assert_eq!(result.outcome, Outcome::Applied);
    d.with_page(|page| {
        assert_eq!(page.children(id(&d, "comments")).len(), 1);
        assert_eq!(page.value(input), "");
    });
    let notifications = d.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].severity, Severity::Warning);
    assert!(notifications[0].message.contains("4/10"));

    d.advance(Duration::from_millis(5500));
    assert!(d.notifications().is_empty());
}

#[tokio::test]
async fn test_refused_follow_reports_server_message() {
    let d = start().await;
    let follow = id(&d, "follow");

    let result = d.dispatch(UiEvent::click(follow)).await;

    assert_eq!(
        result.outcome,
        Outcome::RolledBack {
            message: "Cannot follow yourself".to_string()
        }
    );
    d.with_page(|page| {
        assert_eq!(page.text(follow), "Follow");
        assert!(!page.has_class(follow, "following"));
        assert!(!page.is_disabled(follow));
    });
    assert_eq!(d.notifications()[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_bootstrap_timers_and_navigation() {
    let d = start().await;

    d.advance(Duration::from_secs(2));
    d.with_page(|page| assert_eq!(page.text(id(&d, "badge")), "2"));

    let link = d.with_page(|page| page.children(page.body())[0]);
    let result = d.dispatch(UiEvent::click(link)).await;
    assert!(result.default_prevented);

    d.advance(Duration::from_millis(300));
    assert_eq!(
        d.host().actions(),
        vec![HostAction::Navigated {
            href: "/".to_string()
        }]
    );
}
