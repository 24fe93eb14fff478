use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::classifier::classify;
use crate::discord::{ChannelId, DeliverySink};
use crate::models::DisplayMessage;
use crate::render::render_now;

pub const GITHUB_EVENT_HEADER: &str = "x-github-event";
pub const GITHUB_DELIVERY_HEADER: &str = "x-github-delivery";

#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn DeliverySink>,
    pub channel: ChannelId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, (StatusCode, &'static str)> {
    let Some(kind) = header_str(&headers, GITHUB_EVENT_HEADER) else {
        tracing::warn!("Webhook request without event header");
        return Err((StatusCode::BAD_REQUEST, "Missing X-GitHub-Event header"));
    };
    let delivery = header_str(&headers, GITHUB_DELIVERY_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(kind, %delivery, "Invalid JSON payload: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid JSON payload")
    })?;

    if let Some(message) = process_event(kind, &payload, &delivery) {
        let sink = state.sink.clone();
        let channel = state.channel;
        let kind = kind.to_string();

        tokio::spawn(async move {
            match sink.deliver(&channel, &message).await {
                Ok(()) => tracing::info!(%kind, %delivery, %channel, "Message delivered"),
                Err(e) => {
                    tracing::error!(%kind, %delivery, %channel, "Message delivery failed: {}", e)
                }
            }
        });
    }

    Ok("Webhook received")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Classify and render one event. Malformed payloads are logged and dropped.
pub fn process_event(kind: &str, payload: &Value, delivery: &str) -> Option<DisplayMessage> {
    match classify(kind, payload) {
        Ok(Some(record)) => {
            tracing::info!(kind, delivery, "Relaying event");
            Some(render_now(&record))
        }
        Ok(None) => {
            if kind == "ping" {
                let zen = payload.get("zen").and_then(Value::as_str).unwrap_or_default();
                tracing::info!(delivery, zen, "Received ping from GitHub");
            } else {
                tracing::info!(kind, delivery, "Event not relayed");
            }
            None
        }
        Err(e) => {
            tracing::warn!(kind, delivery, field = %e.field, "Dropping event: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    const CHANNEL: ChannelId = ChannelId(42);

    struct RecordingSink {
        tx: mpsc::UnboundedSender<(ChannelId, DisplayMessage)>,
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        async fn deliver(
            &self,
            channel: &ChannelId,
            message: &DisplayMessage,
        ) -> Result<(), DeliveryError> {
            let _ = self.tx.send((*channel, message.clone()));
            Ok(())
        }
    }

    fn app() -> (Router, mpsc::UnboundedReceiver<(ChannelId, DisplayMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState {
            sink: Arc::new(RecordingSink { tx }),
            channel: CHANNEL,
        };
        (router(state), rx)
    }

    fn webhook_request(kind: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("Content-Type", "application/json")
            .header("X-GitHub-Delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
        if let Some(kind) = kind {
            builder = builder.header("X-GitHub-Event", kind);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn read_body(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn assert_nothing_delivered(rx: &mut mpsc::UnboundedReceiver<(ChannelId, DisplayMessage)>) {
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    fn star_body(action: &str) -> String {
        json!({
            "action": action,
            "sender": { "login": "stargazer" },
            "repository": {
                "full_name": "octo/hello",
                "html_url": "https://github.com/octo/hello",
                "stargazers_count": 10,
            },
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _rx) = app();
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_body(resp).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_star_is_delivered_to_configured_channel() {
        let (app, mut rx) = app();
        let resp = app
            .oneshot(webhook_request(Some("star"), star_body("created")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_body(resp).await, "Webhook received");

        let (channel, message) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("delivery should happen")
            .expect("sink should receive a message");
        assert_eq!(channel, CHANNEL);
        assert_eq!(message.title, "New star on octo/hello");
        assert_eq!(message.fields[1].value, "10");
    }

    #[tokio::test]
    async fn test_ignored_action_is_accepted_without_message() {
        let (app, mut rx) = app();
        let resp = app
            .oneshot(webhook_request(Some("star"), star_body("deleted")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_nothing_delivered(&mut rx).await;
    }

    #[tokio::test]
    async fn test_unknown_kind_is_accepted_without_message() {
        let (app, mut rx) = app();
        let resp = app
            .oneshot(webhook_request(Some("issue_comment"), star_body("created")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_nothing_delivered(&mut rx).await;
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let (app, mut rx) = app();
        let body = json!({ "ref": "refs/heads/main", "repository": {} }).to_string();
        let resp = app
            .oneshot(webhook_request(Some("push"), body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_nothing_delivered(&mut rx).await;
    }

    #[tokio::test]
    async fn test_missing_event_header() {
        let (app, mut rx) = app();
        let resp = app
            .oneshot(webhook_request(None, star_body("created")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_body(resp).await, "Missing X-GitHub-Event header");
        assert_nothing_delivered(&mut rx).await;
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (app, _rx) = app();
        let resp = app
            .oneshot(webhook_request(Some("push"), "not json".into()))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_body(resp).await, "Invalid JSON payload");
    }

    #[test]
    fn test_process_event_ping() {
        let payload = json!({ "zen": "Design for failure.", "hook_id": 1 });
        assert!(process_event("ping", &payload, "d1").is_none());
    }
}
