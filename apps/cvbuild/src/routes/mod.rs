pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/filter", post(handlers::handle_filter))
        .route("/api/v1/render", post(handlers::handle_render))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            max_document_bytes: 4096,
        }))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cvbuild");
    }

    #[tokio::test]
    async fn test_filter_returns_tree() {
        let request = post_json(
            "/api/v1/filter",
            json!({
                "document": "headline:\n  _default: Engineer\n  eng: Backend engineer\nnotes: {x: 1}\n",
                "tags": ["eng"]
            }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            json!({"document": {"headline": "Backend engineer", "_tags": ["_all"]}})
        );
    }

    #[tokio::test]
    async fn test_filter_without_tags_is_identity() {
        let request = post_json(
            "/api/v1/filter",
            json!({"document": "notes: {x: 1}\n", "tags": null}),
        );
        let response = app().oneshot(request).await.unwrap();
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            json!({"document": {"notes": {"x": 1}, "_tags": ["_all"]}})
        );
    }

    #[tokio::test]
    async fn test_filter_malformed_gate() {
        let request = post_json(
            "/api/v1/filter",
            json!({"document": "jobs:\n  - {_tags: eng}\n", "tags": ["eng"]}),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "FILTER_ERROR");
    }

    #[tokio::test]
    async fn test_filter_rejects_empty_document() {
        let request = post_json("/api/v1/filter", json!({"document": "  "}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_filter_rejects_oversized_document() {
        let document = format!("text: {}\n", "a".repeat(5000));
        let request = post_json("/api/v1/filter", json!({ "document": document }));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_filter_sequence_root_is_load_error() {
        let request = post_json("/api/v1/filter", json!({"document": "- a\n"}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "LOAD_ERROR");
    }

    #[tokio::test]
    async fn test_render_returns_text() {
        let request = post_json(
            "/api/v1/render",
            json!({
                "document": "name: Ada\nheadline: {_default: Engineer, sales: Solutions engineer}\n",
                "template": "{{ name }} / {{ headline }}",
                "tags": ["sales"]
            }),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Ada / Solutions engineer");
    }

    #[tokio::test]
    async fn test_render_template_syntax_error() {
        let request = post_json(
            "/api/v1/render",
            json!({"document": "name: Ada\n", "template": "{% for %}"}),
        );
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "TEMPLATE_ERROR");
    }
}
