use std::time::Duration;

use axum::http::{Method, StatusCode};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{create_url_handler, delete_url_handler, health_handler, redirect_handler};
use crate::state::AppState;

/// Single-segment paths served by the router itself. A short code with one
/// of these names could never be redirected to.
pub const RESERVED_CODES: &[&str] = &["health"];

pub struct App {}

impl App {
    pub fn router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/api/url", post(create_url_handler))
            .route("/api/url/", post(create_url_handler))
            .route("/api/url/{code}", delete(delete_url_handler))
            .route("/{code}", get(redirect_handler))
            .route("/{code}/", get(redirect_handler))
            .layer(cors())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            ))
            .with_state(state)
    }
}

/// Any origin may call the API from a browser.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, Response};
    use burrow_cache::MokaUrlCache;
    use burrow_core::{ShortCode, StorageError};
    use burrow_generator::RandomGenerator;
    use burrow_shortener::{
        CreatedUrl, ShortenParams, Shortener, ShortenerConfig, ShortenerError, ShortenerService,
    };
    use burrow_storage::InMemoryRepository;
    use jiff::{SignedDuration, Timestamp};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BASE_URL: &str = "http://localhost:8080";

    fn router() -> Router {
        let service = ShortenerService::new(
            InMemoryRepository::new(),
            MokaUrlCache::new(),
            RandomGenerator::new(6).unwrap(),
            ShortenerConfig::builder()
                .base_url(BASE_URL)
                .reserved_codes(RESERVED_CODES)
                .build(),
        );
        router_with(Arc::new(service))
    }

    fn router_with(shortener: Arc<dyn Shortener>) -> Router {
        App::router(AppState::new(shortener), Duration::from_secs(5))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn health() {
        let response = router()
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn create_then_redirect() {
        let app = router();
        let before = Timestamp::now();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/url",
                json!({"original_url": "https://example.com/some/path"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        let short_url = body["short_url"].as_str().unwrap();
        let code = short_url.strip_prefix("http://localhost:8080/").unwrap();
        assert_eq!(code.len(), 6);

        let expire_at: Timestamp = body["expire_at"].as_str().unwrap().parse().unwrap();
        let lifetime = expire_at.duration_since(before);
        assert!(lifetime >= SignedDuration::from_hours(24));
        assert!(lifetime < SignedDuration::from_hours(24) + SignedDuration::from_secs(5));

        let response = app
            .oneshot(request(Method::GET, &format!("/{code}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "https://example.com/some/path");
    }

    #[tokio::test]
    async fn trailing_slashes_are_accepted() {
        let app = router();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/url/",
                json!({"original_url": "https://example.com", "custom_code": "slash1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(request(Method::GET, "/slash1/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "https://example.com");
    }

    #[tokio::test]
    async fn create_with_custom_code_and_duration() {
        let before = Timestamp::now();

        let response = router()
            .oneshot(post_json(
                "/api/url",
                json!({
                    "original_url": "https://example.com",
                    "custom_code": "mine42",
                    "duration": 2
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["short_url"], "http://localhost:8080/mine42");
        let expire_at: Timestamp = body["expire_at"].as_str().unwrap().parse().unwrap();
        let lifetime = expire_at.duration_since(before);
        assert!(lifetime >= SignedDuration::from_hours(2));
        assert!(lifetime < SignedDuration::from_hours(2) + SignedDuration::from_secs(5));
    }

    #[tokio::test]
    async fn duplicate_custom_code_conflicts() {
        let app = router();
        let body = json!({"original_url": "https://first.example", "custom_code": "dupe1"});

        let response = app
            .clone()
            .oneshot(post_json("/api/url", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/url",
                json!({"original_url": "https://second.example", "custom_code": "dupe1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "conflict");

        let response = app
            .oneshot(request(Method::GET, "/dupe1"))
            .await
            .unwrap();
        assert_eq!(location(&response), "https://first.example");
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let cases = [
            json!({"original_url": "not a url"}),
            json!({"original_url": "https://example.com", "custom_code": "abc"}),
            json!({"original_url": "https://example.com", "custom_code": "has-dash"}),
            json!({"original_url": "https://example.com", "duration": 0}),
            json!({"original_url": "https://example.com", "duration": 101}),
            json!({"custom_code": "abcd"}),
        ];

        for body in cases {
            let response = router()
                .oneshot(post_json("/api/url", body.clone()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(
                json_body(response).await["error"]["code"],
                "validation_error"
            );
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/url")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        for uri in ["/zzzzzz", "/ab", "/no-such-code"] {
            let response = router()
                .oneshot(request(Method::GET, uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
            assert_eq!(json_body(response).await["error"]["code"], "not_found");
        }
    }

    #[tokio::test]
    async fn delete_then_redirect_is_not_found() {
        let app = router();
        app.clone()
            .oneshot(post_json(
                "/api/url",
                json!({"original_url": "https://example.com", "custom_code": "bye123"}),
            ))
            .await
            .unwrap();

        // Warm the cache.
        let response = app
            .clone()
            .oneshot(request(Method::GET, "/bye123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/api/url/bye123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/bye123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request(Method::DELETE, "/api/url/bye123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reserved_route_names_cannot_be_claimed() {
        let app = router();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/url",
                json!({"original_url": "https://example.com", "custom_code": "health"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "conflict");

        let response = app
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn responses_allow_any_origin() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn answers_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/url")
            .header(header::ORIGIN, "https://app.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap();
        assert!(allowed.contains("POST"));
        assert!(allowed.contains("GET"));
    }

    /// Fails every call with a storage error.
    struct BrokenShortener;

    #[async_trait]
    impl Shortener for BrokenShortener {
        async fn shorten(&self, _params: ShortenParams) -> Result<CreatedUrl, ShortenerError> {
            Err(StorageError::Unavailable("connection refused".into()).into())
        }

        async fn resolve(&self, _code: &ShortCode) -> Result<String, ShortenerError> {
            Err(StorageError::Timeout("query took too long".into()).into())
        }

        async fn delete(&self, _code: &ShortCode) -> Result<(), ShortenerError> {
            Err(ShortenerError::AllocationExhausted { attempts: 5 })
        }
    }

    #[tokio::test]
    async fn dependency_failures_are_internal_errors() {
        let app = router_with(Arc::new(BrokenShortener));

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/url",
                json!({"original_url": "https://example.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "internal_error");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/abcdef"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app
            .oneshot(request(Method::DELETE, "/api/url/abcdef"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
