//! Redirect integration tests
//!
//! These verify the redirect path: atomic click counting, visit
//! recording, and correct handling of unknown codes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use curtail::redirect;
use curtail::storage::{SqliteStorage, Storage};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::{Layer, ServiceExt};

/// Helper to create test storage
async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

/// Helper layer to inject ConnectInfo for tests
#[derive(Clone)]
struct TestConnectInfoLayer;

impl<S> Layer<S> for TestConnectInfoLayer {
    type Service = TestConnectInfoMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TestConnectInfoMiddleware { inner }
    }
}

#[derive(Clone)]
struct TestConnectInfoMiddleware<S> {
    inner: S,
}

impl<S, B> tower::Service<Request<B>> for TestConnectInfoMiddleware<S>
where
    S: tower::Service<Request<B>> + Clone,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let addr = SocketAddr::from(([127, 0, 0, 1], 12345));
        req.extensions_mut()
            .insert(axum::extract::connect_info::ConnectInfo(addr));

        self.inner.call(req)
    }
}

#[tokio::test]
async fn test_redirect_known_code() {
    let storage = create_test_storage().await;

    storage
        .create(
            "redirect_test",
            "https://example.com/destination",
            "http://localhost:8080/redirect_test",
        )
        .await
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone()).layer(TestConnectInfoLayer);

    let request = Request::builder()
        .uri("/redirect_test")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.status(),
        StatusCode::FOUND,
        "Should return 302 Found, got: {}",
        response.status()
    );
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://example.com/destination"
    );

    // Counter increments synchronously, visit append is fire-and-forget
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    let link = storage.find_by_code("redirect_test").await.unwrap().unwrap();
    assert_eq!(link.clicks, 1);
    let visits = storage.visits_for_code("redirect_test").await.unwrap();
    assert_eq!(visits.len(), 1);
}

#[tokio::test]
async fn test_redirect_unknown_code_records_nothing() {
    let storage = create_test_storage().await;
    let app = redirect::create_redirect_router(storage.clone()).layer(TestConnectInfoLayer);

    let request = Request::builder()
        .uri("/nonexistent")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    let visits = storage.visits_for_code("nonexistent").await.unwrap();
    assert!(visits.is_empty(), "No visit should be recorded for a 404");
}

#[tokio::test]
async fn test_redirect_captures_request_metadata() {
    let storage = create_test_storage().await;

    storage
        .create("meta", "https://example.com", "http://localhost:8080/meta")
        .await
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone()).layer(TestConnectInfoLayer);

    let request = Request::builder()
        .uri("/meta")
        .header("user-agent", "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0)")
        .header("referer", "https://news.ycombinator.com/")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    let visits = storage.visits_for_code("meta").await.unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(
        visits[0].user_agent.as_deref(),
        Some("Mozilla/5.0 (iPhone; CPU iPhone OS 16_0)")
    );
    assert_eq!(
        visits[0].referrer.as_deref(),
        Some("https://news.ycombinator.com/")
    );
}

#[tokio::test]
async fn test_redirect_without_headers_uses_socket_ip() {
    let storage = create_test_storage().await;

    storage
        .create("bare", "https://example.com", "http://localhost:8080/bare")
        .await
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone()).layer(TestConnectInfoLayer);

    let request = Request::builder().uri("/bare").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    let visits = storage.visits_for_code("bare").await.unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].ip_address.as_deref(), Some("127.0.0.1"));
    assert!(visits[0].user_agent.is_none());
    assert!(visits[0].referrer.is_none());
}

#[tokio::test]
async fn test_concurrent_redirects_count_every_click() {
    let storage = create_test_storage().await;

    storage
        .create("popular", "https://example.com", "http://localhost:8080/popular")
        .await
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone()).layer(TestConnectInfoLayer);

    let mut handles = vec![];

    for _ in 0..100 {
        let app_clone = app.clone();
        let handle = tokio::spawn(async move {
            let request = Request::builder()
                .uri("/popular")
                .body(Body::empty())
                .unwrap();

            app_clone.oneshot(request).await
        });
        handles.push(handle);
    }

    let mut success_count = 0;

    for handle in handles {
        if let Ok(Ok(response)) = handle.await {
            if response.status() == StatusCode::FOUND {
                success_count += 1;
            }
        }
    }

    assert_eq!(success_count, 100, "All 100 redirects should succeed");

    let link = storage.find_by_code("popular").await.unwrap().unwrap();
    assert_eq!(link.clicks, 100, "No click increment may be lost");

    // Visit appends are fire-and-forget; give them a moment to land
    tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;
    let visits = storage.visits_for_code("popular").await.unwrap();
    assert_eq!(visits.len(), 100);
}

#[tokio::test]
async fn test_two_concurrent_redirects_scenario() {
    // Encode-then-redirect-twice scenario: clicks == 2 and two visit
    // records exist afterwards.
    let storage = create_test_storage().await;

    storage
        .create("c1", "https://example.com/a", "http://localhost:8080/c1")
        .await
        .unwrap();

    let app = redirect::create_redirect_router(storage.clone()).layer(TestConnectInfoLayer);

    let first = tokio::spawn({
        let app = app.clone();
        async move {
            let request = Request::builder().uri("/c1").body(Body::empty()).unwrap();
            app.oneshot(request).await
        }
    });
    let second = tokio::spawn({
        let app = app.clone();
        async move {
            let request = Request::builder().uri("/c1").body(Body::empty()).unwrap();
            app.oneshot(request).await
        }
    });

    assert_eq!(first.await.unwrap().unwrap().status(), StatusCode::FOUND);
    assert_eq!(second.await.unwrap().unwrap().status(), StatusCode::FOUND);

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let link = storage.find_by_code("c1").await.unwrap().unwrap();
    assert_eq!(link.clicks, 2);

    let visits = storage.visits_for_code("c1").await.unwrap();
    assert_eq!(visits.len(), 2);
}

#[tokio::test]
async fn test_health_check() {
    let storage = create_test_storage().await;
    let app = redirect::create_redirect_router(storage).layer(TestConnectInfoLayer);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
