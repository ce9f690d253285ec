use axum::{
    body::{to_bytes, Body},
    extract::Query,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use favicon_aggregator::{router, AppState, FaviconSource, ReqwestIconFetcher};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

const ICO: &[u8] = &[0, 0, 1, 0, 1, 0];
const PNG: &[u8] = &[0x89, b'P', b'N', b'G'];

/// Stand-ins for the five upstream providers.
async fn spawn_providers() -> SocketAddr {
    let providers = Router::new()
        .route(
            "/direct/{domain}/favicon.ico",
            get(|| async { ([("content-type", "image/x-icon")], ICO) }),
        )
        .route(
            "/ddg/{file}",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        )
        .route(
            "/google",
            get(|params: Query<HashMap<String, String>>| async move {
                if params.get("domain").map(String::as_str) == Some("https://example.com/page")
                    && params.get("sz").map(String::as_str) == Some("64")
                {
                    ([("content-type", "image/png")], PNG).into_response()
                } else {
                    StatusCode::BAD_REQUEST.into_response()
                }
            }),
        )
        .route(
            "/horse/{domain}",
            get(|| async { ([("content-type", "text/html")], "<html>icon horse</html>") }),
        )
        .route(
            "/kit/{domain}/{size}",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                ([("content-type", "image/png")], PNG)
            }),
        )
        .route(
            "/broken/{domain}",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, providers).await.unwrap();
    });
    addr
}

fn local_sources(addr: SocketAddr) -> Vec<FaviconSource> {
    vec![
        FaviconSource::new(
            "Direct Favicon",
            format!("http://{addr}/direct/{{domain}}/favicon.ico"),
        ),
        FaviconSource::new("DuckDuckGo", format!("http://{addr}/ddg/{{domain}}.ico")),
        FaviconSource::new(
            "Google",
            format!("http://{addr}/google?domain={{url}}&sz={{size}}"),
        ),
        FaviconSource::new("Icon Horse", format!("http://{addr}/horse/{{domain}}")),
        FaviconSource::new(
            "FaviconKit",
            format!("http://{addr}/kit/{{domain}}/{{size}}"),
        ),
    ]
}

fn app(sources: Vec<FaviconSource>) -> Router {
    let fetcher = ReqwestIconFetcher::new(Duration::from_millis(500), "IntegrationTest/1.0").unwrap();
    router(AppState::with_sources(Arc::new(fetcher), sources))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_mixed_providers() {
    let addr = spawn_providers().await;

    let started = Instant::now();
    let (status, body) = get_json(
        app(local_sources(addr)),
        "/favicons?url=https%3A%2F%2Fexample.com%2Fpage&size=64",
    )
    .await;

    // The slow provider is cut off by the fetch timeout, not waited out
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "source": "Direct Favicon", "icon": "data:image/x-icon;base64,AAABAAEA" },
            { "source": "Google", "icon": "data:image/png;base64,iVBORw==" },
        ])
    );
}

#[tokio::test]
async fn test_every_provider_fails() {
    let addr = spawn_providers().await;
    let sources = vec![
        FaviconSource::new("DuckDuckGo", format!("http://{addr}/ddg/{{domain}}.ico")),
        FaviconSource::new("Icon Horse", format!("http://{addr}/horse/{{domain}}")),
        FaviconSource::new("Broken", format!("http://{addr}/broken/{{domain}}")),
    ];

    let (status, body) =
        get_json(app(sources), "/favicons?url=https://example.com&size=32").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No favicons found" }));
}

#[tokio::test]
async fn test_scheme_less_url() {
    let addr = spawn_providers().await;
    let sources = vec![FaviconSource::new(
        "Direct Favicon",
        format!("http://{addr}/direct/{{domain}}/favicon.ico"),
    )];

    let (status, body) = get_json(app(sources), "/favicons?url=example.com&size=32").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["source"], "Direct Favicon");
}

#[tokio::test]
async fn test_missing_size() {
    let addr = spawn_providers().await;

    let (status, body) = get_json(
        app(local_sources(addr)),
        "/favicons?url=https://example.com",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "URL and size parameters are required" }));
}
