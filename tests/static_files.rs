//! Request handling through the full middleware stack, without TLS.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

mod common;

use common::{Site, INDEX_HTML, SECRET};

async fn send(router: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn get_returns_exact_file_bytes() {
    let site = Site::new();
    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    site.write("blob.bin", &payload);
    let router = site.router().await;

    let response = send(&router, Method::GET, "/blob.bin").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "70000");
    assert_eq!(body_bytes(response).await, payload);

    let response = send(&router, Method::GET, "/assets/model.glb").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await,
        vec![0x67u8, 0x6c, 0x54, 0x46, 0, 1, 2, 255]
    );
}

#[tokio::test]
async fn nested_file_has_inferred_content_type() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/CANNON/js/main.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("javascript"));
    assert_eq!(body_bytes(response).await, b"console.log('cannon');");
}

#[tokio::test]
async fn root_serves_index_document() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    assert_eq!(body_bytes(response).await, INDEX_HTML.as_bytes());
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/missing.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("404 Not Found"));
}

#[tokio::test]
async fn traversal_never_leaks_outside_content() {
    let site = Site::new();
    let router = site.router().await;

    for uri in [
        "/../outside.txt",
        "/CANNON/../../outside.txt",
        "/%2e%2e/outside.txt",
        "/CANNON/js/%2E%2E/%2E%2E/%2E%2E/outside.txt",
    ] {
        let response = send(&router, Method::GET, uri).await;
        let status = response.status();
        assert!(
            status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND,
            "{uri} returned {status}"
        );
        let body = String::from_utf8_lossy(&body_bytes(response).await).into_owned();
        assert!(!body.contains(SECRET), "{uri} leaked outside content");
    }
}

#[tokio::test]
async fn dot_segments_inside_root_resolve() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/CANNON/./js/../js/main.js").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn head_sends_headers_without_body() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::HEAD, "/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        INDEX_HTML.len().to_string().as_str()
    );
    assert!(response.headers().contains_key(header::LAST_MODIFIED));
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn directory_without_slash_redirects() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/CANNON").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/CANNON/");
}

#[tokio::test]
async fn directory_redirect_never_points_at_another_host() {
    let site = Site::new();
    let router = site.router().await;

    for (uri, expected) in [
        ("//evil.example/..", "/evil.example/../"),
        ("//evil.example/%2e%2e?x=1", "/evil.example/%2e%2e/?x=1"),
        ("////CANNON", "/CANNON/"),
    ] {
        let response = send(&router, Method::GET, uri).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, expected, "{uri}");
        assert!(!location.starts_with("//"), "{uri} redirected off-host");
    }
}

#[tokio::test]
async fn directory_without_index_is_listed() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/assets/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("Directory listing for /assets/"));
    assert!(body.contains("<a href=\"model.glb\">model.glb</a>"));
}

#[tokio::test]
async fn listing_can_be_disabled() {
    let site = Site::new();
    let files = lan_https_serve::http::FileServer::new(&lan_https_serve::config::FilesConfig {
        directory_listing: false,
        ..site.files_config()
    })
    .await
    .unwrap();
    let router = lan_https_serve::http::build_router(files, &Default::default());

    let response = send(&router, Method::GET, "/assets/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let site = Site::new();
    let router = site.router().await;

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let response = send(&router, method.clone(), "/index.html").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");
    }
}

#[tokio::test]
async fn fresh_if_modified_since_is_not_modified() {
    let site = Site::new();
    let router = site.router().await;

    let first = send(&router, Method::GET, "/index.html").await;
    let last_modified = first.headers()[header::LAST_MODIFIED].clone();

    let request = Request::builder()
        .uri("/index.html")
        .header(header::IF_MODIFIED_SINCE, last_modified)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(body_bytes(response).await.is_empty());

    let request = Request::builder()
        .uri("/index.html")
        .header(header::IF_MODIFIED_SINCE, "Thu, 01 Jan 1998 00:00:00 GMT")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn repeated_gets_are_identical() {
    let site = Site::new();
    let router = site.router().await;

    let mut seen = Vec::new();
    for _ in 0..5 {
        let response = send(&router, Method::GET, "/CANNON/js/main.js").await;
        seen.push((response.status(), body_bytes(response).await));
    }
    assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn concurrent_requests_get_their_own_bodies() {
    let site = Site::new();
    for i in 0..32 {
        site.write(&format!("file-{i}.txt"), format!("contents of file {i}").repeat(100));
    }
    let router = site.router().await;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let response = send(&router, Method::GET, &format!("/file-{i}.txt")).await;
                (i, response.status(), body_bytes(response).await)
            })
        })
        .collect();

    for task in tasks {
        let (i, status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("contents of file {i}").repeat(100).into_bytes());
    }
}

#[tokio::test]
async fn responses_carry_request_id_and_nosniff() {
    let site = Site::new();
    let router = site.router().await;

    let response = send(&router, Method::GET, "/missing.txt").await;
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
