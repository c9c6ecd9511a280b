mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};

use common::TestApp;

#[tokio::test]
async fn unknown_route_returns_json_not_found() {
    let app = TestApp::new();

    let (status, body) = app.get("/no-such-route").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn wrong_method_returns_json_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/v1/ping")
        .body(Body::empty())
        .unwrap();

    let (status, body) = common::read_json(app.send(request).await).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
}
