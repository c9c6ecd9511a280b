mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use common::{Form, TestApp};

fn post_form(category: &str, read_time: &str) -> Form {
    Form::new()
        .text("title", "T")
        .text("excerpt", "E")
        .text("category", category)
        .text("readTime", read_time)
        .file("image", "cover.jpg", b"\xff\xd8\xff jpeg")
}

async fn create(app: &TestApp, token: &str, form: &Form) -> Value {
    let (status, body) = app
        .multipart(Method::POST, "/admin/blogs", Some(token), form)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn verify_requires_a_password() {
    let app = TestApp::new();

    let (status, body) = app.post_json("/admin/verify", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password is required");

    let (status, body) = app
        .post_json("/admin/verify", json!({ "password": "guess" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn verified_admin_creates_post_with_uploaded_image() {
    let app = TestApp::new();
    let token = app.login().await;

    let body = create(&app, &token, &post_form("SEO", "5 min")).await;

    assert_eq!(body["title"], "T");
    assert_eq!(body["excerpt"], "E");
    assert_eq!(body["category"], "SEO");
    assert_eq!(body["readTime"], "5 min");
    assert!(body["_id"].is_string());

    let image = body["image"].as_str().unwrap();
    assert!(image.ends_with(".jpg"));
    let (millis, _) = image.split_once('-').unwrap();
    assert!(millis.parse::<i64>().is_ok());
    assert_eq!(app.uploaded_files(), vec![image.to_string()]);

    let request = Request::builder()
        .uri(format!("/uploads/{image}"))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let served = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&served[..], b"\xff\xd8\xff jpeg");
}

#[tokio::test]
async fn listing_returns_stored_labels_newest_first() {
    let app = TestApp::new();
    let token = app.login().await;

    create(&app, &token, &post_form("Trends", "3 min")).await;
    create(&app, &token, &post_form("SEO", "10 min")).await;

    let (status, body) = app.get("/admin/blogs").await;

    assert_eq!(status, StatusCode::OK);
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["category"], "SEO");
    assert_eq!(posts[0]["readTime"], "10 min");
    assert_eq!(posts[1]["category"], "Trends");
    let created = posts[0]["createdAt"].as_str().unwrap();
    assert!(created.parse::<DateTime<Utc>>().is_ok());
}

#[tokio::test]
async fn read_time_defaults_to_five_minutes() {
    let app = TestApp::new();
    let token = app.login().await;
    let form = Form::new()
        .text("title", "Short")
        .text("excerpt", "Quick read")
        .text("category", "Social Media")
        .file("image", "a.png", b"png");

    let body = create(&app, &token, &form).await;

    assert_eq!(body["readTime"], "5 min");
    assert_eq!(body["category"], "Social Media");
}

#[tokio::test]
async fn invalid_post_is_rejected_and_upload_removed() {
    let app = TestApp::new();
    let token = app.login().await;
    let form = Form::new()
        .text("title", "T")
        .text("excerpt", &"x".repeat(201))
        .text("category", "SEO")
        .file("image", "cover.jpg", b"jpeg");

    let (status, body) = app
        .multipart(Method::POST, "/admin/blogs", Some(&token), &form)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Excerpt cannot be more than 200 characters");
    assert!(app.uploaded_files().is_empty());
    let (_, listed) = app.get("/admin/blogs").await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn missing_image_is_rejected() {
    let app = TestApp::new();
    let token = app.login().await;
    let form = Form::new()
        .text("title", "T")
        .text("excerpt", "E")
        .text("category", "PPC");

    let (status, body) = app
        .multipart(Method::POST, "/admin/blogs", Some(&token), &form)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Featured image URL is required");
}

#[tokio::test]
async fn mutations_require_a_token() {
    let app = TestApp::new();

    let (status, body) = app
        .multipart(Method::POST, "/admin/blogs", None, &post_form("SEO", "5 min"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .multipart(Method::POST, "/admin/blogs", Some("not.a.jwt"), &post_form("SEO", "5 min"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn token_expired_by_a_millisecond_is_rejected_everywhere() {
    let app = TestApp::new();
    let token = app.login().await;
    let post = create(&app, &token, &post_form("SEO", "5 min")).await;
    let uri = format!("/admin/blogs/{}", post["_id"].as_str().unwrap());

    let expired = app
        .gate
        .issue_at(Utc::now() - Duration::hours(2) - Duration::milliseconds(1))
        .unwrap();

    let (status, _) = app
        .multipart(Method::POST, "/admin/blogs", Some(&expired), &post_form("SEO", "5 min"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .multipart(Method::PUT, &uri, Some(&expired), &Form::new().text("title", "New"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.delete(&uri, Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");

    let (_, listed) = app.get("/admin/blogs").await;
    assert_eq!(listed[0]["title"], "T");
}

#[tokio::test]
async fn update_merges_fields_and_revalidates() {
    let app = TestApp::new();
    let token = app.login().await;
    let post = create(&app, &token, &post_form("SEO", "5 min")).await;
    let uri = format!("/admin/blogs/{}", post["_id"].as_str().unwrap());

    let (status, body) = app
        .multipart(
            Method::PUT,
            &uri,
            Some(&token),
            &Form::new().text("title", "Renamed").text("category", "Email"),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["category"], "Email");
    assert_eq!(body["excerpt"], "E");
    assert_eq!(body["image"], post["image"]);
    let created: DateTime<Utc> = body["createdAt"].as_str().unwrap().parse().unwrap();
    let updated: DateTime<Utc> = body["updatedAt"].as_str().unwrap().parse().unwrap();
    assert!(updated >= created);

    let (status, body) = app
        .multipart(Method::PUT, &uri, Some(&token), &Form::new().text("category", "Gossip"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Gossip"));
}

#[tokio::test]
async fn update_with_new_image_replaces_it() {
    let app = TestApp::new();
    let token = app.login().await;
    let post = create(&app, &token, &post_form("SEO", "5 min")).await;
    let uri = format!("/admin/blogs/{}", post["_id"].as_str().unwrap());

    let (status, body) = app
        .multipart(
            Method::PUT,
            &uri,
            Some(&token),
            &Form::new().file("image", "new.webp", b"webp"),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let image = body["image"].as_str().unwrap();
    assert!(image.ends_with(".webp"));
    assert_ne!(body["image"], post["image"]);
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let app = TestApp::new();
    let token = app.login().await;
    let missing = "/admin/blogs/0190c1e4-7a4e-7000-8000-000000000000";

    let (status, body) = app
        .multipart(
            Method::PUT,
            missing,
            Some(&token),
            &Form::new().file("image", "x.png", b"png"),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found");
    assert!(app.uploaded_files().is_empty());

    let (status, _) = app.delete("/admin/blogs/not-an-id", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_the_post() {
    let app = TestApp::new();
    let token = app.login().await;
    let post = create(&app, &token, &post_form("PPC", "7 min")).await;
    let uri = format!("/admin/blogs/{}", post["_id"].as_str().unwrap());

    let (status, body) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Blog deleted" }));

    let (status, body) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found");

    let (_, listed) = app.get("/admin/blogs").await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn image_sent_as_text_is_not_an_upload() {
    let app = TestApp::new();
    let token = app.login().await;
    let form = Form::new()
        .text("title", "T")
        .text("excerpt", "E")
        .text("category", "SEO")
        .text("image", "../../etc/passwd");

    let (status, body) = app
        .multipart(Method::POST, "/admin/blogs", Some(&token), &form)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Featured image URL is required");
    let (_, listed) = app.get("/admin/blogs").await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn non_multipart_body_gets_a_json_error() {
    let app = TestApp::new();
    let token = app.login().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/blogs")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(r#"{"title":"T"}"#))
        .unwrap();

    let (status, body) = common::read_json(app.send(request).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn blank_read_time_on_update_keeps_stored_value() {
    let app = TestApp::new();
    let token = app.login().await;
    let post = create(&app, &token, &post_form("SEO", "10 min")).await;
    let uri = format!("/admin/blogs/{}", post["_id"].as_str().unwrap());

    let (status, body) = app
        .multipart(Method::PUT, &uri, Some(&token), &Form::new().text("readTime", ""))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["readTime"], "10 min");
}
