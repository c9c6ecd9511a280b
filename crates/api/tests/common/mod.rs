#![allow(dead_code)]

use std::sync::Arc;

use agency_api::uploads::UploadStore;
use agency_api::{app, AppState, Collaborators};
use agency_core::auth::AdminGate;
use agency_core::notify::{MailSettings, TemplateRenderer};
use agency_core::store::MemoryStore;
use agency_core::testing::{FakeCalendar, RecordingMailer};
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "correct horse";
pub const OPERATOR: &str = "owner@agency.test";
const SECRET: &str = "test-signing-secret";
const BOUNDARY: &str = "agency-test-boundary";
const MAX_BODY: usize = 1024 * 1024;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub calendar: Arc<FakeCalendar>,
    pub mailer: Arc<RecordingMailer>,
    pub gate: AdminGate,
    pub uploads: TempDir,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(FakeCalendar::new(), RecordingMailer::new())
    }

    pub fn with(calendar: FakeCalendar, mailer: RecordingMailer) -> Self {
        let store = Arc::new(MemoryStore::new());
        let calendar = Arc::new(calendar);
        let mailer = Arc::new(mailer);
        let gate = AdminGate::new(ADMIN_PASSWORD, SECRET);
        let uploads = tempfile::tempdir().unwrap();

        let state = AppState::new(Collaborators {
            store: store.clone(),
            calendar: calendar.clone(),
            mailer: mailer.clone(),
            templates: Arc::new(TemplateRenderer::new().unwrap()),
            mail: MailSettings {
                sender_address: "relay@agency.test".into(),
                operator_address: OPERATOR.into(),
            },
            timezone: chrono_tz::Tz::UTC,
            gate: gate.clone(),
            uploads: UploadStore::new(uploads.path()),
        });

        Self {
            store,
            calendar,
            mailer,
            gate,
            uploads,
            router: app(state, MAX_BODY),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        read_json(self.send(request).await).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        read_json(self.send(request).await).await
    }

    /// Exchange the admin password for a token through the API.
    pub async fn login(&self) -> String {
        let (status, body) = self
            .post_json("/admin/verify", serde_json::json!({ "password": ADMIN_PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        form: &Form,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(form.encode())).unwrap();
        read_json(self.send(request).await).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::DELETE).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        read_json(self.send(builder.body(Body::empty()).unwrap()).await).await
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.uploads.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// A `multipart/form-data` body.
#[derive(Default)]
pub struct Form {
    parts: Vec<(String, Option<String>, Vec<u8>)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts
            .push((name.to_string(), None, value.as_bytes().to_vec()));
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.parts
            .push((name.to_string(), Some(file_name.to_string()), data.to_vec()));
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, file_name, data) in &self.parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                }
            }
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }
}
