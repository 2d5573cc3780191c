#![allow(dead_code)] // each test binary uses a different subset

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use image::{ImageFormat, Rgba, RgbaImage};
use photo_archive::{
    config::Settings,
    create_router,
    forms::{UploadedFile, ValidatedDocument},
    models::{Document, DocumentType},
    AppState,
};
use serde_json::Value;
use std::io::Cursor;
use tempfile::TempDir;
use tower::ServiceExt;

pub const STAFF_USER: (&str, &str) = ("curator", "curator-password");
pub const REGULAR_USER: (&str, &str) = ("visitor", "visitor-password");

/// Router and state on the in-memory store; blobs live in a temporary media root.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub media: TempDir,
}

/// Create a test application instance with in-memory store
pub async fn create_test_app() -> TestApp {
    let media = TempDir::new().unwrap();
    let settings = Settings::for_tests(media.path().to_str().unwrap());

    let state = AppState::new(settings)
        .await
        .expect("Failed to create test app state");

    state
        .auth_service
        .create_user(STAFF_USER.0, STAFF_USER.1, true, false)
        .await
        .unwrap();
    state
        .auth_service
        .create_user(REGULAR_USER.0, REGULAR_USER.1, false, false)
        .await
        .unwrap();

    TestApp {
        router: create_router(state.clone()),
        state,
        media,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Logs in and returns the `name=value` pair of the session cookie.
    pub async fn login(&self, user: (&str, &str)) -> String {
        let body = format!("username={}&password={}", user.0, user.1);
        let response = self.post_form("/auth/login/", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login did not set a session cookie")
    }

    pub async fn upload(&self, form: MultipartBody, cookie: &str) -> Response {
        let (content_type, body) = form.build();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/document/add/")
            .header(header::CONTENT_TYPE, content_type)
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Inserts a document through the service, bypassing HTTP.
    pub async fn seed_document(
        &self,
        title: &str,
        description: &str,
        keywords: &str,
        original_date: (i32, u32, u32),
    ) -> Document {
        self.state
            .document_service
            .create(ValidatedDocument {
                title: title.to_string(),
                description: description.to_string(),
                original_date: date(original_date),
                document_type: DocumentType::Photo,
                keywords: keywords.to_string(),
                file: UploadedFile {
                    file_name: "photo.png".to_string(),
                    bytes: Bytes::from(png_fixture(40, 30)),
                },
            })
            .await
            .unwrap()
    }

    pub fn blob_exists(&self, key: &str) -> bool {
        self.media.path().join(key).is_file()
    }
}

pub fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Helper to extract response body as bytes
pub async fn extract_body(response: Response) -> Vec<u8> {
    let body = to_bytes(response.into_body(), 16 * 1024 * 1024).await.unwrap();
    body.to_vec()
}

pub async fn extract_json(response: Response) -> Value {
    serde_json::from_slice(&extract_body(response).await).unwrap()
}

/// Opaque red PNG with a transparent left column, so both decode paths are hit.
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| {
        if x == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([200, 30, 30, 255])
        }
    });
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Minimal multipart/form-data encoder.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("----archive-test-{}", uuid::Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    /// A valid photo submission with the given title.
    pub fn photo(title: &str) -> Self {
        Self::new()
            .text("title", title)
            .text("description", "Harbour at dawn")
            .text("original_date", "1962-07-14")
            .text("document_type", "photo")
            .text("keywords", "harbour, boats")
            .file("document_file", "harbour.png", &png_fixture(800, 400))
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
