use axum::http::{header, StatusCode};

mod common;
use common::*;

#[tokio::test]
async fn test_upload_requires_login() {
    let app = create_test_app().await;

    let response = app.get("/document/add/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/auth/login/?next=%2Fdocument%2Fadd%2F"
    );
}

#[tokio::test]
async fn test_add_form_lists_type_choices() {
    let app = create_test_app().await;
    let cookie = app.login(REGULAR_USER).await;

    let response = app.get("/document/add/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    let fields = body["fields"].as_array().unwrap();
    let select = fields
        .iter()
        .find(|f| f["name"] == "document_type")
        .unwrap();
    let values: Vec<&str> = select["choices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["photo", "scan", "multipage"]);
}

#[tokio::test]
async fn test_upload_creates_document_with_thumbnail() {
    let app = create_test_app().await;
    let cookie = app.login(REGULAR_USER).await;

    let response = app.upload(MultipartBody::photo("Harbour 1962"), &cookie).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let detail_path = location(&response).to_string();
    let created = extract_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(detail_path, format!("/document/{}/", id));
    assert_eq!(created["title"], "Harbour 1962");
    assert_eq!(created["is_active"], true);
    assert_eq!(created["keywords_list"][1], "boats");

    let thumbnail_url = created["thumbnail_url"].as_str().unwrap().to_string();
    assert!(thumbnail_url.starts_with("/media/thumbnails/thumb_"));
    assert!(thumbnail_url.ends_with(".jpg"));

    let detail = app.get(&detail_path, None).await;
    assert_eq!(detail.status(), StatusCode::OK);
    assert_eq!(extract_json(detail).await["id"], id);

    let thumbnail = app.get(&thumbnail_url, None).await;
    assert_eq!(thumbnail.status(), StatusCode::OK);
    assert_eq!(thumbnail.headers()[header::CONTENT_TYPE], "image/jpeg");
    let bytes = extract_body(thumbnail).await;
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 100));
}

#[tokio::test]
async fn test_non_image_upload_has_no_thumbnail() {
    let app = create_test_app().await;
    let cookie = app.login(REGULAR_USER).await;

    let form = MultipartBody::new()
        .text("title", "Parish register")
        .text("description", "Scanned ledger")
        .text("original_date", "1901-03-02")
        .text("document_type", "multipage")
        .file("document_file", "register.pdf", b"%PDF-1.4 not really");

    let response = app.upload(form, &cookie).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = extract_json(response).await;
    assert!(created["thumbnail_url"].is_null());
    assert_eq!(created["document_type"], "multipage");
    assert!(created["file_name"].as_str().unwrap().ends_with(".pdf"));
}

#[tokio::test]
async fn test_corrupt_image_still_uploads() {
    let app = create_test_app().await;
    let cookie = app.login(REGULAR_USER).await;

    let form = MultipartBody::new()
        .text("title", "Broken")
        .text("description", "Truncated file")
        .text("original_date", "1950-01-01")
        .text("document_type", "photo")
        .file("document_file", "broken.jpg", b"\xff\xd8\xff garbage");

    let response = app.upload(form, &cookie).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(extract_json(response).await["thumbnail_url"].is_null());
}

#[tokio::test]
async fn test_upload_reports_every_invalid_field() {
    let app = create_test_app().await;
    let cookie = app.login(REGULAR_USER).await;

    let form = MultipartBody::new()
        .text("title", "")
        .text("original_date", "14/07/1962")
        .text("document_type", "painting");

    let response = app.upload(form, &cookie).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = body["error"]["fields"].as_object().unwrap();
    for name in [
        "title",
        "description",
        "original_date",
        "document_type",
        "document_file",
    ] {
        assert!(fields.contains_key(name), "missing error for {}", name);
    }
    assert!(!fields.contains_key("keywords"));

    let listed = app.state.document_service.recent(10).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_detail_unknown_and_inactive_are_not_found() {
    let app = create_test_app().await;

    let response = app.get("/document/999/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/document/abc/", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(extract_json(response).await["error"]["code"], "NOT_FOUND");

    let document = app
        .seed_document("Hidden", "Not public", "", (1970, 1, 1))
        .await;
    app.state.moderation_service.toggle(document.id).await.unwrap();

    let response = app.get(&document.detail_url(), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_lists_recent_active_documents() {
    let app = create_test_app().await;

    let mut ids = Vec::new();
    for i in 0..10 {
        let doc = app
            .seed_document(&format!("Photo {}", i), "Street scene", "", (1980, 1, 1))
            .await;
        ids.push(doc.id);
    }
    app.state.moderation_service.toggle(ids[9]).await.unwrap();

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    let recent: Vec<i64> = body["recent_documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();

    assert_eq!(recent.len(), 8);
    assert!(!recent.contains(&ids[9]));
    assert_eq!(recent[0], ids[8]);
}

#[tokio::test]
async fn test_thumbnail_route_rejects_traversal() {
    let app = create_test_app().await;

    let response = app.get("/media/thumbnails/..", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/media/thumbnails/missing.jpg", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = create_test_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
