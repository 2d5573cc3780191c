use axum::http::StatusCode;
use photo_archive::repositories::SearchLogRepository;
use serde_json::Value;

mod common;
use common::*;

fn hit_titles(body: &Value) -> Vec<String> {
    body["page"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["document"]["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_keywords_match_any_field_case_insensitively() {
    let app = create_test_app().await;
    app.seed_document("Harbour at dawn", "Fishing boats", "sea", (1962, 7, 14))
        .await;
    app.seed_document("Town hall", "Mayor on the BALCONY", "civic", (1975, 5, 1))
        .await;
    app.seed_document("Wedding", "Church steps", "family", (1980, 6, 20))
        .await;

    let response = app.get("/search/?query=HARBOUR,%20balcony", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    let mut titles = hit_titles(&body);
    titles.sort();
    assert_eq!(titles, vec!["Harbour at dawn", "Town hall"]);
    assert_eq!(body["documents_count"], 2);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_reasons_follow_field_priority() {
    let app = create_test_app().await;
    app.seed_document("Harbour", "The harbour wall", "harbour, pier", (1962, 7, 14))
        .await;

    let body = extract_json(app.get("/search/?query=harbour,pier", None).await).await;
    let reasons = body["page"]["items"][0]["reasons"].as_array().unwrap();

    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[0]["keyword"], "harbour");
    assert_eq!(reasons[0]["field"], "title");
    assert_eq!(reasons[0]["message"], "Match in title: 'harbour'");
    assert_eq!(reasons[1]["keyword"], "pier");
    assert_eq!(reasons[1]["field"], "keywords");
}

#[tokio::test]
async fn test_date_bounds_are_inclusive() {
    let app = create_test_app().await;
    app.seed_document("Before", "x", "", (1959, 12, 31)).await;
    app.seed_document("First day", "x", "", (1960, 1, 1)).await;
    app.seed_document("Last day", "x", "", (1969, 12, 31)).await;
    app.seed_document("After", "x", "", (1970, 1, 1)).await;

    let body = extract_json(
        app.get("/search/?date_from=1960-01-01&date_to=1969-12-31", None)
            .await,
    )
    .await;

    let mut titles = hit_titles(&body);
    titles.sort();
    assert_eq!(titles, vec!["First day", "Last day"]);
}

#[tokio::test]
async fn test_inactive_documents_never_match() {
    let app = create_test_app().await;
    let hidden = app.seed_document("Harbour", "x", "", (1962, 1, 1)).await;
    app.state.moderation_service.toggle(hidden.id).await.unwrap();

    let body = extract_json(app.get("/search/?query=harbour", None).await).await;
    assert_eq!(body["documents_count"], 0);
    assert_eq!(body["page"]["number"], 1);
    assert_eq!(body["page"]["num_pages"], 1);
}

#[tokio::test]
async fn test_valid_search_is_logged_with_match_count() {
    let app = create_test_app().await;
    app.seed_document("Harbour", "x", "", (1962, 1, 1)).await;

    app.get("/search/?query=Harbour&date_from=1950-01-01", None)
        .await;
    app.get("/search/?query=nothing-matches", None).await;

    let logs = app
        .state
        .search_log_repository
        .list_recent(10)
        .await
        .unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].query, "nothing-matches");
    assert_eq!(logs[0].results_count, 0);
    assert_eq!(logs[1].query, "Harbour");
    assert_eq!(logs[1].results_count, 1);
    assert_eq!(logs[1].date_from, Some(date((1950, 1, 1))));
    assert_eq!(logs[1].date_to, None);
}

#[tokio::test]
async fn test_no_log_without_parameters_or_with_invalid_form() {
    let app = create_test_app().await;
    app.seed_document("Harbour", "x", "", (1962, 1, 1)).await;

    let response = app.get("/search/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response).await["documents_count"], 1);

    let response = app.get("/search/?query=zzz&date_from=yesterday", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["errors"]["date_from"][0], "Enter a valid date.");
    // invalid form: unfiltered listing
    assert_eq!(body["documents_count"], 1);

    let logs = app
        .state
        .search_log_repository
        .list_recent(10)
        .await
        .unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_pagination_clamps_page_numbers() {
    let app = create_test_app().await;
    for i in 0..14 {
        app.seed_document(&format!("Photo {}", i), "x", "", (1990, 1, 1))
            .await;
    }

    let body = extract_json(app.get("/search/?page=2", None).await).await;
    assert_eq!(body["page"]["number"], 2);
    assert_eq!(body["page"]["num_pages"], 2);
    assert_eq!(body["page"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["page"]["has_previous"], true);
    assert_eq!(body["page"]["has_next"], false);

    let body = extract_json(app.get("/search/?page=99", None).await).await;
    assert_eq!(body["page"]["number"], 2);

    let body = extract_json(app.get("/search/?page=99999999999999999999", None).await).await;
    assert_eq!(body["page"]["number"], 2);
    assert_eq!(body["page"]["items"].as_array().unwrap().len(), 2);

    let body = extract_json(app.get("/search/?page=0", None).await).await;
    assert_eq!(body["page"]["number"], 1);

    let body = extract_json(app.get("/search/?page=abc", None).await).await;
    assert_eq!(body["page"]["number"], 1);
    assert_eq!(body["page"]["items"].as_array().unwrap().len(), 12);
}
