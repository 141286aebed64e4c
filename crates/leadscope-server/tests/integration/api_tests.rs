use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::integration::common::{
    body_json, post_json, serve_pages, setup_test_app, setup_test_app_without_browser,
};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["engine"], "http");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/v1/scrape"]["post"].is_object());
}

#[tokio::test]
async fn empty_url_list_returns_400() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/v1/scrape", serde_json::json!({ "urls": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("No URLs provided or invalid format")
    );
}

#[tokio::test]
async fn non_array_urls_returns_400() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/v1/scrape",
            serde_json::json!({ "urls": "https://example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("No URLs provided or invalid format")
    );
}

#[tokio::test]
async fn only_invalid_urls_returns_400() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/v1/scrape",
            serde_json::json!({ "urls": ["not a url", "also bad"], "extractionLevel": "medium" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("No valid URLs provided"));
}

#[tokio::test]
async fn malformed_body_returns_400() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::post("/v1/scrape")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("Invalid request body"));
}

#[tokio::test]
async fn browser_launch_failure_returns_503() {
    let app = setup_test_app_without_browser();

    let response = app
        .oneshot(post_json(
            "/v1/scrape",
            serde_json::json!({ "urls": ["https://example.com"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "session_init_error");
}

const ALPHA: &str = r#"<html><head><title>Alpha Labs | Home</title>
<meta property="og:description" content="Lab equipment for fintech startups"></head>
<body><h1>Alpha Labs</h1><p>Tools for fintech teams. Write to sales@alpha.io or call (555) 123-4567.</p>
<a href="https://www.linkedin.com/company/alpha">LinkedIn</a></body></html>"#;

const BETA: &str = r#"<html><head><title>Beta</title></head>
<body><h1>Beta Inc</h1><p>Nothing to see.</p></body></html>"#;

#[tokio::test]
async fn scrape_returns_report_in_request_order() {
    let base = serve_pages(&[("/alpha", ALPHA), ("/beta", BETA)]).await;
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/v1/scrape",
            serde_json::json!({
                "urls": [format!("{base}alpha"), "not a url", format!("{base}beta")],
                "extractionLevel": "medium",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    for key in ["results", "summary", "extractionLevel", "timestamp"] {
        assert!(keys.contains(&key), "missing {key} in {keys:?}");
    }
    assert_eq!(json["extractionLevel"], "medium");

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let alpha = &results[0];
    assert_eq!(alpha["website"], format!("{base}alpha"));
    assert_eq!(alpha["companyName"], "Alpha Labs");
    assert_eq!(alpha["emails"], serde_json::json!(["sales@alpha.io"]));
    assert_eq!(alpha["phones"], serde_json::json!(["(555) 123-4567"]));
    assert_eq!(alpha["description"], "Lab equipment for fintech startups");
    assert_eq!(alpha["industry"], "fintech");
    assert!(alpha["error"].is_null());

    let beta = &results[1];
    assert_eq!(beta["website"], format!("{base}beta"));
    assert_eq!(beta["companyName"], "Beta Inc");
    assert_eq!(beta["industry"], "Unknown");

    let summary = &json["summary"];
    assert_eq!(summary["totalProcessed"], 2);
    assert_eq!(summary["successful"], 2);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["companiesWithEmails"], 1);
    assert_eq!(summary["companiesWithPhones"], 1);
}
