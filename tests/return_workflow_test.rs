mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use regex::Regex;
use serde_json::json;

#[tokio::test]
async fn return_is_created_pending_and_retrievable() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/returns",
            Some(json!({
                "product_name": "Tepung Terigu",
                "quantity": "5",
                "reason": "damaged",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = response_json(response).await["data"].clone();
    assert_eq!(created["status"], "pending");
    assert_eq!(created["quantity"], 5);
    assert!(Regex::new(r"^RET-\d+$")
        .unwrap()
        .is_match(created["return_number"].as_str().unwrap()));

    let id = created["id"].as_str().unwrap();
    let fetched = response_json(
        app.request(Method::GET, &format!("/api/v1/returns/{id}"), None)
            .await,
    )
    .await;
    assert_eq!(fetched["data"], created);

    let listed = response_json(app.request(Method::GET, "/api/v1/returns", None).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_quantity_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/returns",
            Some(json!({
                "product_name": "Tepung Terigu",
                "quantity": "lima",
                "reason": "damaged",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("quantity must be a whole number"));

    let listed = response_json(app.request(Method::GET, "/api/v1/returns", None).await).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn unknown_return_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/returns/6f1c7a4e-1f7b-4c55-9a55-2f8d4c7f0b11",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn simultaneous_returns_get_distinct_numbers() {
    let app = TestApp::new().await;
    let body = || {
        Some(json!({
            "product_name": "Tepung Terigu",
            "quantity": 2,
            "reason": "damaged",
        }))
    };

    for _ in 0..20 {
        let (first, second) = tokio::join!(
            app.request(Method::POST, "/api/v1/returns", body()),
            app.request(Method::POST, "/api/v1/returns", body()),
        );
        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(second.status(), StatusCode::CREATED);
    }

    let listed = response_json(app.request(Method::GET, "/api/v1/returns", None).await).await;
    let mut numbers: Vec<String> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["return_number"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(numbers.len(), 40);
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 40);
}
