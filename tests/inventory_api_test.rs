mod common;

use axum::http::{header, Method, StatusCode};
use common::{response_bytes, response_json, TestApp};
use serde_json::{json, Value};

async fn create_product(app: &TestApp, name: &str, quantity: Value) -> axum::response::Response {
    app.request(
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "name": name,
            "category": "Bahan Pokok",
            "quantity": quantity,
            "price": "8000",
        })),
    )
    .await
}

async fn create_transaction(app: &TestApp, status: Option<&str>, amount: &str) {
    let mut body = json!({
        "product_name": "Minyak Goreng",
        "quantity": 2,
        "amount": amount,
    });
    if let Some(status) = status {
        body["status"] = json!(status);
    }
    let response = app
        .request(Method::POST, "/api/v1/transactions", Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn products_are_listed_newest_first_by_default() {
    let app = TestApp::new().await;
    for name in ["Beras", "Jagung", "Kedelai"] {
        let response = create_product(&app, name, json!(5)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let names = |body: Value| -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    };

    let desc = response_json(app.request(Method::GET, "/api/v1/products", None).await).await;
    let asc = response_json(
        app.request(Method::GET, "/api/v1/products?order=asc", None)
            .await,
    )
    .await;

    let mut reversed = names(asc);
    reversed.reverse();
    assert_eq!(names(desc), reversed);
}

#[tokio::test]
async fn fractional_quantity_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = create_product(&app, "Beras", json!("2.5")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn transaction_board_partitions_by_status() {
    let app = TestApp::new().await;
    create_transaction(&app, None, "10000").await;
    create_transaction(&app, Some("approved"), "25000").await;
    create_transaction(&app, Some("rejected"), "5000").await;

    let board = response_json(
        app.request(Method::GET, "/api/v1/transactions", None)
            .await,
    )
    .await["data"]
        .clone();

    assert_eq!(board["approved"].as_array().unwrap().len(), 1);
    assert_eq!(board["rejected"].as_array().unwrap().len(), 1);
    assert_eq!(board["pending"].as_array().unwrap().len(), 1);
    assert_eq!(board["pending"][0]["status"], "pending");
}

#[tokio::test]
async fn transaction_csv_lists_approved_then_rejected() {
    let app = TestApp::new().await;
    create_transaction(&app, Some("rejected"), "5000").await;
    create_transaction(&app, Some("approved"), "25000").await;
    create_transaction(&app, None, "1000").await;

    let response = app
        .request(Method::GET, "/api/v1/transactions/export/csv", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("transaction-report-"));

    let body = response_bytes(response).await;
    let mut reader = csv::Reader::from_reader(body.as_slice());
    let statuses: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(statuses, vec!["approved", "rejected"]);
}

#[tokio::test]
async fn theme_toggle_round_trips_through_the_api() {
    let app = TestApp::new().await;

    let initial = response_json(app.request(Method::GET, "/api/v1/preferences", None).await).await;
    assert_eq!(initial["data"]["theme"], "light");

    let toggled = response_json(
        app.request(Method::POST, "/api/v1/preferences/theme/toggle", None)
            .await,
    )
    .await;
    assert_eq!(toggled["data"]["theme"], "dark");

    let updated = response_json(
        app.request(
            Method::PUT,
            "/api/v1/preferences",
            Some(json!({ "locale": "en-US" })),
        )
        .await,
    )
    .await;
    assert_eq!(updated["data"]["theme"], "dark");
    assert_eq!(updated["data"]["locale"], "en-US");
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = TestApp::new().await;

    let body = response_json(app.request(Method::GET, "/api/v1/health", None).await).await;
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}
