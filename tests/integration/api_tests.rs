//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Register a visitor and return the created visit
async fn register(client: &Client, full_name: &str, card: Option<&str>) -> Value {
    let response = client
        .post(format!("{}/visits", BASE_URL))
        .json(&json!({
            "full_name": full_name,
            "phone_number": "08123456789",
            "rfid_card_id": card,
            "address": "PT. Maju Mundur",
            "meeting_with": "Pak Manager",
            "purpose": "Integration test"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse visit")
}

async fn remove(client: &Client, id: &Value) {
    let _ = client
        .delete(format!("{}/visits/{}", BASE_URL, id))
        .send()
        .await;
}

fn unique_card() -> String {
    format!(
        "it-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos()
    )
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_register_and_conflicting_card() {
    let client = Client::new();
    let card = unique_card();
    let visit = register(&client, "Budi Santoso", Some(&card)).await;
    assert_eq!(visit["status"], "checked_in");

    let response = client
        .post(format!("{}/visits", BASE_URL))
        .json(&json!({
            "full_name": "Siti Aminah",
            "phone_number": "08198765432",
            "rfid_card_id": card,
            "meeting_with": "HRD",
            "purpose": "Interview"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"].as_str().unwrap_or_default().contains("Budi Santoso"));

    remove(&client, &visit["id"]).await;
}

#[tokio::test]
#[ignore]
async fn test_scan_checks_out_then_refuses() {
    let client = Client::new();
    let card = unique_card();
    let visit = register(&client, "Budi Santoso", Some(&card)).await;

    let response = client
        .post(format!("{}/scan/rfid", BASE_URL))
        .json(&json!({ "rfid": card }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["visit"]["status"], "checked_out");

    let response = client
        .post(format!("{}/scan/rfid", BASE_URL))
        .json(&json!({ "rfid": card }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    remove(&client, &visit["id"]).await;
}

#[tokio::test]
#[ignore]
async fn test_scan_unknown_card() {
    let client = Client::new();

    let response = client
        .post(format!("{}/scan/rfid", BASE_URL))
        .json(&json!({ "rfid": unique_card() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_list_visits_by_status() {
    let client = Client::new();
    let visit = register(&client, "Status Filter", None).await;

    let response = client
        .get(format!("{}/visits?status=checked_in&search=status filter", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let visits = body.as_array().expect("Expected an array");
    assert!(visits.iter().all(|v| v["status"] == "checked_in"));
    assert!(visits.iter().any(|v| v["id"] == visit["id"]));

    remove(&client, &visit["id"]).await;
}

#[tokio::test]
#[ignore]
async fn test_checkout_and_delete_visit() {
    let client = Client::new();
    let visit = register(&client, "Checkout Test", None).await;

    let response = client
        .post(format!("{}/visits/{}/checkout", BASE_URL, visit["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "checked_out");
    assert!(body["check_out_time"].is_string());

    let response = client
        .delete(format!("{}/visits/{}", BASE_URL, visit["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/visits/{}", BASE_URL, visit["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_backup_download() {
    let client = Client::new();

    let response = client
        .get(format!("{}/backup", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("backup.json"));

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}
