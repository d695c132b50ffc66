//! API integration tests against a running server
//!
//! Start the server with the default seed fleet and admin credentials, then
//! run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000/api";

/// Helper to get an admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "change-this-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
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
async fn test_login() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    assert!(!token.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_cars() {
    let client = Client::new();

    let response = client
        .get(format!("{}/cars", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_list_bookings_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/bookings", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_overlapping_approved_booking_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let booking = json!({
        "carId": 3,
        "userName": "Integration",
        "userEmail": "integration@example.com",
        "startDate": "2031-01-10",
        "endDate": "2031-01-12"
    });

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&booking)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["booking"]["id"].as_str().expect("No booking id").to_string();

    let response = client
        .patch(format!("{}/bookings/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "status": "Approved" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&booking)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Clean up
    let response = client
        .delete(format!("{}/bookings/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

/// Helper to request car 3 over a date range
async fn book_mustang(client: &Client, start: &str, end: &str) -> reqwest::Response {
    client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "carId": 3,
            "userName": "Integration",
            "userEmail": "integration@example.com",
            "startDate": start,
            "endDate": end
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn set_status(client: &Client, token: &str, id: &str, status: &str) -> reqwest::Response {
    client
        .patch(format!("{}/bookings/{}", BASE_URL, id))
        .bearer_auth(token)
        .json(&json!({ "status": status }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn booking_id(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse response");
    body["booking"]["id"].as_str().expect("No booking id").to_string()
}

#[tokio::test]
#[ignore]
async fn test_june_boundary_day_is_shared_capacity() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = book_mustang(&client, "2032-06-01", "2032-06-03").await;
    assert_eq!(response.status(), 201);
    let held = booking_id(response).await;
    assert!(set_status(&client, &token, &held, "Approved").await.status().is_success());

    // 06-03 is both the last held day and the first requested day
    let response = book_mustang(&client, "2032-06-03", "2032-06-05").await;
    assert_eq!(response.status(), 409);

    let response = book_mustang(&client, "2032-06-04", "2032-06-06").await;
    assert_eq!(response.status(), 201);
    let next_day = booking_id(response).await;

    // A Pending request made before the approval cannot be approved past stock
    let response = book_mustang(&client, "2032-06-10", "2032-06-12").await;
    assert_eq!(response.status(), 201);
    let later = booking_id(response).await;
    let response = client
        .patch(format!("{}/bookings/{}", BASE_URL, later))
        .bearer_auth(&token)
        .json(&json!({ "startDate": "2032-06-02", "endDate": "2032-06-02" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    assert_eq!(set_status(&client, &token, &later, "Approved").await.status(), 409);

    // Clean up
    for id in [held, next_day, later] {
        let response = client
            .delete(format!("{}/bookings/{}", BASE_URL, id))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 204);
    }
}
