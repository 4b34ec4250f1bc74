//! End-to-end dashboard scenarios: webhook ingest feeding the services API,
//! token and JWT enforcement, and the error envelopes.

use std::sync::Arc;

use serde_json::{Value, json};

use healthwatch_config::Config;
use healthwatch_dashboard::{DashboardState, router};

const PASSWORD_SHA256: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"; // "password"

fn dashboard_config() -> Config {
    let raw = format!(
        r#"{{
            "notificator": {{
                "webhook": [
                    {{"url": "http://localhost:9115/api/tob/webhook", "tobToken": "t1", "enable": true}}
                ]
            }},
            "service": {{
                "billing": {{"kind": "postgresql", "url": "postgres://x", "checkInterval": 5, "enable": true}},
                "search": {{"kind": "elasticsearch", "url": "http://x:9200", "checkInterval": 5, "enable": true}}
            }},
            "dashboardTitle": "Ops Status",
            "dashboardJwtKey": "integration-test-key",
            "dashboardUsername": "admin",
            "dashboardPassword": "{PASSWORD_SHA256}"
        }}"#
    );
    Config::from_reader(raw.as_bytes()).unwrap()
}

/// Serve the dashboard on an ephemeral port, return its base URL.
async fn spawn_dashboard() -> String {
    let state = Arc::new(DashboardState::from_config(&dashboard_config()).unwrap());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn login(client: &reqwest::Client, base: &str) -> String {
    let resp = client
        .post(format!("{base}/api/login"))
        .json(&json!({"username": "admin", "password": "password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let bearer = body["data"]["jwtString"].as_str().unwrap();
    assert!(bearer.starts_with("Bearer "));
    bearer.to_string()
}

// S4: a webhook notification shows up in the services listing.
#[tokio::test]
async fn webhook_ingest_updates_service_state() {
    let base = spawn_dashboard().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/tob/webhook"))
        .header("X-Tob-Token", "t1")
        .json(&json!({"message": "billing is DOWN | timeout"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let bearer = login(&client, &base).await;
    let resp = client
        .get(format!("{base}/api/services"))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["dashboardTitle"], "Ops Status");
    assert_eq!(body["data"]["billing"]["status"], "DOWN");
    assert_eq!(body["data"]["billing"]["messageDetails"], "timeout");
    // untouched services keep their seeded state
    assert_eq!(body["data"]["search"]["status"], "UP");

    // recovery clears the details
    client
        .post(format!("{base}/api/tob/webhook"))
        .header("X-Tob-Token", "t1")
        .json(&json!({"message": "billing is UP. It was down for 3 minutes"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .get(format!("{base}/api/services"))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["billing"]["status"], "UP");
    assert_eq!(body["data"]["billing"]["messageDetails"], "");
}

// Invariant: /api/services requires a valid Bearer token.
#[tokio::test]
async fn services_requires_valid_jwt() {
    let base = spawn_dashboard().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/services"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 401);

    let resp = client
        .get(format!("{base}/api/services"))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(format!("{base}/api/services"))
        .header("Authorization", "Basic dXNlcjpwdw==")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let base = spawn_dashboard().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/login"))
        .json(&json!({"username": "admin", "password": "letmein"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/api/login"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn webhook_rejects_bad_tokens_and_payloads() {
    let base = spawn_dashboard().await;
    let client = reqwest::Client::new();

    // missing token
    let resp = client
        .post(format!("{base}/api/tob/webhook"))
        .json(&json!({"message": "billing is DOWN"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // wrong token
    let resp = client
        .post(format!("{base}/api/tob/webhook"))
        .header("X-Tob-Token", "wrong")
        .json(&json!({"message": "billing is DOWN"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "X-Tob-Token is not valid");

    // malformed body
    let resp = client
        .post(format!("{base}/api/tob/webhook"))
        .header("X-Tob-Token", "t1")
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // wrong method
    let resp = client
        .get(format!("{base}/api/tob/webhook"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "http method not valid");
}

// Unknown service names are ignored, the endpoint stays idempotent.
#[tokio::test]
async fn webhook_ingest_ignores_unknown_service()  {
    let base = spawn_dashboard().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/tob/webhook"))
        .header("X-Tob-Token", "t1")
        .json(&json!({"message": "mystery is DOWN | whatever"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let bearer = login(&client, &base).await;
    let resp = client
        .get(format!("{base}/api/services"))
        .header("Authorization", &bearer)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].get("mystery").is_none());
}
