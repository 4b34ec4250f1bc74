//! HTTP handlers: login, services listing, and the webhook-ingest bridge.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use healthwatch_common::auth::{generate_token, Claims};

use crate::envelope;
use crate::state::DashboardState;

/// Sessions last a year; the dashboard is an internal tool and logins are
/// rare.
const TOKEN_TTL_HOURS: i64 = 8766;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    #[serde(rename = "jwtString")]
    jwt_string: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    message: String,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<DashboardState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return envelope::bad_request("login payload is not valid");
    };

    if !state.credentials_match(&req.username, &req.password) {
        return envelope::unauthorized("username or password is not valid");
    }

    let mut claims = Claims::new(&req.username, TOKEN_TTL_HOURS);
    claims.id = Some(req.username.clone());
    claims.full_name = Some(req.username.clone());

    let token = match generate_token(&claims, &state.jwt_key) {
        Ok(token) => token,
        Err(e) => {
            return envelope::error(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                &format!("cannot generate token: {e}"),
            );
        }
    };

    envelope::ok(
        "login succeed",
        LoginData {
            jwt_string: format!("Bearer {token}"),
        },
    )
}

/// `GET /api/services` (JWT protected)
pub async fn get_services(State(state): State<Arc<DashboardState>>) -> Response {
    envelope::services_ok(&state.title, state.services_snapshot())
}

/// `POST /api/tob/webhook` — the monitor's webhook notifier lands here.
pub async fn handle_tob_webhook(
    State(state): State<Arc<DashboardState>>,
    headers: HeaderMap,
    body: Result<Json<WebhookMessage>, JsonRejection>,
) -> Response {
    let Some(token) = headers.get("X-Tob-Token").and_then(|t| t.to_str().ok()) else {
        return envelope::unauthorized("X-Tob-Token cannot be empty");
    };

    if !state.token_valid(token) {
        return envelope::unauthorized("X-Tob-Token is not valid");
    }

    let Ok(Json(req)) = body else {
        return envelope::bad_request("webhook payload is not valid");
    };

    debug!("webhook ingest: {}", req.message);
    state.apply_webhook_message(&req.message);

    envelope::ok("handle tob webhook succeed", json!({}))
}
