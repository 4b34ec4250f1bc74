//! Bearer-JWT middleware for the protected dashboard endpoints.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use healthwatch_common::auth::validate_token;

use crate::envelope;
use crate::state::DashboardState;

/// Reject requests without a valid `Authorization: Bearer <jwt>` header.
pub async fn require_jwt(
    State(state): State<Arc<DashboardState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(header_value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return envelope::unauthorized("no token provided");
    };

    let mut parts = header_value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();

    if scheme != "Bearer" || token.is_empty() {
        return envelope::unauthorized("token is not valid");
    }

    match validate_token(token, &state.jwt_key) {
        Ok(_claims) => next.run(req).await,
        Err(_) => envelope::unauthorized("token is not valid"),
    }
}
