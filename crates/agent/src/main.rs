/*!
 * Healthwatch Disk Agent
 *
 * Small companion server deployed next to the disks being watched. The
 * monitor's diskstatus probe POSTs a filesystem path; the agent runs the
 * local `df` and answers with the parsed usage envelope:
 *
 * ```json
 * {"success": true, "message": "disk status",
 *  "data": {"filesystem": "/dev/sda1", "size": "...", "used": "...",
 *           "available": "...", "use%": 81, "diskUsed": 80}}
 * ```
 *
 * Port comes from HTTP_PORT (default 9113).
 */

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod disk;

const DEFAULT_PORT: u16 = 9113;

#[derive(Debug, Deserialize)]
struct CheckDiskRequest {
    path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    healthwatch_common::init_tracing(false);

    let port = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = Router::new()
        .route("/", get(index))
        .route("/check-disk", post(check_disk_handler))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind agent to {addr}"))?;

    info!("🚀 Disk agent running on port {port}");

    axum::serve(listener, app).await.context("agent failed")?;
    Ok(())
}

async fn index() -> Json<Value> {
    Json(json!({"success": true, "message": "server up and running"}))
}

async fn check_disk_handler(body: Result<Json<CheckDiskRequest>, JsonRejection>) -> Response {
    let Ok(Json(req)) = body else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"success": false, "message": "check-disk payload is not valid"}),
        );
    };

    match disk::check_disk(&req.path).await {
        Ok(data) => reply(
            StatusCode::OK,
            json!({"success": true, "message": "disk status", "data": data}),
        ),
        Err(e) => {
            error!("check disk failed: {e}");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "message": "error check storage"}),
            )
        }
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}
