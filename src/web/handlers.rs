use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use crate::filter::filter_playlist;

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Fetch the upstream playlist and return it filtered, without touching the
/// published file.
pub async fn serve_filtered_playlist(State(state): State<AppState>) -> Response {
    match state.fetcher.fetch().await {
        Ok(raw) => {
            let filtered = filter_playlist(&raw, &state.allow_list);
            Response::builder()
                .header("content-type", PLAYLIST_CONTENT_TYPE)
                .body(Body::from(filtered))
                .unwrap()
        }
        Err(e) => {
            error!("On-demand playlist filter failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve the playlist file most recently published by the refresh scheduler.
pub async fn serve_published_file(State(state): State<AppState>) -> Response {
    let file_path = state.config.storage.output_path();

    match tokio::fs::read_to_string(&file_path).await {
        Ok(content) => Response::builder()
            .header("content-type", PLAYLIST_CONTENT_TYPE)
            .header("cache-control", "no-cache")
            .body(Body::from(content))
            .unwrap(),
        Err(e) => {
            warn!("No published playlist at {}: {e}", file_path.display());
            (StatusCode::NOT_FOUND, "No published playlist available").into_response()
        }
    }
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
