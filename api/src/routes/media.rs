//! Locally hosted media (/media/*path), active with the local media backend

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use crate::AppState;
use crate::services::error::{ApiError, LogErr};
use crate::services::media::content_type_for;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/media/{*path}", get(serve_media))
}

/// GET /media/*path - Serve a file from the local media root
async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Reject traversal attempts and null bytes upfront
    if path.contains("..") || path.contains('\0') {
        return Err(ApiError::forbidden("Forbidden path"));
    }

    let media_root = state
        .media_root
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Media not found"))?;

    // canonicalize() resolves symlinks, so the prefix check below is authoritative
    let canonical = media_root
        .join(&path)
        .canonicalize()
        .map_err(|_| ApiError::not_found("Media not found"))?;
    let root_canonical = media_root
        .canonicalize()
        .log_500("Failed to canonicalize media root")?;

    if !canonical.starts_with(&root_canonical) {
        return Err(ApiError::forbidden("Forbidden path"));
    }

    let bytes = tokio::fs::read(&canonical)
        .await
        .map_err(|_| ApiError::not_found("Media not found"))?;

    // Asset names are unique per upload, so they never change in place
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&canonical)),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::test_app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_serves_files_under_root() {
        let app = test_app();
        let root = app.media_root.clone();
        tokio::fs::create_dir_all(root.join("image")).await.unwrap();
        tokio::fs::write(root.join("image/served.png"), b"png").await.unwrap();

        let (status, body) = app.call("GET", "/media/image/served.png", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "png");

        let (status, _) = app.call("GET", "/media/image/missing.png", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let app = test_app();
        let (status, _) = app
            .call("GET", "/media/image/..%2F..%2Fetc/passwd", None, None)
            .await;
        assert_ne!(status, StatusCode::OK);
    }
}
