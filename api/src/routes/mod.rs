pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod dto;
pub mod likes;
pub mod media;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

use axum::{Router, routing::get};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::domain::{PageRequest, parse_id};
use crate::services::error::ApiError;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(comments::routes())
        .merge(dashboard::routes())
        .merge(likes::routes())
        .merge(media::routes())
        .merge(playlists::routes())
        .merge(subscriptions::routes())
        .merge(tweets::routes())
        .merge(videos::routes())
}

async fn health() -> &'static str {
    "ok"
}

/// Parse an identifier path segment
pub(crate) fn path_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::invalid(format!("Invalid {}", what)))
}

/// `?page=&limit=` on paginated list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> Result<PageRequest, ApiError> {
        Ok(PageRequest::parse(self.page.as_deref(), self.limit.as_deref())?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::AppState;
    use crate::config::{Config, MediaBackend, StoreBackend};
    use crate::constants::{ACTOR_HEADER, MAX_UPLOAD_SIZE};
    use crate::store::MemoryStore;
    use crate::test_support::{FakeMedia, seeded_store};

    pub struct TestApp {
        pub router: Router,
        pub store: Arc<MemoryStore>,
        pub media: Arc<FakeMedia>,
        pub media_root: std::path::PathBuf,
    }

    fn test_config() -> Config {
        let root = std::env::temp_dir().join(format!("vidtube-router-test-{}", std::process::id()));
        Config {
            port: 0,
            store_backend: StoreBackend::Memory,
            database_url: String::new(),
            db_max_connections: 1,
            store_timeout: std::time::Duration::from_secs(5),
            media_backend: MediaBackend::Local { root: root.join("media") },
            media_timeout: std::time::Duration::from_secs(5),
            upload_staging_dir: root.join("staging"),
            max_upload_bytes: MAX_UPLOAD_SIZE,
            memory_seed_users: Vec::new(),
            cors_allow_origin: None,
        }
    }

    pub fn test_app() -> TestApp {
        let store = Arc::new(seeded_store());
        let media = Arc::new(FakeMedia::default());
        let config = test_config();
        let media_root = match &config.media_backend {
            MediaBackend::Local { root } => Some(root.clone()),
            MediaBackend::Cloudinary(_) => None,
        };
        let state = Arc::new(AppState {
            store: store.clone(),
            media: media.clone(),
            media_root: media_root.clone(),
            config,
        });
        TestApp {
            router: crate::build_app(state),
            store,
            media,
            media_root: media_root.expect("local media root"),
        }
    }

    impl TestApp {
        pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
            };
            (status, body)
        }

        pub async fn call(
            &self,
            method: &str,
            uri: &str,
            actor: Option<i64>,
            json: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(actor) = actor {
                builder = builder.header(ACTOR_HEADER, actor.to_string());
            }
            let request = match json {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            self.send(request).await
        }
    }

    /// A `multipart/form-data` body from text fields and (name, filename, bytes) files
    pub fn multipart_body(
        texts: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> (String, Vec<u8>) {
        let boundary = "vidtube-test-boundary";
        let mut body = Vec::new();
        for (name, value) in texts {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    boundary, name, value
                )
                .as_bytes(),
            );
        }
        for (name, filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    boundary, name, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        (format!("multipart/form-data; boundary={}", boundary), body)
    }
}
