//! Hosted media: upload and destroy of video/image assets
//!
//! `CloudinaryClient` talks to the Cloudinary REST API with signed requests.
//! `LocalMediaHost` copies assets into a directory served under `/media`.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::CloudinaryConfig;
use crate::constants::LOCAL_MEDIA_ROUTE;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("media API error: {0}")]
    Api(String),

    #[error("media request timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MediaError::Timeout
        } else {
            MediaError::Http(e)
        }
    }
}

/// Hosted resource class; Cloudinary keys uploads and deletions by it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    pub fn resource_type(&self) -> &'static str {
        match self {
            AssetKind::Video => "video",
            AssetKind::Image => "image",
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
    /// Reported by the host for videos; 0 when unknown
    pub duration_secs: f64,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, path: &Path, kind: AssetKind) -> Result<UploadedAsset, MediaError>;
    async fn destroy(&self, public_id: &str, kind: AssetKind) -> Result<(), MediaError>;
}

/// Content type by file extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Cloudinary
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CloudinaryUpload {
    secure_url: String,
    public_id: String,
    duration: Option<f64>,
}

#[derive(Deserialize)]
struct CloudinaryDestroy {
    result: String,
}

pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http: Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig, timeout: Duration) -> Result<Self, MediaError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, kind: AssetKind, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/{}/{}",
            self.config.cloud_name,
            kind.resource_type(),
            action
        )
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, MediaError> {
        let resp = self.http.post(url).multipart(form).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(MediaError::Api(format!("Status {}: {}", status, text)));
        }

        serde_json::from_str(&text).map_err(|e| {
            MediaError::Api(format!("Failed to parse response: {} - body: {}", e, text))
        })
    }
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, with the API secret appended, SHA-256 hex encoded
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let payload = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, path: &Path, kind: AssetKind) -> Result<UploadedAsset, MediaError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.clone())], &self.config.api_secret);

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str(content_type_for(path))
            .map_err(|e| MediaError::Api(format!("Invalid mime type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let uploaded: CloudinaryUpload = self
            .post_form(&self.endpoint(kind, "upload"), form)
            .await?;

        debug!(public_id = %uploaded.public_id, "Uploaded {} asset", kind.resource_type());
        Ok(UploadedAsset {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            duration_secs: uploaded.duration.unwrap_or(0.0),
        })
    }

    async fn destroy(&self, public_id: &str, kind: AssetKind) -> Result<(), MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("public_id", public_id.to_string()),
                ("timestamp", timestamp.clone()),
            ],
            &self.config.api_secret,
        );

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let destroyed: CloudinaryDestroy = self
            .post_form(&self.endpoint(kind, "destroy"), form)
            .await?;

        match destroyed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaError::Api(format!("destroy returned {}", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// Local directory host
// ---------------------------------------------------------------------------

static ASSET_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique, filesystem-safe name keeping a sanitized extension of `source`
fn unique_file_name(source: &Path) -> String {
    let seq = ASSET_COUNTER.fetch_add(1, Ordering::Relaxed);
    let stem = format!("{}-{}", Utc::now().timestamp_millis(), seq);
    match source
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        Some(ext) => format!("{}.{}", stem, ext.to_ascii_lowercase()),
        None => stem,
    }
}

/// A relative asset id is only valid if it stays inside the media root
fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\0')
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

pub struct LocalMediaHost {
    root: PathBuf,
}

impl LocalMediaHost {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl MediaHost for LocalMediaHost {
    async fn upload(&self, path: &Path, kind: AssetKind) -> Result<UploadedAsset, MediaError> {
        let public_id = format!("{}/{}", kind.resource_type(), unique_file_name(path));
        let target = self.root.join(&public_id);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(path, &target).await?;

        debug!(public_id = %public_id, "Stored local {} asset", kind.resource_type());
        Ok(UploadedAsset {
            url: format!("{}/{}", LOCAL_MEDIA_ROUTE, public_id),
            public_id,
            duration_secs: 0.0,
        })
    }

    async fn destroy(&self, public_id: &str, _kind: AssetKind) -> Result<(), MediaError> {
        if !is_safe_relative(public_id) {
            return Err(MediaError::Api(format!("invalid asset id {}", public_id)));
        }
        match tokio::fs::remove_file(self.root.join(public_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload staging
// ---------------------------------------------------------------------------

/// An uploaded part written to the staging directory. The file is removed
/// when the guard is dropped, whatever the outcome of the request.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Create an empty staged file named after `original_name`'s extension
    pub async fn create(
        dir: &Path,
        original_name: Option<&str>,
    ) -> std::io::Result<(Self, tokio::fs::File)> {
        tokio::fs::create_dir_all(dir).await?;
        let name = unique_file_name(Path::new(original_name.unwrap_or("upload")));
        let path = dir.join(name);
        let file = tokio::fs::File::create(&path).await?;
        Ok((Self { path }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove staged upload {:?}: {}", self.path, e);
            }
        }
    }
}

/// Best-effort deletion of superseded assets; failures are logged only
pub async fn destroy_quietly(media: &dyn MediaHost, public_id: &str, kind: AssetKind) {
    if let Err(e) = media.destroy(public_id, kind).await {
        warn!(public_id = %public_id, "Failed to destroy hosted asset: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "vidtube-media-test-{}-{}",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_signature_sorts_params() {
        let params = [
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample".to_string()),
        ];
        assert_eq!(
            sign_params(&params, "abcd"),
            "0d4fe14b2b4a3f68a97ccc5097c43908b623d24293c296826a9390c14d891509"
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a/b.MP4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("thumb.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_unique_file_name_sanitizes_extension() {
        assert!(unique_file_name(Path::new("clip.mp4")).ends_with(".mp4"));
        assert!(!unique_file_name(Path::new("evil.sh;rm")).contains(';'));
        assert_ne!(
            unique_file_name(Path::new("a.png")),
            unique_file_name(Path::new("a.png"))
        );
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative("video/1-0.mp4"));
        assert!(!is_safe_relative("../etc/passwd"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative(""));
    }

    #[tokio::test]
    async fn test_staged_file_removed_on_drop() {
        let dir = scratch_dir("staging");
        let (staged, mut file) = StagedFile::create(&dir, Some("clip.mp4")).await.unwrap();
        file.write_all(b"bytes").await.unwrap();
        file.flush().await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_local_host_upload_and_destroy() {
        let root = scratch_dir("local-host");
        let staging = scratch_dir("local-host-staging");
        let (staged, mut file) = StagedFile::create(&staging, Some("thumb.png")).await.unwrap();
        file.write_all(b"png").await.unwrap();
        file.flush().await.unwrap();

        let host = LocalMediaHost::new(root.clone());
        let asset = host.upload(staged.path(), AssetKind::Image).await.unwrap();
        assert!(asset.url.starts_with("/media/image/"));
        assert!(root.join(&asset.public_id).exists());

        host.destroy(&asset.public_id, AssetKind::Image).await.unwrap();
        assert!(!root.join(&asset.public_id).exists());
        // Destroying twice is not an error
        host.destroy(&asset.public_id, AssetKind::Image).await.unwrap();
    }
}
