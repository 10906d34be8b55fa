//! Shared fixtures for service and router tests

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::services::media::{AssetKind, MediaError, MediaHost, StagedFile, UploadedAsset};
use crate::store::MemoryStore;

/// Users 1 (alice), 2 (bob) and 3 (carol)
pub fn seeded_store() -> MemoryStore {
    MemoryStore::with_users(&["alice", "bob", "carol"])
}

/// Stage a file with the given name and contents
pub async fn stage(name: &str, contents: &[u8]) -> StagedFile {
    let dir = std::env::temp_dir().join(format!("vidtube-test-staging-{}", std::process::id()));
    let (staged, mut file) = StagedFile::create(&dir, Some(name))
        .await
        .expect("create staged file");
    file.write_all(contents).await.expect("write staged file");
    file.flush().await.expect("flush staged file");
    staged
}

/// Media host that records calls instead of talking to a network service
#[derive(Default)]
pub struct FakeMedia {
    fail_videos: AtomicBool,
    fail_images: AtomicBool,
    next_id: AtomicU64,
    uploads: Mutex<Vec<(String, AssetKind)>>,
    destroyed: Mutex<Vec<String>>,
}

impl FakeMedia {
    pub const DURATION: f64 = 42.5;

    pub fn failing_videos() -> Self {
        let media = Self::default();
        media.fail_videos.store(true, Ordering::SeqCst);
        media
    }

    pub fn failing_images() -> Self {
        let media = Self::default();
        media.fail_images(true);
        media
    }

    pub fn fail_images(&self, fail: bool) {
        self.fail_images.store(fail, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> Vec<(String, AssetKind)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for FakeMedia {
    async fn upload(&self, path: &Path, kind: AssetKind) -> Result<UploadedAsset, MediaError> {
        let failing = match kind {
            AssetKind::Video => &self.fail_videos,
            AssetKind::Image => &self.fail_images,
        };
        if failing.load(Ordering::SeqCst) {
            return Err(MediaError::Api("upload rejected".into()));
        }
        assert!(path.exists(), "uploaded file must still be staged");

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("{}-{}", kind.resource_type(), n);
        self.uploads
            .lock()
            .unwrap()
            .push((public_id.clone(), kind));

        Ok(UploadedAsset {
            url: format!("https://media.test/{}", public_id),
            public_id,
            duration_secs: match kind {
                AssetKind::Video => Self::DURATION,
                AssetKind::Image => 0.0,
            },
        })
    }

    async fn destroy(&self, public_id: &str, _kind: AssetKind) -> Result<(), MediaError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}
