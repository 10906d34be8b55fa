//! Video operations: listing, publishing, updates and deletion

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::videos::{NewVideo, SortField, SortOrder, Video, VideoChanges, VideoFilter};
use crate::domain::{PageRequest, non_blank, parse_id};
use crate::services::ensure_owner;
use crate::services::error::ApiError;
use crate::services::media::{AssetKind, MediaHost, StagedFile, destroy_quietly};
use crate::store::Store;

/// Raw query string of `GET /videos`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

impl VideoListQuery {
    pub fn parse(self) -> Result<(VideoFilter, PageRequest), ApiError> {
        let page = PageRequest::parse(self.page.as_deref(), self.limit.as_deref())?;

        let sort_by = match self.sort_by.as_deref() {
            None | Some("") => SortField::default(),
            Some(raw) => SortField::parse(raw)
                .ok_or_else(|| ApiError::invalid(format!("Unsupported sortBy value: {}", raw)))?,
        };
        let order = match self.sort_type.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw)
                .ok_or_else(|| ApiError::invalid("sortType must be asc or desc"))?,
        };
        let owner_id = match self.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(parse_id(raw).ok_or_else(|| ApiError::invalid("Invalid userId"))?),
        };

        let filter = VideoFilter {
            query: non_blank(self.query),
            owner_id,
            sort_by,
            order,
        };
        Ok((filter, page))
    }
}

pub struct VideoPage {
    pub page: PageRequest,
    pub total: i64,
    pub results: Vec<Video>,
}

pub async fn list_videos(store: &dyn Store, query: VideoListQuery) -> Result<VideoPage, ApiError> {
    let (filter, page) = query.parse()?;
    let (results, total) = store.list_videos(&filter, page).await?;
    Ok(VideoPage {
        page,
        total,
        results,
    })
}

/// Multipart fields of a publish request, files already staged on disk
#[derive(Default)]
pub struct PublishInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_file: Option<StagedFile>,
    pub thumbnail: Option<StagedFile>,
}

pub async fn publish_video(
    store: &dyn Store,
    media: &dyn MediaHost,
    actor: i64,
    input: PublishInput,
) -> Result<Video, ApiError> {
    let (Some(title), Some(description), Some(video_file)) = (
        non_blank(input.title),
        non_blank(input.description),
        input.video_file,
    ) else {
        return Err(ApiError::invalid(
            "Title, description, and video file are required.",
        ));
    };

    let uploaded = media.upload(video_file.path(), AssetKind::Video).await?;

    let thumbnail = match &input.thumbnail {
        Some(staged) => match media.upload(staged.path(), AssetKind::Image).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                warn!("Thumbnail upload failed, publishing without one: {}", e);
                None
            }
        },
        None => None,
    };

    let new_video = NewVideo {
        owner_id: actor,
        title,
        description,
        video_url: uploaded.url,
        video_public_id: uploaded.public_id.clone(),
        thumbnail_url: thumbnail.as_ref().map(|t| t.url.clone()),
        thumbnail_public_id: thumbnail.as_ref().map(|t| t.public_id.clone()),
        duration_secs: uploaded.duration_secs,
    };

    match store.insert_video(new_video).await {
        Ok(video) => {
            info!(video_id = video.id, owner_id = actor, "Video published");
            Ok(video)
        }
        Err(e) => {
            // The row never landed, so the hosted assets are orphans
            destroy_quietly(media, &uploaded.public_id, AssetKind::Video).await;
            if let Some(thumbnail) = thumbnail {
                destroy_quietly(media, &thumbnail.public_id, AssetKind::Image).await;
            }
            Err(e.into())
        }
    }
}

pub async fn get_video(store: &dyn Store, video_id: i64) -> Result<Video, ApiError> {
    store
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

async fn owned_video(store: &dyn Store, actor: i64, video_id: i64) -> Result<Video, ApiError> {
    let video = get_video(store, video_id).await?;
    ensure_owner(video.owner_id, actor, "You do not own this video")?;
    Ok(video)
}

#[derive(Default)]
pub struct UpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<StagedFile>,
}

pub async fn update_video(
    store: &dyn Store,
    media: &dyn MediaHost,
    actor: i64,
    video_id: i64,
    input: UpdateInput,
) -> Result<Video, ApiError> {
    let video = owned_video(store, actor, video_id).await?;

    let mut changes = VideoChanges {
        title: non_blank(input.title),
        description: non_blank(input.description),
        ..Default::default()
    };

    if let Some(staged) = &input.thumbnail {
        match media.upload(staged.path(), AssetKind::Image).await {
            Ok(asset) => {
                changes.thumbnail_url = Some(asset.url);
                changes.thumbnail_public_id = Some(asset.public_id);
            }
            Err(e) => warn!(video_id, "Thumbnail upload failed, keeping the previous one: {}", e),
        }
    }

    if changes.is_empty() {
        return Ok(video);
    }

    let replaced_thumbnail = changes
        .thumbnail_public_id
        .as_ref()
        .and(video.thumbnail_public_id.clone());

    let updated = store
        .update_video(video_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    if let Some(old) = replaced_thumbnail {
        destroy_quietly(media, &old, AssetKind::Image).await;
    }
    Ok(updated)
}

pub async fn delete_video(
    store: &dyn Store,
    media: &dyn MediaHost,
    actor: i64,
    video_id: i64,
) -> Result<(), ApiError> {
    let video = owned_video(store, actor, video_id).await?;

    if !store.delete_video(video_id).await? {
        return Err(ApiError::not_found("Video not found"));
    }
    info!(video_id, owner_id = actor, "Video deleted");

    destroy_quietly(media, &video.video_public_id, AssetKind::Video).await;
    if let Some(thumbnail) = &video.thumbnail_public_id {
        destroy_quietly(media, thumbnail, AssetKind::Image).await;
    }
    Ok(())
}

pub async fn toggle_publish(store: &dyn Store, actor: i64, video_id: i64) -> Result<Video, ApiError> {
    owned_video(store, actor, video_id).await?;
    store
        .toggle_video_published(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeMedia, seeded_store, stage};

    async fn publish_input(title: &str) -> PublishInput {
        PublishInput {
            title: Some(title.to_string()),
            description: Some("a description".to_string()),
            video_file: Some(stage("clip.mp4", b"video").await),
            thumbnail: Some(stage("thumb.png", b"image").await),
        }
    }

    #[tokio::test]
    async fn test_publish_then_get_round_trip() {
        let store = seeded_store();
        let media = FakeMedia::default();

        let published = publish_video(&store, &media, 1, publish_input("First").await)
            .await
            .unwrap();
        let fetched = get_video(&store, published.id).await.unwrap();

        assert_eq!(fetched.title, "First");
        assert_eq!(fetched.owner_id, 1);
        assert_eq!(fetched.video_url, published.video_url);
        assert_eq!(fetched.duration_secs, FakeMedia::DURATION);
        assert!(fetched.thumbnail_url.is_some());
        assert!(fetched.is_published);
    }

    #[tokio::test]
    async fn test_publish_requires_fields() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let mut input = publish_input("t").await;
        input.video_file = None;

        let err = publish_video(&store, &media, 1, input).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert!(media.uploads().is_empty());

        let mut input = publish_input("t").await;
        input.title = Some("   ".into());
        let err = publish_video(&store, &media, 1, input).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_publish_upload_failure() {
        let store = seeded_store();
        let media = FakeMedia::failing_videos();

        let err = publish_video(&store, &media, 1, publish_input("t").await)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UploadFailed));
        assert_eq!(err.to_string(), "Error occurred while uploading file");
    }

    #[tokio::test]
    async fn test_thumbnail_failure_publishes_without_thumbnail() {
        let store = seeded_store();
        let media = FakeMedia::failing_images();

        let video = publish_video(&store, &media, 1, publish_input("t").await)
            .await
            .unwrap();
        assert!(video.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn test_update_by_non_owner_rejected_before_write() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let video = publish_video(&store, &media, 1, publish_input("Mine").await)
            .await
            .unwrap();

        let input = UpdateInput {
            title: Some("Stolen".into()),
            ..Default::default()
        };
        let err = update_video(&store, &media, 2, video.id, input).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(get_video(&store, video.id).await.unwrap().title, "Mine");
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let video = publish_video(&store, &media, 1, publish_input("Old").await)
            .await
            .unwrap();

        let input = UpdateInput {
            title: Some("New".into()),
            description: Some("  ".into()),
            thumbnail: None,
        };
        let updated = update_video(&store, &media, 1, video.id, input).await.unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "a description");

        let unchanged = update_video(&store, &media, 1, video.id, UpdateInput::default())
            .await
            .unwrap();
        assert_eq!(unchanged.updated_at, updated.updated_at);
    }

    #[tokio::test]
    async fn test_thumbnail_replacement_destroys_old_asset() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let video = publish_video(&store, &media, 1, publish_input("t").await)
            .await
            .unwrap();
        let old = video.thumbnail_public_id.clone().unwrap();

        let input = UpdateInput {
            thumbnail: Some(stage("new.png", b"new").await),
            ..Default::default()
        };
        let updated = update_video(&store, &media, 1, video.id, input).await.unwrap();
        assert_ne!(updated.thumbnail_public_id, Some(old.clone()));
        assert_eq!(media.destroyed(), vec![old]);
    }

    #[tokio::test]
    async fn test_failed_thumbnail_update_keeps_previous() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let video = publish_video(&store, &media, 1, publish_input("t").await)
            .await
            .unwrap();

        media.fail_images(true);
        let input = UpdateInput {
            thumbnail: Some(stage("new.png", b"new").await),
            ..Default::default()
        };
        let updated = update_video(&store, &media, 1, video.id, input).await.unwrap();
        assert_eq!(updated.thumbnail_url, video.thumbnail_url);
    }

    #[tokio::test]
    async fn test_delete_removes_video_and_assets() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let video = publish_video(&store, &media, 1, publish_input("t").await)
            .await
            .unwrap();

        let err = delete_video(&store, &media, 2, video.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        delete_video(&store, &media, 1, video.id).await.unwrap();
        assert!(matches!(
            get_video(&store, video.id).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert_eq!(media.destroyed().len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_publish_flips_flag() {
        let store = seeded_store();
        let media = FakeMedia::default();
        let video = publish_video(&store, &media, 1, publish_input("t").await)
            .await
            .unwrap();

        assert!(!toggle_publish(&store, 1, video.id).await.unwrap().is_published);
        assert!(toggle_publish(&store, 1, video.id).await.unwrap().is_published);
        assert!(matches!(
            toggle_publish(&store, 2, video.id).await.unwrap_err(),
            ApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_list_query_validation() {
        let query = VideoListQuery {
            sort_by: Some("password".into()),
            ..Default::default()
        };
        assert!(matches!(query.parse(), Err(ApiError::InvalidArgument(_))));

        let query = VideoListQuery {
            sort_type: Some("sideways".into()),
            ..Default::default()
        };
        assert!(matches!(query.parse(), Err(ApiError::InvalidArgument(_))));

        let query = VideoListQuery {
            page: Some("2".into()),
            limit: Some("5".into()),
            sort_by: Some("views".into()),
            sort_type: Some("asc".into()),
            user_id: Some("3".into()),
            query: Some(" cats ".into()),
        };
        let (filter, page) = query.parse().unwrap();
        assert_eq!(page.offset(), 5);
        assert_eq!(filter.sort_by, SortField::Views);
        assert_eq!(filter.order, SortOrder::Asc);
        assert_eq!(filter.owner_id, Some(3));
        assert_eq!(filter.query.as_deref(), Some("cats"));
    }

    #[tokio::test]
    async fn test_list_pagination_and_total() {
        let store = seeded_store();
        let media = FakeMedia::default();
        for i in 0..7 {
            publish_video(&store, &media, 1, publish_input(&format!("v{}", i)).await)
                .await
                .unwrap();
        }

        let query = VideoListQuery {
            page: Some("2".into()),
            limit: Some("3".into()),
            sort_by: Some("title".into()),
            sort_type: Some("asc".into()),
            ..Default::default()
        };
        let page = list_videos(&store, query).await.unwrap();
        assert_eq!(page.total, 7);
        let titles: Vec<&str> = page.results.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["v3", "v4", "v5"]);
    }
}
