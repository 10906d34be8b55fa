//! Video endpoints (/videos)

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, Query, State,
        multipart::{Field, MultipartRejection},
        rejection::QueryRejection,
    },
    http::StatusCode,
    routing::{get, patch},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use super::auth::AuthUser;
use super::dto::{MessageResponse, VideoMessageResponse, VideoResponse};
use super::path_id;
use crate::AppState;
use crate::services::error::{ApiError, LogErr};
use crate::services::media::StagedFile;
use crate::services::videos::{self, PublishInput, UpdateInput, VideoListQuery};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos).post(publish_video))
        .route(
            "/videos/{video_id}",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/videos/toggle/publish/{video_id}", patch(toggle_publish))
}

#[derive(Serialize)]
struct VideoListResponse {
    page: i64,
    limit: i64,
    total: i64,
    results: Vec<VideoResponse>,
}

/// Stream a file part to the staging directory. Empty parts count as absent.
async fn stage_field(state: &AppState, mut field: Field<'_>) -> Result<Option<StagedFile>, ApiError> {
    let (staged, mut file) = StagedFile::create(&state.config.upload_staging_dir, field.file_name())
        .await
        .log_500("Failed to create staged upload")?;

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await? {
        written += chunk.len();
        file.write_all(&chunk)
            .await
            .log_500("Failed to write staged upload")?;
    }
    file.flush().await.log_500("Failed to flush staged upload")?;

    Ok((written > 0).then_some(staged))
}

/// Fields shared by the publish and update forms
#[derive(Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    video_file: Option<StagedFile>,
    thumbnail: Option<StagedFile>,
}

async fn read_video_form(state: &AppState, mut multipart: Multipart) -> Result<VideoForm, ApiError> {
    let mut form = VideoForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "videoFile" => form.video_file = stage_field(state, field).await?,
            "thumbnail" => form.thumbnail = stage_field(state, field).await?,
            _ => {
                // Drain unknown parts so the stream can advance
                field.bytes().await?;
            }
        }
    }

    Ok(form)
}

/// GET /videos - List videos with search, sorting and pagination
async fn list_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    query: Result<Query<VideoListQuery>, QueryRejection>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let Query(query) = query?;
    let page = videos::list_videos(state.store.as_ref(), query).await?;

    Ok(Json(VideoListResponse {
        page: page.page.page,
        limit: page.page.limit,
        total: page.total,
        results: page.results.into_iter().map(VideoResponse::from).collect(),
    }))
}

/// POST /videos - Publish a video (multipart: title, description, videoFile, thumbnail?)
async fn publish_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<VideoMessageResponse>), ApiError> {
    let form = read_video_form(&state, multipart?).await?;
    let input = PublishInput {
        title: form.title,
        description: form.description,
        video_file: form.video_file,
        thumbnail: form.thumbnail,
    };

    let video = videos::publish_video(state.store.as_ref(), state.media.as_ref(), user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(VideoMessageResponse {
            message: "Video published successfully".to_string(),
            video: video.into(),
        }),
    ))
}

/// GET /videos/{video_id}
async fn get_video(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let video = videos::get_video(state.store.as_ref(), video_id).await?;
    Ok(Json(video.into()))
}

/// PATCH /videos/{video_id} - Update title/description/thumbnail (multipart)
async fn update_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoMessageResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let form = read_video_form(&state, multipart?).await?;
    let input = UpdateInput {
        title: form.title,
        description: form.description,
        thumbnail: form.thumbnail,
    };

    let video = videos::update_video(
        state.store.as_ref(),
        state.media.as_ref(),
        user_id,
        video_id,
        input,
    )
    .await?;

    Ok(Json(VideoMessageResponse {
        message: "Video updated successfully".to_string(),
        video: video.into(),
    }))
}

/// DELETE /videos/{video_id}
async fn delete_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    videos::delete_video(state.store.as_ref(), state.media.as_ref(), user_id, video_id).await?;
    Ok(Json(MessageResponse::new("Video deleted successfully")))
}

/// PATCH /videos/toggle/publish/{video_id}
async fn toggle_publish(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoMessageResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let video = videos::toggle_publish(state.store.as_ref(), user_id, video_id).await?;

    let message = if video.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };
    Ok(Json(VideoMessageResponse {
        message: message.to_string(),
        video: video.into(),
    }))
}
