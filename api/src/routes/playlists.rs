//! Playlist endpoints (/playlists)

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use super::dto::{MessageResponse, PlaylistDetailResponse, PlaylistResponse};
use super::{PageQuery, path_id};
use crate::AppState;
use crate::services::error::ApiError;
use crate::services::playlists;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/playlists", post(create_playlist))
        .route("/playlists/user/{user_id}", get(user_playlists))
        .route(
            "/playlists/{playlist_id}",
            get(get_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route("/playlists/add/{video_id}/{playlist_id}", patch(add_video))
        .route("/playlists/remove/{video_id}/{playlist_id}", patch(remove_video))
}

#[derive(Debug, Deserialize)]
struct PlaylistRequest {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Serialize)]
struct PlaylistCreatedResponse {
    message: &'static str,
    playlist: PlaylistResponse,
}

/// POST /playlists
async fn create_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlaylistCreatedResponse>), ApiError> {
    let Json(req) = payload?;
    let playlist =
        playlists::create_playlist(state.store.as_ref(), user_id, req.name, req.description).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaylistCreatedResponse {
            message: "Playlist created",
            playlist: playlist.into(),
        }),
    ))
}

/// GET /playlists/user/{user_id} - A user's playlists, newest first
async fn user_playlists(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(user_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<PlaylistResponse>>, ApiError> {
    let user_id = path_id(&user_id, "user id")?;
    let Query(query) = query?;
    let page = query.page_request()?;

    let playlists = playlists::user_playlists(state.store.as_ref(), user_id, page).await?;
    Ok(Json(playlists.into_iter().map(PlaylistResponse::from).collect()))
}

/// GET /playlists/{playlist_id} - Playlist with its videos
async fn get_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(playlist_id): Path<String>,
) -> Result<Json<PlaylistDetailResponse>, ApiError> {
    let playlist_id = path_id(&playlist_id, "playlist id")?;
    let playlist = playlists::get_playlist(state.store.as_ref(), playlist_id).await?;
    Ok(Json(playlist.into()))
}

/// PATCH /playlists/{playlist_id}
async fn update_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> Result<Json<PlaylistResponse>, ApiError> {
    let playlist_id = path_id(&playlist_id, "playlist id")?;
    let Json(req) = payload?;

    let playlist = playlists::update_playlist(
        state.store.as_ref(),
        user_id,
        playlist_id,
        req.name,
        req.description,
    )
    .await?;
    Ok(Json(playlist.into()))
}

/// DELETE /playlists/{playlist_id}
async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let playlist_id = path_id(&playlist_id, "playlist id")?;
    playlists::delete_playlist(state.store.as_ref(), user_id, playlist_id).await?;
    Ok(Json(MessageResponse::new("Playlist deleted successfully")))
}

/// PATCH /playlists/add/{video_id}/{playlist_id}
async fn add_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<Json<PlaylistDetailResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let playlist_id = path_id(&playlist_id, "playlist id")?;

    let playlist = playlists::add_video(state.store.as_ref(), user_id, video_id, playlist_id).await?;
    Ok(Json(playlist.into()))
}

/// PATCH /playlists/remove/{video_id}/{playlist_id}
async fn remove_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<Json<PlaylistDetailResponse>, ApiError> {
    let video_id = path_id(&video_id, "video id")?;
    let playlist_id = path_id(&playlist_id, "playlist id")?;

    let playlist =
        playlists::remove_video(state.store.as_ref(), user_id, video_id, playlist_id).await?;
    Ok(Json(playlist.into()))
}
