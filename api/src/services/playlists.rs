//! Playlist operations

use std::collections::HashMap;

use crate::domain::playlists::{Playlist, PlaylistChanges};
use crate::domain::videos::Video;
use crate::domain::{PageRequest, non_blank};
use crate::services::ensure_owner;
use crate::services::error::ApiError;
use crate::store::Store;

/// A playlist with its videos resolved, in playlist order
#[derive(Debug)]
pub struct PopulatedPlaylist {
    pub playlist: Playlist,
    pub videos: Vec<Video>,
}

async fn populate(store: &dyn Store, playlist: Playlist) -> Result<PopulatedPlaylist, ApiError> {
    let mut by_id: HashMap<i64, Video> = store
        .list_videos_by_ids(&playlist.video_ids)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let videos = playlist
        .video_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();
    Ok(PopulatedPlaylist { playlist, videos })
}

pub async fn create_playlist(
    store: &dyn Store,
    actor: i64,
    name: Option<String>,
    description: Option<String>,
) -> Result<Playlist, ApiError> {
    let (Some(name), Some(description)) = (non_blank(name), non_blank(description)) else {
        return Err(ApiError::invalid("All fields are required: name, description"));
    };
    Ok(store.insert_playlist(actor, &name, &description).await?)
}

pub async fn user_playlists(
    store: &dyn Store,
    user_id: i64,
    page: PageRequest,
) -> Result<Vec<Playlist>, ApiError> {
    Ok(store.list_playlists_by_owner(user_id, page).await?)
}

async fn load(store: &dyn Store, playlist_id: i64) -> Result<Playlist, ApiError> {
    store
        .get_playlist(playlist_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))
}

async fn owned_playlist(
    store: &dyn Store,
    actor: i64,
    playlist_id: i64,
) -> Result<Playlist, ApiError> {
    let playlist = load(store, playlist_id).await?;
    ensure_owner(playlist.owner_id, actor, "You do not own this playlist")?;
    Ok(playlist)
}

pub async fn get_playlist(
    store: &dyn Store,
    playlist_id: i64,
) -> Result<PopulatedPlaylist, ApiError> {
    let playlist = load(store, playlist_id).await?;
    populate(store, playlist).await
}

/// Adding a video already in the playlist leaves it unchanged
pub async fn add_video(
    store: &dyn Store,
    actor: i64,
    video_id: i64,
    playlist_id: i64,
) -> Result<PopulatedPlaylist, ApiError> {
    owned_playlist(store, actor, playlist_id).await?;
    if store.get_video(video_id).await?.is_none() {
        return Err(ApiError::not_found("Video not found"));
    }

    store.add_playlist_video(playlist_id, video_id).await?;
    get_playlist(store, playlist_id).await
}

pub async fn remove_video(
    store: &dyn Store,
    actor: i64,
    video_id: i64,
    playlist_id: i64,
) -> Result<PopulatedPlaylist, ApiError> {
    owned_playlist(store, actor, playlist_id).await?;
    if !store.remove_playlist_video(playlist_id, video_id).await? {
        return Err(ApiError::invalid("Video is not in this playlist"));
    }
    get_playlist(store, playlist_id).await
}

pub async fn update_playlist(
    store: &dyn Store,
    actor: i64,
    playlist_id: i64,
    name: Option<String>,
    description: Option<String>,
) -> Result<Playlist, ApiError> {
    let playlist = owned_playlist(store, actor, playlist_id).await?;

    let changes = PlaylistChanges {
        name: non_blank(name),
        description: non_blank(description),
    };
    if changes.is_empty() {
        return Ok(playlist);
    }

    store
        .update_playlist(playlist_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))
}

pub async fn delete_playlist(store: &dyn Store, actor: i64, playlist_id: i64) -> Result<(), ApiError> {
    owned_playlist(store, actor, playlist_id).await?;
    if !store.delete_playlist(playlist_id).await? {
        return Err(ApiError::not_found("Playlist not found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::videos::NewVideo;
    use crate::test_support::seeded_store;

    async fn video(store: &dyn Store, title: &str) -> i64 {
        store
            .insert_video(NewVideo {
                owner_id: 1,
                title: title.into(),
                description: "d".into(),
                video_url: "u".into(),
                video_public_id: "p".into(),
                thumbnail_url: None,
                thumbnail_public_id: None,
                duration_secs: 1.0,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let store = seeded_store();
        let err = create_playlist(&store, 1, Some("name".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_videos_populated_in_order_without_duplicates() {
        let store = seeded_store();
        let first = video(&store, "first").await;
        let second = video(&store, "second").await;
        let playlist = create_playlist(&store, 2, Some("mix".into()), Some("d".into()))
            .await
            .unwrap();

        add_video(&store, 2, second, playlist.id).await.unwrap();
        add_video(&store, 2, first, playlist.id).await.unwrap();
        let populated = add_video(&store, 2, second, playlist.id).await.unwrap();

        let titles: Vec<&str> = populated.videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(populated.playlist.video_ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_remove_absent_video_is_invalid() {
        let store = seeded_store();
        let id = video(&store, "v").await;
        let playlist = create_playlist(&store, 1, Some("p".into()), Some("d".into()))
            .await
            .unwrap();

        let err = remove_video(&store, 1, id, playlist.id).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));

        add_video(&store, 1, id, playlist.id).await.unwrap();
        let populated = remove_video(&store, 1, id, playlist.id).await.unwrap();
        assert!(populated.videos.is_empty());
    }

    #[tokio::test]
    async fn test_ownership_enforced() {
        let store = seeded_store();
        let id = video(&store, "v").await;
        let playlist = create_playlist(&store, 1, Some("p".into()), Some("d".into()))
            .await
            .unwrap();

        assert!(matches!(
            add_video(&store, 2, id, playlist.id).await.unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            update_playlist(&store, 2, playlist.id, Some("x".into()), None)
                .await
                .unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            delete_playlist(&store, 2, playlist.id).await.unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        assert!(get_playlist(&store, playlist.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_partial_update_and_listing() {
        let store = seeded_store();
        let older = create_playlist(&store, 1, Some("old".into()), Some("d".into()))
            .await
            .unwrap();
        create_playlist(&store, 1, Some("new".into()), Some("d".into()))
            .await
            .unwrap();

        let updated = update_playlist(&store, 1, older.id, None, Some("fresh".into()))
            .await
            .unwrap();
        assert_eq!(updated.name, "old");
        assert_eq!(updated.description, "fresh");

        let listed = user_playlists(&store, 1, PageRequest::default()).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old"]);
        assert!(user_playlists(&store, 3, PageRequest::default())
            .await
            .unwrap()
            .is_empty());
    }
}
