//! Channel dashboard: aggregate stats and the owner's videos

use crate::domain::dashboard::ChannelStats;
use crate::domain::videos::Video;
use crate::services::error::ApiError;
use crate::store::Store;

pub async fn channel_stats(store: &dyn Store, actor: i64) -> Result<ChannelStats, ApiError> {
    Ok(store.channel_stats(actor).await?)
}

pub async fn channel_videos(store: &dyn Store, actor: i64) -> Result<Vec<Video>, ApiError> {
    Ok(store.list_videos_by_owner(actor).await?)
}
