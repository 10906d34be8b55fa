//! Dashboard domain - channel statistics

use serde::Serialize;
use sqlx::{Executor, Postgres};

/// Aggregate statistics for one channel. Every metric is 0 when there is no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_likes: i64,
    pub views_count: i64,
    pub subscriber_count: i64,
    pub total_videos: i64,
}

/// Compute all four metrics in one statement so they describe the same snapshot
pub async fn get_channel_stats<'e, E>(executor: E, owner_id: i64) -> Result<ChannelStats, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*)
             FROM likes l
             JOIN videos v ON v.id = l.video_id
             WHERE v.owner_id = $1) AS total_likes,
            (SELECT COALESCE(SUM(views), 0)::BIGINT
             FROM videos
             WHERE owner_id = $1) AS views_count,
            (SELECT COUNT(*)
             FROM subscriptions
             WHERE channel_id = $1) AS subscriber_count,
            (SELECT COUNT(*)
             FROM videos
             WHERE owner_id = $1) AS total_videos
        "#,
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await
}
