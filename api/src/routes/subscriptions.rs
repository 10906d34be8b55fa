//! Subscription endpoints (/subscriptions)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::path_id;
use crate::AppState;
use crate::domain::subscriptions::{SubscribedChannel, Subscriber};
use crate::services::error::ApiError;
use crate::services::subscriptions;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/subscriptions/c/{channel_id}",
            get(channel_subscribers).post(toggle_subscription),
        )
        .route("/subscriptions/u/{subscriber_id}", get(subscribed_channels))
}

#[derive(Serialize)]
struct SubscriptionResponse {
    message: &'static str,
    subscribed: bool,
}

/// POST /subscriptions/c/{channel_id} - Subscribe or unsubscribe
async fn toggle_subscription(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(channel_id): Path<String>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let channel_id = path_id(&channel_id, "channel id")?;
    let outcome = subscriptions::toggle_subscription(state.store.as_ref(), user_id, channel_id).await?;

    let response = if outcome.is_added() {
        (
            StatusCode::CREATED,
            Json(SubscriptionResponse {
                message: "Subscribed to channel successfully",
                subscribed: true,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(SubscriptionResponse {
                message: "Unsubscribed from channel successfully",
                subscribed: false,
            }),
        )
    };
    Ok(response)
}

/// GET /subscriptions/c/{channel_id} - Subscribers of a channel
async fn channel_subscribers(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(channel_id): Path<String>,
) -> Result<Json<Vec<Subscriber>>, ApiError> {
    let channel_id = path_id(&channel_id, "channel id")?;
    Ok(Json(
        subscriptions::channel_subscribers(state.store.as_ref(), channel_id).await?,
    ))
}

/// GET /subscriptions/u/{subscriber_id} - Channels a user subscribes to
async fn subscribed_channels(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(subscriber_id): Path<String>,
) -> Result<Json<Vec<SubscribedChannel>>, ApiError> {
    let subscriber_id = path_id(&subscriber_id, "subscriber id")?;
    Ok(Json(
        subscriptions::subscribed_channels(state.store.as_ref(), subscriber_id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::test_app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_subscribe_then_unsubscribe() {
        let app = test_app();
        let (status, body) = app.call("POST", "/subscriptions/c/1", Some(2), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["subscribed"], true);

        let (status, subscribers) = app.call("GET", "/subscriptions/c/1", Some(3), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(subscribers[0]["subscriber_id"], 2);

        let (status, body) = app.call("POST", "/subscriptions/c/1", Some(2), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Unsubscribed from channel successfully");
    }

    #[tokio::test]
    async fn test_self_subscription() {
        let app = test_app();
        let (status, body) = app.call("POST", "/subscriptions/c/2", Some(2), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You cannot subscribe to your own channel");
        assert_eq!(app.store.subscription_count().await, 0);
    }
}
