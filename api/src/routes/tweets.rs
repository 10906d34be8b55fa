//! Tweet endpoints (/tweets)

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, patch, post},
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::comments::ContentRequest;
use super::dto::MessageResponse;
use super::path_id;
use crate::AppState;
use crate::domain::tweets::Tweet;
use crate::services::error::ApiError;
use crate::services::tweets;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tweets", post(create_tweet))
        .route("/tweets/user/{user_id}", get(list_user_tweets))
        .route("/tweets/{tweet_id}", patch(update_tweet).delete(delete_tweet))
}

/// POST /tweets
async fn create_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Tweet>), ApiError> {
    let Json(req) = payload?;
    let tweet = tweets::create_tweet(state.store.as_ref(), user_id, req.content).await?;
    Ok((StatusCode::CREATED, Json(tweet)))
}

/// GET /tweets/user/{user_id} - A user's tweets, newest first
async fn list_user_tweets(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Tweet>>, ApiError> {
    let user_id = path_id(&user_id, "user id")?;
    Ok(Json(tweets::list_user_tweets(state.store.as_ref(), user_id).await?))
}

/// PATCH /tweets/{tweet_id}
async fn update_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<Tweet>, ApiError> {
    let tweet_id = path_id(&tweet_id, "tweet id")?;
    let Json(req) = payload?;
    let tweet = tweets::update_tweet(state.store.as_ref(), user_id, tweet_id, req.content).await?;
    Ok(Json(tweet))
}

/// DELETE /tweets/{tweet_id}
async fn delete_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let tweet_id = path_id(&tweet_id, "tweet id")?;
    tweets::delete_tweet(state.store.as_ref(), user_id, tweet_id).await?;
    Ok(Json(MessageResponse::new("Tweet deleted successfully")))
}
