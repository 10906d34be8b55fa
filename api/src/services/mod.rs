pub mod comments;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod likes;
pub mod media;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

use error::ApiError;

/// Reject mutation of a resource the actor does not own
pub fn ensure_owner(owner_id: i64, actor: i64, message: &str) -> Result<(), ApiError> {
    if owner_id == actor {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}
