//! Tweet operations

use crate::domain::non_blank;
use crate::domain::tweets::Tweet;
use crate::services::ensure_owner;
use crate::services::error::ApiError;
use crate::store::Store;

pub async fn create_tweet(
    store: &dyn Store,
    actor: i64,
    content: Option<String>,
) -> Result<Tweet, ApiError> {
    let content = non_blank(content).ok_or_else(|| ApiError::invalid("Content is required"))?;
    Ok(store.insert_tweet(actor, &content).await?)
}

pub async fn list_user_tweets(store: &dyn Store, user_id: i64) -> Result<Vec<Tweet>, ApiError> {
    if store.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(store.list_tweets_by_owner(user_id).await?)
}

async fn owned_tweet(store: &dyn Store, actor: i64, tweet_id: i64) -> Result<Tweet, ApiError> {
    let tweet = store
        .get_tweet(tweet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;
    ensure_owner(tweet.owner_id, actor, "You do not own this tweet")?;
    Ok(tweet)
}

pub async fn update_tweet(
    store: &dyn Store,
    actor: i64,
    tweet_id: i64,
    content: Option<String>,
) -> Result<Tweet, ApiError> {
    let content = non_blank(content).ok_or_else(|| ApiError::invalid("Content is required"))?;
    owned_tweet(store, actor, tweet_id).await?;

    store
        .update_tweet(tweet_id, &content)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))
}

pub async fn delete_tweet(store: &dyn Store, actor: i64, tweet_id: i64) -> Result<(), ApiError> {
    owned_tweet(store, actor, tweet_id).await?;
    if !store.delete_tweet(tweet_id).await? {
        return Err(ApiError::not_found("Tweet not found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_store;

    #[tokio::test]
    async fn test_user_tweets_newest_first() {
        let store = seeded_store();
        create_tweet(&store, 1, Some("one".into())).await.unwrap();
        create_tweet(&store, 2, Some("not mine".into())).await.unwrap();
        create_tweet(&store, 1, Some("two".into())).await.unwrap();

        let tweets = list_user_tweets(&store, 1).await.unwrap();
        let contents: Vec<&str> = tweets.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = seeded_store();
        let err = list_user_tweets(&store, 404).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_only_mutation() {
        let store = seeded_store();
        let tweet = create_tweet(&store, 1, Some("hello".into())).await.unwrap();

        let err = update_tweet(&store, 2, tweet.id, Some("hijack".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        let err = delete_tweet(&store, 2, tweet.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let updated = update_tweet(&store, 1, tweet.id, Some("edited".into()))
            .await
            .unwrap();
        assert_eq!(updated.content, "edited");

        delete_tweet(&store, 1, tweet.id).await.unwrap();
        assert!(matches!(
            delete_tweet(&store, 1, tweet.id).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_blank_tweet_rejected() {
        let store = seeded_store();
        let err = create_tweet(&store, 1, Some("".into())).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
