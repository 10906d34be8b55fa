//! Channel subscription toggling and listings

use tracing::debug;

use crate::domain::ToggleOutcome;
use crate::domain::subscriptions::{SubscribedChannel, Subscriber};
use crate::services::error::ApiError;
use crate::store::Store;

pub async fn toggle_subscription(
    store: &dyn Store,
    actor: i64,
    channel_id: i64,
) -> Result<ToggleOutcome, ApiError> {
    if actor == channel_id {
        return Err(ApiError::invalid("You cannot subscribe to your own channel"));
    }
    if store.get_user(channel_id).await?.is_none() {
        return Err(ApiError::not_found("Channel not found"));
    }

    let outcome = store.toggle_subscription(actor, channel_id).await?;
    debug!(actor, channel_id, ?outcome, "Subscription toggled");
    Ok(outcome)
}

pub async fn channel_subscribers(
    store: &dyn Store,
    channel_id: i64,
) -> Result<Vec<Subscriber>, ApiError> {
    if store.get_user(channel_id).await?.is_none() {
        return Err(ApiError::not_found("Channel not found"));
    }
    Ok(store.list_subscribers(channel_id).await?)
}

pub async fn subscribed_channels(
    store: &dyn Store,
    subscriber_id: i64,
) -> Result<Vec<SubscribedChannel>, ApiError> {
    if store.get_user(subscriber_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(store.list_subscribed_channels(subscriber_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_store;

    #[tokio::test]
    async fn test_self_subscription_rejected_without_row() {
        let store = seeded_store();
        let err = toggle_subscription(&store, 1, 1).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "You cannot subscribe to your own channel");
        assert_eq!(store.subscription_count().await, 0);
    }

    #[tokio::test]
    async fn test_toggle_and_list() {
        let store = seeded_store();
        assert!(toggle_subscription(&store, 2, 1).await.unwrap().is_added());
        assert!(toggle_subscription(&store, 3, 1).await.unwrap().is_added());

        let subscribers = channel_subscribers(&store, 1).await.unwrap();
        let ids: Vec<i64> = subscribers.iter().map(|s| s.subscriber_id).collect();
        assert_eq!(ids, vec![3, 2]);

        let channels = subscribed_channels(&store, 2).await.unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].channel_id, 1);

        assert!(!toggle_subscription(&store, 2, 1).await.unwrap().is_added());
        assert_eq!(channel_subscribers(&store, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_channel_or_user() {
        let store = seeded_store();
        assert!(matches!(
            toggle_subscription(&store, 1, 50).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            channel_subscribers(&store, 50).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            subscribed_channels(&store, 50).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
