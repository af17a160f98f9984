//! Anonymous sessions and live collection subscriptions
//!
//! A [`Session`] is resolved from the `user_id` path segment on every request.
//! Subscribing yields a [`CollectionSubscription`] that reports which
//! collections need a fresh snapshot. Dropping it (or calling
//! [`CollectionSubscription::unsubscribe`]) ends the subscription.

use crate::db;
use serde::Serialize;
use songsmith_common::db::{CollectedLine, Draft, ReferenceLyric};
use songsmith_common::events::{Collection, EventBus, SongsmithEvent};
use songsmith_common::{Error, Result};
use sqlx::SqlitePool;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Collections a live subscription follows by default
pub const ALL_COLLECTIONS: [Collection; 3] =
    [Collection::Drafts, Collection::Lines, Collection::References];

/// Authenticated anonymous user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
}

impl Session {
    /// Create a new anonymous identity
    pub async fn sign_in_anonymously(pool: &SqlitePool, event_bus: &EventBus) -> Result<Self> {
        let user = db::users::create_user(pool).await?;
        info!(user_id = %user.id, "Anonymous sign-in");

        event_bus.emit_lossy(SongsmithEvent::UserSignedIn {
            user_id: user.id,
            timestamp: user.created_at,
        });

        Ok(Self { user_id: user.id })
    }

    /// Resume a session for an identity issued earlier
    pub async fn resume(pool: &SqlitePool, user_id: Uuid) -> Result<Self> {
        match db::users::get_user(pool, user_id).await? {
            Some(user) => Ok(Self { user_id: user.id }),
            None => Err(Error::NotFound(format!("Unknown user {}", user_id))),
        }
    }

    /// Follow changes to `collections` visible to this user
    pub fn subscribe(&self, event_bus: &EventBus, collections: &[Collection]) -> CollectionSubscription {
        debug!(user_id = %self.user_id, ?collections, "Live subscription opened");
        CollectionSubscription {
            user_id: self.user_id,
            collections: collections.to_vec(),
            rx: event_bus.subscribe(),
        }
    }

    /// Current contents of one collection as seen by this user
    pub async fn snapshot(&self, pool: &SqlitePool, collection: Collection) -> Result<CollectionSnapshot> {
        Ok(match collection {
            Collection::Drafts => {
                CollectionSnapshot::Drafts(db::drafts::list_drafts(pool, self.user_id).await?)
            }
            Collection::Lines => {
                CollectionSnapshot::Lines(db::lines::list_lines(pool, self.user_id).await?)
            }
            Collection::References => {
                CollectionSnapshot::References(db::references::list_references(pool).await?)
            }
        })
    }
}

/// Full contents of one collection
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "collection", content = "documents", rename_all = "snake_case")]
pub enum CollectionSnapshot {
    Drafts(Vec<Draft>),
    Lines(Vec<CollectedLine>),
    References(Vec<ReferenceLyric>),
}

/// Something a live subscriber should act on
#[derive(Debug, Clone)]
pub enum SubscriptionUpdate {
    /// These collections changed; send fresh snapshots
    Refresh(Vec<Collection>),
    /// A generation started or finished for this user
    Generation(SongsmithEvent),
}

/// One live subscription; owns its event bus receiver
pub struct CollectionSubscription {
    user_id: Uuid,
    collections: Vec<Collection>,
    rx: broadcast::Receiver<SongsmithEvent>,
}

impl CollectionSubscription {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Wait for the next relevant update
    ///
    /// Returns `None` when the event bus is gone. A subscriber that fell
    /// behind gets a refresh of everything it follows.
    pub async fn next_update(&mut self) -> Option<SubscriptionUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if !event.is_visible_to(self.user_id) {
                        continue;
                    }
                    match event {
                        SongsmithEvent::CollectionChanged { collection, .. }
                            if self.collections.contains(&collection) =>
                        {
                            return Some(SubscriptionUpdate::Refresh(vec![collection]));
                        }
                        SongsmithEvent::GenerationStarted { .. }
                        | SongsmithEvent::GenerationFinished { .. } => {
                            return Some(SubscriptionUpdate::Generation(event));
                        }
                        _ => continue,
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = %self.user_id, skipped, "Live subscription lagged, resyncing");
                    return Some(SubscriptionUpdate::Refresh(self.collections.clone()));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// End the subscription
    pub fn unsubscribe(self) {
        debug!(user_id = %self.user_id, "Live subscription closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use songsmith_common::events::ChangeKind;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resume_unknown_user_is_not_found() {
        let pool = db::test_pool().await;
        let err = Session::resume(&pool, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sign_in_then_resume() {
        let pool = db::test_pool().await;
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let session = Session::sign_in_anonymously(&pool, &bus).await.unwrap();
        assert_eq!(Session::resume(&pool, session.user_id).await.unwrap(), session);
        assert!(matches!(
            rx.recv().await.unwrap(),
            SongsmithEvent::UserSignedIn { .. }
        ));
    }

    #[tokio::test]
    async fn test_subscription_ignores_other_users_changes() {
        let bus = EventBus::new(8);
        let me = Session { user_id: Uuid::new_v4() };
        let mut sub = me.subscribe(&bus, &ALL_COLLECTIONS);

        bus.emit_lossy(SongsmithEvent::collection_changed(
            Collection::Drafts,
            Some(Uuid::new_v4()),
            "fremd",
            ChangeKind::Added,
        ));
        bus.emit_lossy(SongsmithEvent::collection_changed(
            Collection::Lines,
            Some(me.user_id),
            "meins",
            ChangeKind::Added,
        ));

        match sub.next_update().await {
            Some(SubscriptionUpdate::Refresh(c)) => assert_eq!(c, vec![Collection::Lines]),
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscription_filters_by_collection() {
        let bus = EventBus::new(8);
        let me = Session { user_id: Uuid::new_v4() };
        let mut sub = me.subscribe(&bus, &[Collection::References]);

        bus.emit_lossy(SongsmithEvent::collection_changed(
            Collection::Drafts,
            Some(me.user_id),
            "d",
            ChangeKind::Removed,
        ));
        bus.emit_lossy(SongsmithEvent::collection_changed(
            Collection::References,
            None,
            "r",
            ChangeKind::Added,
        ));

        match sub.next_update().await {
            Some(SubscriptionUpdate::Refresh(c)) => assert_eq!(c, vec![Collection::References]),
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lagged_subscriber_refreshes_everything() {
        let bus = EventBus::new(2);
        let me = Session { user_id: Uuid::new_v4() };
        let mut sub = me.subscribe(&bus, &ALL_COLLECTIONS);

        for i in 0..5 {
            bus.emit_lossy(SongsmithEvent::collection_changed(
                Collection::References,
                None,
                i.to_string(),
                ChangeKind::Added,
            ));
        }

        match sub.next_update().await {
            Some(SubscriptionUpdate::Refresh(c)) => assert_eq!(c, ALL_COLLECTIONS.to_vec()),
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_receiver() {
        let bus = EventBus::new(8);
        let sub = Session { user_id: Uuid::new_v4() }.subscribe(&bus, &ALL_COLLECTIONS);
        assert_eq!(bus.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_closed_bus_ends_subscription() {
        let bus = EventBus::new(8);
        let mut sub = Session { user_id: Uuid::new_v4() }.subscribe(&bus, &ALL_COLLECTIONS);
        drop(bus);

        let update = tokio::time::timeout(Duration::from_secs(1), sub.next_update())
            .await
            .unwrap();
        assert!(update.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_serializes_tagged() {
        let pool = db::test_pool().await;
        let me = Session { user_id: Uuid::new_v4() };
        db::lines::add_line(&pool, me.user_id, "Zeile").await.unwrap();

        let snapshot = me.snapshot(&pool, Collection::Lines).await.unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["collection"], "lines");
        assert_eq!(json["documents"][0]["content"], "Zeile");
        assert!(json["documents"][0]["createdAt"].is_string());
    }
}
