//! Event types and EventBus
//!
//! Every store mutation emits a [`SongsmithEvent`]. Live subscriptions (SSE)
//! listen on the bus and refresh the affected collection snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Document collections that can be subscribed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Per-user lyric drafts
    Drafts,
    /// Per-user collected lines
    Lines,
    /// Shared public reference lyrics
    References,
}

impl Collection {
    /// Private collections belong to one user; references are shared
    pub fn is_private(self) -> bool {
        !matches!(self, Collection::References)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Drafts => "drafts",
            Collection::Lines => "lines",
            Collection::References => "references",
        }
    }
}

/// Kind of document change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// Songsmith event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SongsmithEvent {
    /// A new anonymous identity was created
    UserSignedIn {
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A document was added, modified or removed
    ///
    /// `owner` is `None` for the shared reference collection.
    CollectionChanged {
        collection: Collection,
        owner: Option<Uuid>,
        document_id: String,
        change: ChangeKind,
        timestamp: DateTime<Utc>,
    },

    /// A song generation request was accepted for a user
    GenerationStarted {
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A song generation request finished
    GenerationFinished {
        user_id: Uuid,
        /// All three sections were found in the reply
        structured: bool,
        /// The reply carried the error marker
        failed: bool,
        timestamp: DateTime<Utc>,
    },
}

impl SongsmithEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SongsmithEvent::UserSignedIn { .. } => "UserSignedIn",
            SongsmithEvent::CollectionChanged { .. } => "CollectionChanged",
            SongsmithEvent::GenerationStarted { .. } => "GenerationStarted",
            SongsmithEvent::GenerationFinished { .. } => "GenerationFinished",
        }
    }

    /// Whether a subscriber for `user_id` should see this event
    ///
    /// Private changes are only visible to their owner. Changes to the shared
    /// collection are visible to everyone.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        match self {
            SongsmithEvent::UserSignedIn { user_id: id, .. }
            | SongsmithEvent::GenerationStarted { user_id: id, .. }
            | SongsmithEvent::GenerationFinished { user_id: id, .. } => *id == user_id,
            SongsmithEvent::CollectionChanged { owner, .. } => match owner {
                Some(owner) => *owner == user_id,
                None => true,
            },
        }
    }

    /// Shorthand for a collection change stamped with the current time
    pub fn collection_changed(
        collection: Collection,
        owner: Option<Uuid>,
        document_id: impl Into<String>,
        change: ChangeKind,
    ) -> Self {
        SongsmithEvent::CollectionChanged {
            collection,
            owner,
            document_id: document_id.into(),
            change,
            timestamp: Utc::now(),
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`: publishing never blocks, slow subscribers
/// see `Lagged`, and dropping a receiver unsubscribes it.
///
/// # Examples
///
/// ```
/// use songsmith_common::events::{ChangeKind, Collection, EventBus, SongsmithEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(SongsmithEvent::collection_changed(
///     Collection::References,
///     None,
///     "abc",
///     ChangeKind::Added,
/// ));
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SongsmithEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SongsmithEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SongsmithEvent,
    ) -> Result<usize, broadcast::error::SendError<SongsmithEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SongsmithEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
