//! Event broadcasting for article mutations.
//!
//! Successful create/update/delete operations publish an [`ArticleEvent`]
//! to every connected subscriber through a tokio broadcast channel.
//! Delivery is fire-and-forget: there is no acknowledgment, nothing is
//! persisted, and a subscriber that falls behind simply skips events.
//!
//! The broadcaster is an injected capability rather than ambient global
//! state, which keeps the pipeline independent of any particular
//! transport's connection lifecycle.

use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{debug, trace};

use crate::types::ArticleEvent;

/// Default channel capacity.
///
/// If a subscriber falls more than this many events behind, it receives a
/// `RecvError::Lagged` on its next receive and resumes from the newest
/// events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out hub distributing article events to all subscribers.
///
/// Cloneable and shareable across tasks; the underlying sender is
/// reference-counted.
///
/// # Example
///
/// ```rust
/// use pressroom::broadcast::EventBroadcaster;
/// use pressroom::types::ArticleEvent;
/// use uuid::Uuid;
///
/// let broadcaster = EventBroadcaster::new();
/// let mut rx = broadcaster.subscribe();
///
/// broadcaster.broadcast(ArticleEvent::Deleted { id: Uuid::new_v4() });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: Sender<ArticleEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a broadcaster with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        debug!(capacity, "Created event broadcaster");
        Self { sender }
    }

    /// Subscribes to events broadcast after this call.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<ArticleEvent> {
        let rx = self.sender.subscribe();
        debug!(
            subscriber_count = self.subscriber_count(),
            "New subscriber added"
        );
        rx
    }

    /// Broadcasts an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event; 0 when
    /// nobody is listening, which is not an error for a fire-and-forget
    /// notification.
    pub fn broadcast(&self, event: ArticleEvent) -> usize {
        trace!(event = event.name(), "Broadcasting event");

        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("No active subscribers to receive event");
                0
            }
        }
    }

    /// Current number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
