//! Fan-out of incoming chat events.

use log::trace;
use tokio::sync::broadcast;

use crate::response::ChatEvent;

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast hub fed by the sync loop.
///
/// Every subscriber sees every event published after it subscribed. A
/// subscriber that falls behind by more than the capacity loses the oldest
/// events and is told how many it skipped.
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ChatEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventHub { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it, 0 when there are none.
    pub fn publish(&self, event: ChatEvent) -> usize {
        trace!("publishing {:?}", event);
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribes to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        EventHub::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::IncomingReaction;

    fn create_test_reaction() -> ChatEvent {
        ChatEvent::Reaction(IncomingReaction {
            room_id: "!room:example.org".to_owned(),
            sender: "@alice:example.org".to_owned(),
            event_id: "$reaction".to_owned(),
            target_event_id: "$prompt".to_owned(),
            key: "✅".to_owned(),
        })
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = EventHub::default();
        assert_eq!(hub.publish(create_test_reaction()), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_the_event() {
        let hub = EventHub::new(8);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        assert_eq!(hub.subscriber_count(), 2);
        assert_eq!(hub.publish(create_test_reaction()), 2);
        assert_eq!(first.recv().await.unwrap(), create_test_reaction());
        assert_eq!(second.recv().await.unwrap(), create_test_reaction());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_removed() {
        let hub = EventHub::new(8);
        let receiver = hub.subscribe();
        drop(receiver);

        assert_eq!(hub.subscriber_count(), 0);
    }
}
