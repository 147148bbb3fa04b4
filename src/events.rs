//! Typed notifications raised by the party controller.
//!
//! Each event kind has its own [`Topic`], so listeners subscribe to exactly
//! the payload they handle and the compiler checks its shape. Topics are
//! plain values owned by whoever constructs the controller; there is no
//! process-wide registry.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::member::MemberId;
use crate::stats::CharacterKey;

/// Raised whenever members join or leave the party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionChanged {
    /// Members in party order after the change; the first entry leads.
    pub members: Vec<(MemberId, CharacterKey)>,
}

/// Raised whenever a different member becomes the leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderChanged {
    /// The member that led before the change.
    pub previous: MemberId,
    /// The member now leading.
    pub leader: MemberId,
    /// Character key of the new leader, for portrait lookups.
    pub key: CharacterKey,
}

/// Fan-out channel for one event type.
///
/// Every subscriber receives its own copy of each published event.
/// Receivers are `Send + Sync`, so they can sit in ECS resources.
/// Subscribers whose receiver has been dropped are pruned on the next
/// publish.
#[derive(Debug)]
pub struct Topic<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E> Default for Topic<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E: Clone> Topic<E> {
    /// Creates a topic with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new listener.
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Sends `event` to every live subscriber.
    pub fn publish(&mut self, event: &E) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Number of subscribers registered and not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// The topics a party controller publishes to.
#[derive(Debug, Default)]
pub struct PartyEvents {
    /// Membership changes, for HUD and portrait listeners.
    pub composition: Topic<CompositionChanged>,
    /// Leader changes, for camera and portrait listeners.
    pub leader: Topic<LeaderChanged>,
}

impl PartyEvents {
    /// Creates the topics with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader_event(previous: u32, leader: u32) -> LeaderChanged {
        LeaderChanged {
            previous: MemberId(previous),
            leader: MemberId(leader),
            key: CharacterKey::from("wren"),
        }
    }

    #[test]
    fn every_subscriber_receives_a_copy() {
        let mut topic = Topic::new();
        let first = topic.subscribe();
        let second = topic.subscribe();
        topic.publish(&leader_event(0, 1));
        assert_eq!(first.try_recv().ok(), Some(leader_event(0, 1)));
        assert_eq!(second.try_recv().ok(), Some(leader_event(0, 1)));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut topic: Topic<LeaderChanged> = Topic::new();
        let kept = topic.subscribe();
        drop(topic.subscribe());
        assert_eq!(topic.subscriber_count(), 2);
        topic.publish(&leader_event(1, 2));
        assert_eq!(topic.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    static_assertions::assert_impl_all!(Receiver<LeaderChanged>: Send, Sync);

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let mut events = PartyEvents::new();
        events.composition.publish(&CompositionChanged { members: vec![] });
        assert_eq!(events.composition.subscriber_count(), 0);
    }
}
