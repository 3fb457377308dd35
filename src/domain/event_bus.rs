//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every committed
//! creation or like publishes a [`BoardEvent`] through the bus; listeners
//! and WebSocket connections subscribe to receive them.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::BoardEvent;
use super::listener::BoardEventListener;

/// Broadcast bus for [`BoardEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: BoardEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Runs `listener` on its own task for every future event.
    ///
    /// The subscription is taken before this returns, so events published
    /// afterwards are never missed. Lagged events are skipped with a
    /// warning; the task ends once every bus handle is dropped.
    pub fn spawn_listener<L>(&self, listener: L) -> JoinHandle<()>
    where
        L: BoardEventListener + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => listener.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            listener = listener.name(),
                            lagged = n,
                            "listener lagged behind event bus"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!(listener = listener.name(), "listener stopped");
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{Board, BoardId, NewBoard, ThreadId};

    fn make_event(board_id: i64) -> BoardEvent {
        BoardEvent::BoardLiked {
            board: Board::create(
                BoardId::from(board_id),
                NewBoard {
                    user_name: "carol".to_string(),
                    thread_id: ThreadId::from(1),
                    image_id: None,
                },
                Utc::now(),
            ),
            timestamp: Utc::now(),
        }
    }

    struct Recorder {
        seen: mpsc::UnboundedSender<BoardId>,
    }

    #[async_trait]
    impl BoardEventListener for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn handle(&self, event: &BoardEvent) {
            let _ = self.seen.send(event.board_id());
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(100);
        assert_eq!(bus.publish(make_event(1)), 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(make_event(7)), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.board_id(), e2.board_id());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.receiver_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }

    #[tokio::test]
    async fn spawned_listener_sees_events_in_order() {
        let bus = EventBus::new(100);
        let (tx, mut seen) = mpsc::unbounded_channel();
        let _task = bus.spawn_listener(Recorder { seen: tx });

        bus.publish(make_event(1));
        bus.publish(make_event(2));

        for expected in [1, 2] {
            let got = tokio::time::timeout(Duration::from_secs(1), seen.recv()).await;
            let Ok(Some(id)) = got else {
                panic!("listener did not observe event {expected}");
            };
            assert_eq!(id, BoardId::from(expected));
        }
    }

    #[tokio::test]
    async fn listener_stops_when_bus_is_dropped() {
        let bus = EventBus::new(4);
        let (tx, _seen) = mpsc::unbounded_channel();
        let task = bus.spawn_listener(Recorder { seen: tx });

        drop(bus);
        let finished = tokio::time::timeout(Duration::from_secs(1), task).await;
        assert!(finished.is_ok());
    }
}
