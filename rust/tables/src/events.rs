use crate::TableId;
use fairdeal_engine::deck::VerificationBundle;
use fairdeal_engine::game::{GamePhase, PotAward};
use fairdeal_engine::player::{PlayerAction, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

// Slow subscribers lose events instead of stalling the table
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<TableEvent>;
pub type EventReceiver = mpsc::Receiver<TableEvent>;

/// Public notifications about a table. Hole cards never travel here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    TableCreated {
        table_id: TableId,
        host_id: UserId,
        small_blind: u32,
        big_blind: u32,
    },
    PlayerJoined {
        table_id: TableId,
        user_id: UserId,
        name: String,
        buy_in: u32,
    },
    PlayerLeft {
        table_id: TableId,
        user_id: UserId,
        refund: u32,
    },
    HandStarted {
        table_id: TableId,
        hand_number: u32,
        dealer_seat: usize,
        /// Published before any card is revealed
        commitment: String,
    },
    ActionTaken {
        table_id: TableId,
        user_id: UserId,
        action: PlayerAction,
        message: String,
        phase: GamePhase,
    },
    TurnTimedOut {
        table_id: TableId,
        user_id: UserId,
        message: String,
    },
    HandFinished {
        table_id: TableId,
        hand_number: u32,
        winners: Vec<UserId>,
        awards: Vec<PotAward>,
        verification: VerificationBundle,
    },
    TableClosed {
        table_id: TableId,
        refunds: Vec<(UserId, u32)>,
    },
}

pub struct EventSubscription {
    bus: EventBus,
    table_id: TableId,
    subscriber_id: usize,
    receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.table_id, self.subscriber_id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<TableId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table_id: impl Into<TableId>) -> EventSubscription {
        let table_id = table_id.into();
        let (subscriber_id, receiver) = self.subscribe_raw(table_id.clone());
        EventSubscription {
            bus: self.clone(),
            table_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, table_id: TableId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        match self.inner.subscribers.write() {
            Ok(mut guard) => guard.entry(table_id.clone()).or_default().push((id, tx)),
            Err(poisoned) => poisoned
                .into_inner()
                .entry(table_id.clone())
                .or_default()
                .push((id, tx)),
        }

        tracing::debug!(
            table_id = %table_id,
            subscriber_id = id,
            "subscribed to table events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, table_id: &str, event: TableEvent) {
        tracing::trace!(table_id = %table_id, event = ?event, "broadcasting table event");

        let subscribers = match self.inner.subscribers.read() {
            Ok(guard) => guard.get(table_id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(table_id).cloned(),
        };
        let Some(list) = subscribers else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    table_id = %table_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping table event subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(table_id, &failed);
        }
    }

    pub fn unsubscribe(&self, table_id: &str, subscriber_id: usize) {
        self.remove_subscribers(table_id, &[subscriber_id]);
    }

    pub fn drop_table(&self, table_id: &str) {
        match self.inner.subscribers.write() {
            Ok(mut guard) => guard.remove(table_id),
            Err(poisoned) => poisoned.into_inner().remove(table_id),
        };
    }

    pub fn subscriber_count(&self) -> usize {
        match self.inner.subscribers.read() {
            Ok(guard) => guard.values().map(Vec::len).sum(),
            Err(poisoned) => poisoned.into_inner().values().map(Vec::len).sum(),
        }
    }

    fn remove_subscribers(&self, table_id: &str, ids: &[usize]) {
        let mut guard = match self.inner.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(list) = guard.get_mut(table_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(table_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(table: &str) -> TableEvent {
        TableEvent::PlayerLeft {
            table_id: table.to_string(),
            user_id: UserId(1),
            refund: 10,
        }
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let bus = EventBus::new();
        {
            let _sub = bus.subscribe("t");
            assert_eq!(bus.subscriber_count(), 1);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn broadcast_reaches_only_that_tables_subscribers() {
        let bus = EventBus::new();
        let mut sub1 = bus.subscribe("t");
        let mut sub2 = bus.subscribe("t");
        let mut other = bus.subscribe("u");

        bus.broadcast("t", left("t"));

        assert_eq!(sub1.receiver().try_recv().expect("sub1 event"), left("t"));
        assert_eq!(sub2.receiver().try_recv().expect("sub2 event"), left("t"));
        assert!(other.receiver().try_recv().is_err());
    }

    #[test]
    fn stale_receiver_is_pruned() {
        let bus = EventBus::new();
        let (id, rx) = bus.subscribe_raw("t".to_string());
        drop(rx);
        bus.broadcast("t", left("t"));
        assert_eq!(bus.subscriber_count(), 0);
        bus.unsubscribe("t", id);
    }

    #[test]
    fn full_channel_drops_the_subscriber() {
        let bus = EventBus::new();
        let _sub = bus.subscribe("t");
        for _ in 0..=EVENT_CHANNEL_BUFFER {
            bus.broadcast("t", left("t"));
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn events_are_tagged_by_type() {
        let json = serde_json::to_value(left("t")).unwrap();
        assert_eq!(json["type"], "player_left");
        assert_eq!(json["user_id"], 1);
    }
}
