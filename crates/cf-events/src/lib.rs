//! Per-subscriber bounded event fan-out
//!
//! The gateway itself has no pub/sub; the closest relative in the pack is
//! `nijaru-aircher`'s `tokio::sync::broadcast`-based `EventBus`. Broadcast's
//! lag semantics are whole-channel (a slow subscriber forces *every*
//! subscriber to skip the same missed messages), which doesn't match the
//! per-subscriber bounded queue with an explicit per-subscriber dropped
//! counter this system requires. So each subscription gets its own bounded
//! ring buffer with drop-oldest eviction instead of a channel: a slow
//! subscriber loses its stalest events, never its newest.

#![allow(clippy::must_use_candidate)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use cascadeflow_core::time::now;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Notify;

/// Named channel a subscriber can listen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Event,
    Health,
    Budget,
    Cache,
}

/// Envelope delivered to subscribers
#[derive(Debug, Clone, serde::Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
    pub timestamp: i64,
}

const QUEUE_CAPACITY: usize = 256;

/// One subscriber's ring buffer: bounded, FIFO, oldest entry evicted first
/// when a publish would overflow it.
struct Ring {
    queue: Mutex<VecDeque<Envelope>>,
    notify: Notify,
    dropped: AtomicU64,
}

impl Ring {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(QUEUE_CAPACITY)),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Push `envelope`, evicting the oldest entry first if the ring is full.
    fn push(&self, envelope: Envelope) {
        let mut queue = self.queue.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if queue.len() >= QUEUE_CAPACITY {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(envelope);
        drop(queue);
        self.notify.notify_one();
    }

    fn try_pop(&self) -> Option<Envelope> {
        self.queue.lock().unwrap_or_else(std::sync::PoisonError::into_inner).pop_front()
    }
}

/// Handle returned by [`EventHub::subscribe`]
pub struct Subscription {
    pub id: u64,
    pub channel: Channel,
    ring: Arc<Ring>,
}

impl Subscription {
    /// Wait for the next event, oldest first. Never errors: the ring lives
    /// as long as this handle does, unlike a channel's sender-dropped case.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            if let Some(envelope) = self.ring.try_pop() {
                return Some(envelope);
            }
            self.ring.notify.notified().await;
        }
    }

    /// Non-blocking poll, for tests and draining without awaiting.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.ring.try_pop()
    }

    /// Events dropped for this subscriber since it was created: the oldest
    /// entries evicted to make room for newer ones while the ring was full.
    pub fn dropped_count(&self) -> u64 {
        self.ring.dropped.load(Ordering::Relaxed)
    }
}

/// Fan-out hub: one bounded ring buffer per subscriber per channel
#[derive(Default)]
pub struct EventHub {
    subscribers: DashMap<Channel, DashMap<u64, Arc<Ring>>>,
    next_id: AtomicU64,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: Channel) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let ring = Arc::new(Ring::new());

        self.subscribers.entry(channel).or_default().insert(id, ring.clone());

        Subscription { id, channel, ring }
    }

    pub fn unsubscribe(&self, channel: Channel, id: u64) {
        if let Some(queues) = self.subscribers.get(&channel) {
            queues.remove(&id);
        }
    }

    /// Publish to every subscriber of `channel`. Each subscriber's ring
    /// evicts its own oldest entry to make room when full, so a slow
    /// subscriber only ever loses stale events, never the newest one.
    pub fn publish(&self, channel: Channel, event_type: &str, data: Value) {
        let Some(queues) = self.subscribers.get(&channel) else {
            return;
        };

        let envelope = Envelope {
            event_type: event_type.to_owned(),
            data,
            timestamp: cascadeflow_core::time::to_epoch_millis(now()),
        };

        for entry in queues.iter() {
            entry.value().push(envelope.clone());
        }
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.subscribers.get(&channel).map_or(0, |q| q.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe(Channel::Budget);
        hub.publish(Channel::Budget, "budget_update", serde_json::json!({"percentUsed": 50}));

        let envelope = sub.recv().await.expect("event delivered");
        assert_eq!(envelope.event_type, "budget_update");
    }

    #[tokio::test]
    async fn full_queue_drops_oldest_not_newest() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe(Channel::Event);

        for i in 0..QUEUE_CAPACITY + 10 {
            hub.publish(Channel::Event, "tick", serde_json::json!({"i": i}));
        }

        assert_eq!(sub.dropped_count(), 10, "the 10 oldest ticks should have been evicted");

        let first = sub.try_recv().expect("ring should still hold the newest window");
        assert_eq!(first.data["i"], 10, "tick 0..10 were dropped, tick 10 should be oldest survivor");

        while sub.try_recv().is_some() {}
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let hub = EventHub::new();
        let mut cache_sub = hub.subscribe(Channel::Cache);
        hub.publish(Channel::Budget, "budget_update", serde_json::json!({}));

        assert!(cache_sub.try_recv().is_none());
    }
}
