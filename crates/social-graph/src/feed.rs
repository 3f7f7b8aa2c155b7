//! Append-only per-user activity feed.
//!
//! The feed is the single writer of its own clock: event ids and timestamps are
//! assigned together under the write lock, so id order, insertion order, and
//! timestamp order always agree.

use crate::error::{GraphError, Result};
use crate::types::{Event, EventId, NewEvent, UserId};
use chrono::Utc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The event sequence and its id/clock state
#[derive(Debug, Default, Clone)]
pub struct Journal {
    events: Vec<Event>,
    last_id: EventId,
    last_timestamp: i64,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event observed at wall-clock `now_millis`.
    ///
    /// Timestamps are strictly increasing: a clock that stalls or steps backwards
    /// yields `last + 1`.
    pub fn append(&mut self, event: NewEvent, now_millis: i64) -> Event {
        self.last_id += 1;
        self.last_timestamp = now_millis.max(self.last_timestamp + 1);

        let event = Event {
            event_id: self.last_id,
            user_id: event.user_id,
            entity_id: event.entity_id,
            event_type: event.event_type,
            operation: event.operation,
            timestamp: self.last_timestamp,
        };
        self.events.push(event);
        event
    }

    /// Every event of the user, oldest first
    pub fn feed_of(&self, user_id: UserId) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.user_id == user_id)
    }

    /// Events of the user strictly after `after` (an event id), at most `limit` of them
    pub fn page(&self, user_id: UserId, after: Option<EventId>, limit: usize) -> Vec<Event> {
        let after = after.unwrap_or(0);
        self.feed_of(user_id)
            .filter(|e| e.event_id > after)
            .take(limit)
            .copied()
            .collect()
    }

    /// Account teardown: drops the user's events. The id counter never rewinds.
    pub fn purge_user(&mut self, user_id: UserId) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.user_id != user_id);
        before - self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Shared, lock-protected [`Journal`]
#[derive(Debug, Default)]
pub struct FeedLog {
    inner: RwLock<Journal>,
}

impl FeedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Journal> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Journal> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event stamped with the current time
    pub fn record(&self, event: NewEvent) -> Event {
        self.write().append(event, Utc::now().timestamp_millis())
    }

    /// Complete history of the user in insertion order
    pub fn feed_of(&self, user_id: UserId) -> Vec<Event> {
        self.read().feed_of(user_id).copied().collect()
    }

    /// One page of the user's history. `limit` must be positive.
    pub fn feed_page(
        &self,
        user_id: UserId,
        after: Option<EventId>,
        limit: usize,
    ) -> Result<Vec<Event>> {
        if limit == 0 {
            return Err(GraphError::invalid("feed page size must be positive"));
        }
        Ok(self.read().page(user_id, after, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventType, Operation};

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut journal = Journal::new();
        let first = journal.append(NewEvent::like(1, 10, Operation::Add), 1000);
        let second = journal.append(NewEvent::like(2, 10, Operation::Add), 1000);

        assert_eq!(first.event_id, 1);
        assert_eq!(second.event_id, 2);
        assert!(second.timestamp > first.timestamp);
    }

    #[test]
    fn test_clock_going_backwards_keeps_order() {
        let mut journal = Journal::new();
        let first = journal.append(NewEvent::like(1, 10, Operation::Add), 5000);
        let second = journal.append(NewEvent::like(1, 11, Operation::Add), 4000);

        assert_eq!(first.timestamp, 5000);
        assert_eq!(second.timestamp, 5001);
    }

    #[test]
    fn test_feed_is_per_user_and_ordered() {
        let feed = FeedLog::new();
        feed.record(NewEvent::like(1, 10, Operation::Add));
        feed.record(NewEvent::friend(2, 1, Operation::Add));
        feed.record(NewEvent::like(1, 10, Operation::Remove));

        let events = feed.feed_of(1);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.user_id == 1));
        assert_eq!(events[0].operation, Operation::Add);
        assert_eq!(events[1].operation, Operation::Remove);
        assert!(events.windows(2).all(|w| w[0].event_id < w[1].event_id));
    }

    #[test]
    fn test_feed_does_not_deduplicate() {
        let feed = FeedLog::new();
        feed.record(NewEvent::like(1, 10, Operation::Add));
        feed.record(NewEvent::like(1, 10, Operation::Add));

        assert_eq!(feed.feed_of(1).len(), 2);
    }

    #[test]
    fn test_feed_page() {
        let feed = FeedLog::new();
        for film_id in 1..=5 {
            feed.record(NewEvent::like(1, film_id, Operation::Add));
        }

        let first = feed.feed_page(1, None, 2).unwrap();
        assert_eq!(first.iter().map(|e| e.entity_id).collect::<Vec<_>>(), vec![1, 2]);

        let next = feed.feed_page(1, Some(first[1].event_id), 10).unwrap();
        assert_eq!(next.iter().map(|e| e.entity_id).collect::<Vec<_>>(), vec![3, 4, 5]);

        assert!(feed.feed_page(1, None, 0).is_err());
    }

    #[test]
    fn test_purge_user_keeps_other_feeds_and_ids() {
        let feed = FeedLog::new();
        feed.record(NewEvent::like(1, 10, Operation::Add));
        feed.record(NewEvent::review(2, 7, Operation::Add));

        assert_eq!(feed.write().purge_user(1), 1);
        assert!(feed.feed_of(1).is_empty());

        let next = feed.record(NewEvent::review(2, 7, Operation::Update));
        assert_eq!(next.event_id, 3);
        let events = feed.feed_of(2);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Review);
    }

    #[test]
    fn test_concurrent_appends_stay_monotonic() {
        let feed = std::sync::Arc::new(FeedLog::new());
        let handles: Vec<_> = (0..4)
            .map(|user_id| {
                let feed = std::sync::Arc::clone(&feed);
                std::thread::spawn(move || {
                    for film_id in 0..50 {
                        feed.record(NewEvent::like(user_id, film_id, Operation::Add));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let journal = feed.read();
        assert_eq!(journal.len(), 200);
        for user_id in 0..4 {
            let events: Vec<_> = journal.feed_of(user_id).collect();
            assert_eq!(events.len(), 50);
            assert!(events.windows(2).all(|w| {
                w[0].event_id < w[1].event_id && w[0].timestamp < w[1].timestamp
            }));
        }
    }
}
