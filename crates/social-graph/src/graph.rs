//! Unit of work over the relation store and the feed.
//!
//! Every state-changing action takes the relation write lock and then the feed
//! write lock, applies the edge change, appends the matching event, and releases
//! both. Readers of either store therefore never see an edge without its event or
//! an event without its edge. The lock order is fixed (relations, then feed).
//!
//! Events are appended on every call, including idempotent repeats: the feed is a
//! journal of what users did, not of what changed.

use crate::error::Result;
use crate::feed::FeedLog;
use crate::relations::RelationStore;
use crate::types::{Event, FilmId, NewEvent, Operation, ReviewId, UserId};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Write side of the social graph
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    relations: Arc<RelationStore>,
    feed: Arc<FeedLog>,
}

impl SocialGraph {
    pub fn new(relations: Arc<RelationStore>, feed: Arc<FeedLog>) -> Self {
        Self { relations, feed }
    }

    pub fn relations(&self) -> &Arc<RelationStore> {
        &self.relations
    }

    pub fn feed(&self) -> &Arc<FeedLog> {
        &self.feed
    }

    pub fn like(&self, user_id: UserId, film_id: FilmId) -> Event {
        let mut relations = self.relations.write();
        let mut journal = self.feed.write();

        relations.add_like(user_id, film_id);
        let event = journal.append(
            NewEvent::like(user_id, film_id, Operation::Add),
            Utc::now().timestamp_millis(),
        );
        info!("Film {} liked by user {}", film_id, user_id);
        event
    }

    pub fn unlike(&self, user_id: UserId, film_id: FilmId) -> Event {
        let mut relations = self.relations.write();
        let mut journal = self.feed.write();

        relations.remove_like(user_id, film_id);
        let event = journal.append(
            NewEvent::like(user_id, film_id, Operation::Remove),
            Utc::now().timestamp_millis(),
        );
        info!("Like of film {} removed by user {}", film_id, user_id);
        event
    }

    /// Fails with `InvalidArgument` for a self edge; nothing is recorded then.
    pub fn befriend(&self, user_id: UserId, friend_id: UserId) -> Result<Event> {
        let mut relations = self.relations.write();
        let mut journal = self.feed.write();

        relations.add_friend(user_id, friend_id)?;
        let event = journal.append(
            NewEvent::friend(user_id, friend_id, Operation::Add),
            Utc::now().timestamp_millis(),
        );
        info!("User {} added user {} as a friend", user_id, friend_id);
        Ok(event)
    }

    pub fn unfriend(&self, user_id: UserId, friend_id: UserId) -> Event {
        let mut relations = self.relations.write();
        let mut journal = self.feed.write();

        relations.remove_friend(user_id, friend_id);
        let event = journal.append(
            NewEvent::friend(user_id, friend_id, Operation::Remove),
            Utc::now().timestamp_millis(),
        );
        info!("User {} removed user {} from friends", user_id, friend_id);
        event
    }

    /// Reviews live outside the graph; only their lifecycle is journaled.
    pub fn review(&self, user_id: UserId, review_id: ReviewId, operation: Operation) -> Event {
        let event = self.feed.record(NewEvent::review(user_id, review_id, operation));
        info!("Review {} of user {}: {}", review_id, user_id, operation);
        event
    }

    /// Account teardown: removes every edge touching the user and their feed
    pub fn purge_user(&self, user_id: UserId) {
        let mut relations = self.relations.write();
        let mut journal = self.feed.write();

        relations.purge_user(user_id);
        let dropped = journal.purge_user(user_id);
        debug!("Purged user {} ({} feed events dropped)", user_id, dropped);
    }

    pub fn purge_film(&self, film_id: FilmId) {
        self.relations.write().purge_film(film_id);
        debug!("Purged likes of film {}", film_id);
    }
}
