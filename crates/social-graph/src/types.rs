//! Core domain types for the film social graph.
//!
//! Ids are plain `u32` aliases, as the surrounding catalog hands them out.
//! Edges carry no payload beyond their endpoints; events are immutable records
//! owned by the feed.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a film
pub type FilmId = u32;

/// Unique identifier for a director
pub type DirectorId = u32;

/// Unique identifier for a review (only ever seen as an event entity id here)
pub type ReviewId = u32;

/// Surrogate key assigned by the feed at append time
pub type EventId = u64;

// =============================================================================
// Catalog entities
// =============================================================================

/// A user as known to the catalog collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub name: String,
}

/// Film genres, numbered the way the catalog stores them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Comedy,
    Drama,
    Animation,
    Thriller,
    Documentary,
    Action,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Comedy,
        Genre::Drama,
        Genre::Animation,
        Genre::Thriller,
        Genre::Documentary,
        Genre::Action,
    ];

    /// Catalog id of this genre (1-based)
    pub fn id(self) -> u32 {
        match self {
            Genre::Comedy => 1,
            Genre::Drama => 2,
            Genre::Animation => 3,
            Genre::Thriller => 4,
            Genre::Documentary => 5,
            Genre::Action => 6,
        }
    }

    pub fn from_id(id: u32) -> Option<Genre> {
        Genre::ALL.into_iter().find(|g| g.id() == id)
    }
}

/// A film as known to the catalog collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub release_date: NaiveDate,
    pub genres: Vec<Genre>,
    pub directors: Vec<DirectorId>,
}

impl Film {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }
}

// =============================================================================
// Relations
// =============================================================================

/// A user liked a film
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LikeEdge {
    pub user_id: UserId,
    pub film_id: FilmId,
}

/// A user follows another user. Directed: the reverse edge is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FriendEdge {
    pub user_id: UserId,
    pub friend_id: UserId,
}

// =============================================================================
// Feed events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Like,
    Friend,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Like => "LIKE",
            EventType::Friend => "FRIEND",
            EventType::Review => "REVIEW",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Add => "ADD",
            Operation::Remove => "REMOVE",
            Operation::Update => "UPDATE",
        };
        f.write_str(s)
    }
}

/// What a caller hands to the feed; id and timestamp are filled in on append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEvent {
    pub user_id: UserId,
    pub entity_id: u32,
    pub event_type: EventType,
    pub operation: Operation,
}

impl NewEvent {
    pub fn like(user_id: UserId, film_id: FilmId, operation: Operation) -> Self {
        Self {
            user_id,
            entity_id: film_id,
            event_type: EventType::Like,
            operation,
        }
    }

    pub fn friend(user_id: UserId, friend_id: UserId, operation: Operation) -> Self {
        Self {
            user_id,
            entity_id: friend_id,
            event_type: EventType::Friend,
            operation,
        }
    }

    pub fn review(user_id: UserId, review_id: ReviewId, operation: Operation) -> Self {
        Self {
            user_id,
            entity_id: review_id,
            event_type: EventType::Review,
            operation,
        }
    }
}

/// An immutable entry of a user's feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: EventId,
    pub user_id: UserId,
    pub entity_id: u32,
    pub event_type: EventType,
    pub operation: Operation,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}
