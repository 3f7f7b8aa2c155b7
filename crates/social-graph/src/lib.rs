//! # Social Graph Crate
//!
//! The relation model and activity feed behind the film social features.
//!
//! ## Main Components
//!
//! - **types**: Ids, catalog entities, edges, and feed events
//! - **relations**: Like and friend edge sets ([`RelationStore`])
//! - **feed**: Append-only per-user journal ([`FeedLog`])
//! - **graph**: Unit of work pairing each edge change with its event ([`SocialGraph`])
//! - **catalog**: The entity-lookup collaborator trait and an in-memory catalog
//! - **parser** / **dataset**: Loading `::`-delimited dataset files
//! - **error**: Error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use social_graph::{FeedLog, RelationStore, SocialGraph};
//! use std::sync::Arc;
//!
//! let graph = SocialGraph::new(Arc::new(RelationStore::new()), Arc::new(FeedLog::new()));
//! graph.like(1, 10);
//! graph.befriend(1, 2)?;
//!
//! assert!(graph.relations().likes_of(1).contains(&10));
//! assert_eq!(graph.feed().feed_of(1).len(), 2);
//! ```

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod feed;
pub mod graph;
pub mod parser;
pub mod relations;
pub mod types;

pub use catalog::{Catalog, InMemoryCatalog};
pub use dataset::Dataset;
pub use error::{GraphError, Result};
pub use feed::{FeedLog, Journal};
pub use graph::SocialGraph;
pub use relations::{RelationStore, Relations};
pub use types::{
    // Type aliases
    DirectorId,
    EventId,
    FilmId,
    ReviewId,
    UserId,
    // Core types
    Event,
    EventType,
    Film,
    FriendEdge,
    Genre,
    LikeEdge,
    NewEvent,
    Operation,
    User,
};
