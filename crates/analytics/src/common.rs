//! Set intersections between two users.

use crate::ranking::rank_by_likes;
use social_graph::{FilmId, RelationStore, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// "Common friends" and "common films" between two users.
///
/// Both answers are symmetric in their arguments and empty for unknown users.
pub struct CommonSetEngine {
    relations: Arc<RelationStore>,
}

impl CommonSetEngine {
    pub fn new(relations: Arc<RelationStore>) -> Self {
        Self { relations }
    }

    /// Users both `a` and `b` list as friends (outbound edges on each side)
    #[instrument(skip(self))]
    pub fn common_friends(&self, a: UserId, b: UserId) -> BTreeSet<UserId> {
        let relations = self.relations.read();
        let common: BTreeSet<UserId> = relations
            .friends_of(a)
            .intersection(relations.friends_of(b))
            .copied()
            .collect();
        debug!("Users {} and {} share {} friends", a, b, common.len());
        common
    }

    /// Films both users like.
    ///
    /// # Returns
    /// The intersection of the two like sets, most liked first, ties broken by
    /// ascending film id. Empty when either user likes nothing.
    #[instrument(skip(self))]
    pub fn common_films(&self, a: UserId, b: UserId) -> Vec<FilmId> {
        let relations = self.relations.read();
        let shared: Vec<FilmId> = relations
            .likes_of(a)
            .intersection(relations.likes_of(b))
            .copied()
            .collect();
        debug!("Users {} and {} share {} liked films", a, b, shared.len());

        rank_by_likes(&relations, &shared)
            .into_iter()
            .map(|ranked| ranked.film_id)
            .collect()
    }
}
