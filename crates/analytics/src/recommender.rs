//! Single-neighbor collaborative filtering.
//!
//! "The user who liked most of what you liked also liked these films."
//!
//! ## Algorithm
//! 1. Take the target user's liked films. No likes means no recommendation.
//! 2. For every other user with likes, count the overlap with the target's set.
//!    Users whose likes are a subset of the target's are skipped entirely: they
//!    have nothing to suggest.
//! 3. Pick the user with the largest overlap (at least `min_overlap`, zero by
//!    default). Among equal overlaps the lowest user id wins.
//! 4. Suggest that neighbor's films the target does not like yet, ascending by id.
//!
//! Everything is recomputed from the relation snapshot on each call.

use rayon::prelude::*;
use social_graph::{FilmId, RelationStore, Relations, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The user chosen as the basis for suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub user_id: UserId,
    pub overlap: usize,
}

/// Outcome of one recommendation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestion {
    pub neighbor: Option<Neighbor>,
    pub films: Vec<FilmId>,
}

pub struct RecommenderEngine {
    /// Shared relation store (read-only here)
    relations: Arc<RelationStore>,

    /// Minimum number of shared likes for a user to count as a neighbor
    min_overlap: usize,
}

impl RecommenderEngine {
    pub fn new(relations: Arc<RelationStore>) -> Self {
        Self {
            relations,
            min_overlap: 0,
        }
    }

    /// Configure the minimum overlap (default: 0, so a user sharing nothing can
    /// still act as neighbor when nobody overlaps).
    pub fn with_min_overlap(mut self, min: usize) -> Self {
        self.min_overlap = min;
        self
    }

    /// Films suggested for the user; never contains a film the user already likes
    pub fn recommend(&self, user_id: UserId) -> Vec<FilmId> {
        self.suggest(user_id).films
    }

    /// Neighbor and suggested films for a user.
    ///
    /// # Arguments
    /// * `user_id` - Target user; unknown or like-less users get nothing
    ///
    /// # Returns
    /// A [`Suggestion`] whose `neighbor` is `None` when no user qualified.
    #[instrument(skip(self))]
    pub fn suggest(&self, user_id: UserId) -> Suggestion {
        let relations = self.relations.read();
        let target = relations.likes_of(user_id);
        if target.is_empty() {
            debug!("User {} has no likes, nothing to compare against", user_id);
            return Suggestion::default();
        }

        let Some(neighbor) = self.find_neighbor(&relations, user_id, target) else {
            debug!("No qualifying neighbor for user {}", user_id);
            return Suggestion::default();
        };

        let films: Vec<FilmId> = relations
            .likes_of(neighbor.user_id)
            .difference(target)
            .copied()
            .collect();
        debug!(
            "Neighbor {} (overlap {}) suggests {} films",
            neighbor.user_id,
            neighbor.overlap,
            films.len()
        );

        Suggestion {
            neighbor: Some(neighbor),
            films,
        }
    }

    /// Best neighbor by (overlap desc, user id asc)
    fn find_neighbor(
        &self,
        relations: &Relations,
        user_id: UserId,
        target: &BTreeSet<FilmId>,
    ) -> Option<Neighbor> {
        let others: Vec<(UserId, &BTreeSet<FilmId>)> = relations
            .users_with_likes()
            .filter(|&(other, _)| other != user_id)
            .collect();

        others
            .par_iter()
            .filter(|(_, films)| !films.is_subset(target))
            .map(|&(other, films)| Neighbor {
                user_id: other,
                overlap: films.intersection(target).count(),
            })
            .filter(|neighbor| neighbor.overlap >= self.min_overlap)
            .max_by(|a, b| {
                a.overlap
                    .cmp(&b.overlap)
                    .then_with(|| b.user_id.cmp(&a.user_id))
            })
    }
}
