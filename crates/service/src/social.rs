//! # Social Service
//!
//! The facade the request layer talks to. It coordinates:
//! 1. Existence checks against the catalog (unknown ids become `NotFound`)
//! 2. Mutations through the [`SocialGraph`] unit of work
//! 3. Read queries through the analytics engines
//! 4. Enrichment of bare ids with catalog metadata
//!
//! Recommendations are CPU-bound (a scan over every user's likes) and run on the
//! blocking pool so async callers are never stalled.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use analytics::{
    CommonSetEngine, DirectorSort, FilterPipeline, RankingEngine, RecommenderEngine,
    validate_limit,
};
use social_graph::{
    Catalog, Dataset, DirectorId, Event, EventId, FeedLog, Film, FilmId, Genre, GraphError,
    Operation, ReviewId, SocialGraph, User, UserId,
};

use crate::config::ServiceConfig;

/// A suggested film with the reason it was suggested
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmRecommendation {
    pub film_id: FilmId,
    pub name: String,
    pub year: i32,
    pub genres: Vec<String>,
    pub neighbor_id: UserId,
    pub explanation: String,
}

/// Entry point for every social operation
#[derive(Clone)]
pub struct SocialService {
    catalog: Arc<dyn Catalog>,
    graph: SocialGraph,
    ranking: Arc<RankingEngine>,
    common: Arc<CommonSetEngine>,
    recommender: Arc<RecommenderEngine>,
    config: ServiceConfig,
}

impl SocialService {
    /// Wire the engines around a catalog and an existing graph
    pub fn new(catalog: Arc<dyn Catalog>, graph: SocialGraph, config: ServiceConfig) -> Self {
        let relations = Arc::clone(graph.relations());
        let ranking = RankingEngine::new(Arc::clone(&relations), Arc::clone(&catalog));
        let common = CommonSetEngine::new(Arc::clone(&relations));
        let recommender = RecommenderEngine::new(relations).with_min_overlap(config.min_overlap);

        Self {
            catalog,
            graph,
            ranking: Arc::new(ranking),
            common: Arc::new(common),
            recommender: Arc::new(recommender),
            config,
        }
    }

    /// Seed the relation store from a loaded dataset. The feed starts empty.
    pub fn from_dataset(dataset: Dataset, config: ServiceConfig) -> Self {
        let relations = Arc::new(dataset.relation_store());
        let graph = SocialGraph::new(relations, Arc::new(FeedLog::new()));
        Self::new(Arc::new(dataset.catalog), graph, config)
    }

    /// Start from an empty graph and push every loaded edge through the
    /// mutation path, so the feed holds one event per like and friendship.
    ///
    /// # Arguments
    /// * `dataset` - Loaded catalog and edges
    /// * `config` - Service tunables
    ///
    /// # Returns
    /// A service whose relations match the dataset's valid edges. Likes are
    /// replayed before friendships, each in file order. Edges the graph rejects
    /// (a self friendship, say) are logged and skipped.
    pub fn replay_dataset(dataset: Dataset, config: ServiceConfig) -> Self {
        let Dataset {
            catalog,
            likes,
            friends,
        } = dataset;
        let service = Self::new(Arc::new(catalog), SocialGraph::default(), config);

        let mut skipped = 0;
        for like in &likes {
            if let Err(err) = service.add_like(like.user_id, like.film_id) {
                warn!("Skipping like {:?}: {:#}", like, err);
                skipped += 1;
            }
        }
        for friend in &friends {
            if let Err(err) = service.add_friend(friend.user_id, friend.friend_id) {
                warn!("Skipping friendship {:?}: {:#}", friend, err);
                skipped += 1;
            }
        }

        info!(
            "Replayed {} likes and {} friendships ({} skipped)",
            likes.len(),
            friends.len(),
            skipped
        );
        service
    }

    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add_like(&self, user_id: UserId, film_id: FilmId) -> Result<Event> {
        self.catalog.require_film(film_id)?;
        self.catalog.require_user(user_id)?;
        Ok(self.graph.like(user_id, film_id))
    }

    pub fn remove_like(&self, user_id: UserId, film_id: FilmId) -> Result<Event> {
        self.catalog.require_film(film_id)?;
        self.catalog.require_user(user_id)?;
        Ok(self.graph.unlike(user_id, film_id))
    }

    pub fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<Event> {
        self.catalog.require_user(user_id)?;
        self.catalog.require_user(friend_id)?;
        let event = self
            .graph
            .befriend(user_id, friend_id)
            .with_context(|| format!("User {} cannot befriend user {}", user_id, friend_id))?;
        Ok(event)
    }

    pub fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<Event> {
        self.catalog.require_user(user_id)?;
        self.catalog.require_user(friend_id)?;
        Ok(self.graph.unfriend(user_id, friend_id))
    }

    pub fn review_added(&self, user_id: UserId, review_id: ReviewId) -> Result<Event> {
        self.review(user_id, review_id, Operation::Add)
    }

    pub fn review_updated(&self, user_id: UserId, review_id: ReviewId) -> Result<Event> {
        self.review(user_id, review_id, Operation::Update)
    }

    pub fn review_removed(&self, user_id: UserId, review_id: ReviewId) -> Result<Event> {
        self.review(user_id, review_id, Operation::Remove)
    }

    fn review(&self, user_id: UserId, review_id: ReviewId, operation: Operation) -> Result<Event> {
        self.catalog.require_user(user_id)?;
        Ok(self.graph.review(user_id, review_id, operation))
    }

    /// Drop every edge and feed event of a user that is being deleted
    pub fn purge_user(&self, user_id: UserId) -> Result<()> {
        self.catalog.require_user(user_id)?;
        self.graph.purge_user(user_id);
        info!("Purged social data of user {}", user_id);
        Ok(())
    }

    /// Drop every like of a film that is being deleted
    pub fn purge_film(&self, film_id: FilmId) -> Result<()> {
        self.catalog.require_film(film_id)?;
        self.graph.purge_film(film_id);
        info!("Purged likes of film {}", film_id);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Users this user has added as friends, ascending by id
    pub fn friends(&self, user_id: UserId) -> Result<Vec<User>> {
        self.catalog.require_user(user_id)?;
        let ids = self.graph.relations().friends_of(user_id);
        Ok(self.users(ids))
    }

    pub fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>> {
        self.catalog.require_user(user_id)?;
        self.catalog.require_user(other_id)?;
        let ids = self.common.common_friends(user_id, other_id);
        Ok(self.users(ids))
    }

    pub fn common_films(&self, user_id: UserId, other_id: UserId) -> Result<Vec<Film>> {
        self.catalog.require_user(user_id)?;
        self.catalog.require_user(other_id)?;
        let ids = self.common.common_films(user_id, other_id);
        Ok(self.films(ids))
    }

    /// Most liked films, optionally narrowed by genre id and release year.
    ///
    /// A missing `limit` means the configured default; zero or negative is an
    /// `InvalidArgument`.
    #[instrument(skip(self))]
    pub fn popular(
        &self,
        limit: Option<i64>,
        genre_id: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Film>> {
        let limit = match limit {
            Some(limit) => validate_limit(limit)?,
            None => self.config.default_popular_limit,
        };
        let genre = genre_id
            .map(|id| {
                Genre::from_id(id).ok_or(GraphError::NotFound {
                    entity: "Genre",
                    id,
                })
            })
            .transpose()?;

        let pipeline = FilterPipeline::popular(genre, year);
        let ids = self.ranking.most_popular(limit, &pipeline)?;
        Ok(self.films(ids))
    }

    /// Films of a director sorted by `"likes"` or `"year"`
    pub fn director_films(&self, director_id: DirectorId, sort_by: &str) -> Result<Vec<Film>> {
        let sort: DirectorSort = sort_by.parse()?;
        let ids = self
            .ranking
            .director_films(director_id, sort)
            .with_context(|| format!("Failed to list films of director {}", director_id))?;
        Ok(self.films(ids))
    }

    /// Suggested films for a user, enriched with catalog metadata.
    ///
    /// ## Algorithm
    /// 1. Check the user exists
    /// 2. Pick the neighbor on the blocking pool (largest like overlap, lowest id
    ///    on ties, users whose likes are a subset of the target's skipped)
    /// 3. Attach name, year, genres and an explanation to each suggested film
    ///
    /// An empty list means no user qualified as a neighbor.
    pub async fn recommendations(&self, user_id: UserId) -> Result<Vec<FilmRecommendation>> {
        let start_time = Instant::now();
        self.catalog.require_user(user_id)?;

        let recommender = Arc::clone(&self.recommender);
        let suggestion = tokio::task::spawn_blocking(move || recommender.suggest(user_id))
            .await
            .context("Recommendation task panicked")?;

        let Some(neighbor) = suggestion.neighbor else {
            info!("No recommendations for user {}", user_id);
            return Ok(Vec::new());
        };

        let recommendations: Vec<FilmRecommendation> = suggestion
            .films
            .into_iter()
            .filter_map(|film_id| {
                let film = self.catalog.film(film_id)?;
                Some(FilmRecommendation {
                    film_id,
                    name: film.name.clone(),
                    year: film.release_year(),
                    genres: film.genres.iter().map(|g| format!("{:?}", g)).collect(),
                    neighbor_id: neighbor.user_id,
                    explanation: format!(
                        "Liked by user {}, who shares {} of your liked films",
                        neighbor.user_id, neighbor.overlap
                    ),
                })
            })
            .collect();

        info!(
            "Recommended {} films to user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Full activity history of a user, oldest first
    pub fn feed(&self, user_id: UserId) -> Result<Vec<Event>> {
        self.catalog.require_user(user_id)?;
        Ok(self.graph.feed().feed_of(user_id))
    }

    /// One page of a user's history, oldest first.
    ///
    /// # Arguments
    /// * `user_id` - Whose feed to read; unknown users are `NotFound`
    /// * `after` - Exclusive cursor: only events with a larger id are returned
    /// * `limit` - Page size, capped by `max_feed_page` (the cap when absent)
    ///
    /// # Returns
    /// At most `limit` events. Pass the last event id back as `after` to
    /// continue.
    pub fn feed_page(
        &self,
        user_id: UserId,
        after: Option<EventId>,
        limit: Option<usize>,
    ) -> Result<Vec<Event>> {
        self.catalog.require_user(user_id)?;
        let limit = limit
            .unwrap_or(self.config.max_feed_page)
            .min(self.config.max_feed_page);
        let page = self.graph.feed().feed_page(user_id, after, limit)?;
        debug!("Feed page for user {}: {} events", user_id, page.len());
        Ok(page)
    }

    fn users(&self, ids: impl IntoIterator<Item = UserId>) -> Vec<User> {
        ids.into_iter()
            .filter_map(|id| self.catalog.user(id).cloned())
            .collect()
    }

    fn films(&self, ids: impl IntoIterator<Item = FilmId>) -> Vec<Film> {
        ids.into_iter()
            .filter_map(|id| self.catalog.film(id).cloned())
            .collect()
    }
}

impl std::fmt::Debug for SocialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
