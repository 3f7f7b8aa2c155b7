//! # Analytics Crate
//!
//! Read-side queries over the social graph. Nothing here mutates state; every
//! engine takes one read guard on the relation store per call, so each answer is
//! computed against a single consistent snapshot.
//!
//! ## Components
//!
//! ### RankingEngine
//! Most popular films by like count, optionally narrowed by genre and/or release
//! year, plus a director's films ordered by likes or by year.
//!
//! ### CommonSetEngine
//! Friends both users follow; films both users like (most popular first).
//!
//! ### RecommenderEngine
//! Single-neighbor collaborative filtering: find the user whose likes overlap the
//! target's the most, suggest what they liked that the target has not.
//!
//! ### filters
//! Composable catalog predicates used by the ranking engine.
//!
//! ## Example Usage
//!
//! ```ignore
//! use analytics::{FilterPipeline, RankingEngine, RecommenderEngine};
//! use std::sync::Arc;
//!
//! let ranking = RankingEngine::new(relations.clone(), catalog.clone());
//! let top_dramas = ranking.most_popular(10, &FilterPipeline::popular(Some(Genre::Drama), None))?;
//!
//! let recommender = RecommenderEngine::new(relations.clone()).with_min_overlap(1);
//! let films = recommender.recommend(user_id);
//! ```

pub mod common;
pub mod filters;
pub mod ranking;
pub mod recommender;

// Re-export commonly used types
pub use common::CommonSetEngine;
pub use filters::{FilmFilter, FilterPipeline};
pub use ranking::{DirectorSort, RankedFilm, RankingEngine, rank_by_likes, validate_limit};
pub use recommender::{Neighbor, RecommenderEngine, Suggestion};
