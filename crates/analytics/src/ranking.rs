//! Popularity ranking.
//!
//! ## Algorithm
//! 1. Candidate films come from the catalog, seeded from its genre/year/director
//!    indices when the [`FilterPipeline`] has such a filter, then narrowed by it
//! 2. Each candidate is scored by its like count (zero-like films stay in)
//! 3. Sort by like count descending, then film id ascending
//! 4. Truncate to the requested limit
//!
//! The id tie-break makes the order a pure function of the relation snapshot.

use crate::filters::{DirectorFilter, FilterPipeline};
use rayon::prelude::*;
use social_graph::{Catalog, DirectorId, FilmId, GraphError, RelationStore, Relations, Result};
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A film with its like count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedFilm {
    pub film_id: FilmId,
    pub likes: usize,
}

impl RankedFilm {
    /// Popularity order: more likes first, lower id first among equals
    pub fn popularity_cmp(&self, other: &Self) -> Ordering {
        other
            .likes
            .cmp(&self.likes)
            .then_with(|| self.film_id.cmp(&other.film_id))
    }
}

/// Score films by like count and return them in popularity order
pub fn rank_by_likes(relations: &Relations, film_ids: &[FilmId]) -> Vec<RankedFilm> {
    let mut ranked: Vec<RankedFilm> = film_ids
        .par_iter()
        .map(|&film_id| RankedFilm {
            film_id,
            likes: relations.like_count(film_id),
        })
        .collect();
    ranked.sort_unstable_by(RankedFilm::popularity_cmp);
    ranked
}

/// Turn a caller-supplied limit into a list size. Zero and negatives are rejected.
pub fn validate_limit(limit: i64) -> Result<usize> {
    if limit <= 0 {
        return Err(GraphError::invalid(format!(
            "limit must be positive, got {}",
            limit
        )));
    }
    usize::try_from(limit).map_err(|_| GraphError::invalid(format!("limit {} is too large", limit)))
}

/// How a director's films are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorSort {
    /// Popularity order
    Likes,
    /// Release date ascending, film id among equals
    Year,
}

impl FromStr for DirectorSort {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "likes" => Ok(DirectorSort::Likes),
            "year" => Ok(DirectorSort::Year),
            other => Err(GraphError::invalid(format!(
                "unknown sort order '{}', expected 'likes' or 'year'",
                other
            ))),
        }
    }
}

/// Ranks catalog films by how many users like them
pub struct RankingEngine {
    relations: Arc<RelationStore>,
    catalog: Arc<dyn Catalog>,
}

impl RankingEngine {
    pub fn new(relations: Arc<RelationStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { relations, catalog }
    }

    /// The `limit` most liked films passing `filters`.
    ///
    /// # Arguments
    /// * `limit` - Maximum number of films to return; zero is an `InvalidArgument`
    /// * `filters` - Catalog predicate; its indexed filters also pick the candidates
    ///
    /// # Returns
    /// Film ids by like count descending, then id ascending. Fewer candidates than
    /// `limit` returns them all, zero-like films included.
    #[instrument(skip(self, filters), fields(filtered = !filters.is_empty()))]
    pub fn most_popular(&self, limit: usize, filters: &FilterPipeline) -> Result<Vec<FilmId>> {
        if limit == 0 {
            return Err(GraphError::invalid("limit must be positive, got 0"));
        }

        let candidates = filters.select(self.catalog.as_ref());
        debug!("Ranking {} candidate films", candidates.len());

        let relations = self.relations.read();
        Ok(rank_by_likes(&relations, &candidates)
            .into_iter()
            .take(limit)
            .map(|ranked| ranked.film_id)
            .collect())
    }

    /// All films of a director, in the requested order
    #[instrument(skip(self))]
    pub fn director_films(&self, director: DirectorId, sort: DirectorSort) -> Result<Vec<FilmId>> {
        self.catalog.require_director(director)?;

        let pipeline = FilterPipeline::new().add_filter(DirectorFilter::new(director));
        let mut films = pipeline.select(self.catalog.as_ref());

        match sort {
            DirectorSort::Likes => {
                let relations = self.relations.read();
                films = rank_by_likes(&relations, &films)
                    .into_iter()
                    .map(|ranked| ranked.film_id)
                    .collect();
            }
            DirectorSort::Year => {
                let catalog = self.catalog.as_ref();
                films.sort_by_key(|&id| (catalog.film(id).map(|f| f.release_date), id));
            }
        }
        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use social_graph::{Film, Genre, InMemoryCatalog};

    fn create_test_engine(likes: &[(u32, FilmId)]) -> RankingEngine {
        let mut catalog = InMemoryCatalog::new();
        let films = [
            (1, 2001, Genre::Drama, 7),
            (2, 1999, Genre::Comedy, 7),
            (3, 1999, Genre::Drama, 8),
            (4, 2010, Genre::Action, 7),
        ];
        for (id, year, genre, director) in films {
            catalog.insert_film(Film {
                id,
                name: format!("Film {}", id),
                release_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                genres: vec![genre],
                directors: vec![director],
            });
        }

        let relations = RelationStore::new();
        for &(user_id, film_id) in likes {
            relations.add_like(user_id, film_id);
        }
        RankingEngine::new(Arc::new(relations), Arc::new(catalog))
    }

    #[test]
    fn test_ties_break_by_film_id() {
        // Films 3 and 2 both have two likes, film 1 has one
        let engine = create_test_engine(&[(1, 3), (2, 3), (1, 2), (2, 2), (3, 1)]);

        let top = engine.most_popular(2, &FilterPipeline::new()).unwrap();
        assert_eq!(top, vec![2, 3]);
    }

    #[test]
    fn test_zero_like_films_rank_last() {
        let engine = create_test_engine(&[(1, 4)]);

        let all = engine.most_popular(10, &FilterPipeline::new()).unwrap();
        assert_eq!(all, vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_non_positive_limit_is_rejected() {
        let engine = create_test_engine(&[]);

        let err = engine.most_popular(0, &FilterPipeline::new()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(-1).is_err());
        assert_eq!(validate_limit(5).unwrap(), 5);
    }

    #[test]
    fn test_filters_narrow_candidates() {
        let engine = create_test_engine(&[(1, 1), (1, 3), (2, 3)]);

        let dramas = engine
            .most_popular(10, &FilterPipeline::popular(Some(Genre::Drama), None))
            .unwrap();
        assert_eq!(dramas, vec![3, 1]);

        let comedies_of_1999 = engine
            .most_popular(10, &FilterPipeline::popular(Some(Genre::Comedy), Some(1999)))
            .unwrap();
        assert_eq!(comedies_of_1999, vec![2]);

        let nothing = engine
            .most_popular(10, &FilterPipeline::popular(None, Some(1950)))
            .unwrap();
        assert!(nothing.is_empty());
    }

    #[test]
    fn test_ranking_is_repeatable() {
        let engine = create_test_engine(&[(1, 1), (2, 2), (3, 3), (4, 4)]);
        let pipeline = FilterPipeline::new();

        let first = engine.most_popular(3, &pipeline).unwrap();
        let second = engine.most_popular(3, &pipeline).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![1, 2, 3]);
    }

    #[test]
    fn test_director_films_by_likes_and_year() {
        let engine = create_test_engine(&[(1, 4), (2, 4), (1, 2)]);

        let by_likes = engine.director_films(7, DirectorSort::Likes).unwrap();
        assert_eq!(by_likes, vec![4, 2, 1]);

        let by_year = engine.director_films(7, DirectorSort::Year).unwrap();
        assert_eq!(by_year, vec![2, 1, 4]);

        assert!(engine.director_films(99, DirectorSort::Likes).unwrap_err().is_not_found());
    }

    /// Catalog that answers index lookups but refuses a full listing
    struct IndexOnlyCatalog(InMemoryCatalog);

    impl Catalog for IndexOnlyCatalog {
        fn film(&self, id: FilmId) -> Option<&Film> {
            self.0.film(id)
        }

        fn user(&self, id: u32) -> Option<&social_graph::User> {
            self.0.user(id)
        }

        fn film_ids(&self) -> Vec<FilmId> {
            Vec::new()
        }

        fn films_by_genre(&self, genre: Genre) -> Vec<FilmId> {
            self.0.films_by_genre(genre)
        }

        fn films_by_year(&self, year: i32) -> Vec<FilmId> {
            self.0.films_by_year(year)
        }

        fn films_by_director(&self, director: DirectorId) -> Vec<FilmId> {
            self.0.films_by_director(director)
        }

        fn has_director(&self, id: DirectorId) -> bool {
            self.0.has_director(id)
        }
    }

    #[test]
    fn test_filtered_queries_use_catalog_indices() {
        let mut inner = InMemoryCatalog::new();
        for (id, year, genre, director) in [
            (1, 1999, Genre::Drama, 7),
            (2, 1999, Genre::Comedy, 7),
            (3, 2005, Genre::Drama, 8),
        ] {
            inner.insert_film(Film {
                id,
                name: format!("Film {}", id),
                release_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                genres: vec![genre],
                directors: vec![director],
            });
        }
        let relations = RelationStore::new();
        relations.add_like(1, 3);
        let engine = RankingEngine::new(Arc::new(relations), Arc::new(IndexOnlyCatalog(inner)));

        let dramas = engine
            .most_popular(10, &FilterPipeline::popular(Some(Genre::Drama), None))
            .unwrap();
        assert_eq!(dramas, vec![3, 1]);

        let of_1999 = engine
            .most_popular(10, &FilterPipeline::popular(None, Some(1999)))
            .unwrap();
        assert_eq!(of_1999, vec![1, 2]);

        let by_year = engine.director_films(7, DirectorSort::Year).unwrap();
        assert_eq!(by_year, vec![1, 2]);

        // Without an indexed filter the full listing is the only source
        assert!(engine.most_popular(10, &FilterPipeline::new()).unwrap().is_empty());
    }

    #[test]
    fn test_director_sort_parsing() {
        assert_eq!("likes".parse::<DirectorSort>().unwrap(), DirectorSort::Likes);
        assert_eq!("year".parse::<DirectorSort>().unwrap(), DirectorSort::Year);
        assert!(matches!(
            "rating".parse::<DirectorSort>(),
            Err(GraphError::InvalidArgument(_))
        ));
    }
}
