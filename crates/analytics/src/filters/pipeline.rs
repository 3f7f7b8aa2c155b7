//! The FilterPipeline chains film filters into one catalog predicate.
//!
//! ## Algorithm
//! 1. Seed the candidate set from the smallest catalog index any filter offers
//!    (genre, year or director). With no indexed filter, start from every film.
//! 2. Run every filter over the seed, so a seed from one index is still checked
//!    against the others.
//! 3. Keep ascending film id order throughout.

use super::traits::FilmFilter;
use super::{GenreFilter, ReleaseYearFilter};
use social_graph::{Catalog, FilmId, Genre};
use tracing::debug;

/// Chains filters with AND semantics. An empty pipeline keeps every film.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(GenreFilter::new(Genre::Drama))
///     .add_filter(ReleaseYearFilter::new(1999));
///
/// let dramas_of_1999 = pipeline.select(catalog.as_ref());
/// ```
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn FilmFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern)
    pub fn add_filter(mut self, filter: impl FilmFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Pipeline for the "popular films" query: optional genre, optional year
    pub fn popular(genre: Option<Genre>, year: Option<i32>) -> Self {
        let mut pipeline = Self::new();
        if let Some(genre) = genre {
            pipeline = pipeline.add_filter(GenreFilter::new(genre));
        }
        if let Some(year) = year {
            pipeline = pipeline.add_filter(ReleaseYearFilter::new(year));
        }
        pipeline
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Films passing every filter, ascending by id
    ///
    /// # Arguments
    /// * `catalog` - Source of both the index seed and the film records
    ///
    /// # Returns
    /// The ids of catalog films that pass the whole pipeline
    pub fn select(&self, catalog: &dyn Catalog) -> Vec<FilmId> {
        self.apply(self.candidates(catalog), catalog)
    }

    /// Smallest index-backed seed among the filters, or every film
    pub fn candidates(&self, catalog: &dyn Catalog) -> Vec<FilmId> {
        let seed = self
            .filters
            .iter()
            .filter_map(|filter| {
                let ids = filter.candidates(catalog)?;
                debug!("{} seeds {} candidates", filter.name(), ids.len());
                Some(ids)
            })
            .min_by_key(|ids| ids.len());

        seed.unwrap_or_else(|| catalog.film_ids())
    }

    /// Apply every filter in sequence, keeping input order
    pub fn apply(&self, film_ids: Vec<FilmId>, catalog: &dyn Catalog) -> Vec<FilmId> {
        let mut current: Vec<FilmId> = film_ids
            .into_iter()
            .filter(|&id| catalog.film(id).is_some())
            .collect();

        for filter in &self.filters {
            let input = current.len();
            current.retain(|&id| catalog.film(id).is_some_and(|film| filter.matches(film)));
            debug!(
                "Filter applied: {} (input count: {}, output count: {})",
                filter.name(),
                input,
                current.len()
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use social_graph::{Film, InMemoryCatalog};

    fn create_test_catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        let films = [
            (1, 1999, vec![Genre::Drama]),
            (2, 1999, vec![Genre::Comedy]),
            (3, 2005, vec![Genre::Drama, Genre::Comedy]),
        ];
        for (id, year, genres) in films {
            catalog.insert_film(Film {
                id,
                name: format!("Film {}", id),
                release_date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
                genres,
                directors: vec![],
            });
        }
        catalog
    }

    #[test]
    fn test_empty_pipeline_keeps_known_films() {
        let catalog = create_test_catalog();
        let pipeline = FilterPipeline::new();

        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(vec![3, 1, 99], &catalog), vec![3, 1]);
        assert_eq!(pipeline.select(&catalog), vec![1, 2, 3]);
    }

    #[test]
    fn test_genre_and_year_compose() {
        let catalog = create_test_catalog();

        let drama = FilterPipeline::popular(Some(Genre::Drama), None);
        assert_eq!(drama.apply(catalog.film_ids(), &catalog), vec![1, 3]);

        let of_1999 = FilterPipeline::popular(None, Some(1999));
        assert_eq!(of_1999.apply(catalog.film_ids(), &catalog), vec![1, 2]);

        let both = FilterPipeline::popular(Some(Genre::Comedy), Some(1999));
        assert_eq!(both.apply(catalog.film_ids(), &catalog), vec![2]);
        assert_eq!(both.select(&catalog), vec![2]);
    }

    #[test]
    fn test_candidates_come_from_smallest_index() {
        let catalog = create_test_catalog();

        // Comedy covers films 2 and 3, 2005 only film 3
        let both = FilterPipeline::popular(Some(Genre::Comedy), Some(2005));
        assert_eq!(both.candidates(&catalog), vec![3]);
        assert_eq!(both.select(&catalog), vec![3]);

        let drama = FilterPipeline::popular(Some(Genre::Drama), None);
        assert_eq!(drama.candidates(&catalog), vec![1, 3]);

        // Nothing indexed: every film is a candidate
        assert_eq!(FilterPipeline::new().candidates(&catalog), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_index_yields_nothing() {
        let catalog = create_test_catalog();

        let pipeline = FilterPipeline::popular(Some(Genre::Action), None);
        assert!(pipeline.candidates(&catalog).is_empty());
        assert!(pipeline.select(&catalog).is_empty());
    }
}
