//! Keep films released in one calendar year.

use super::traits::FilmFilter;
use social_graph::{Catalog, Film, FilmId};

pub struct ReleaseYearFilter {
    year: i32,
}

impl ReleaseYearFilter {
    pub fn new(year: i32) -> Self {
        Self { year }
    }
}

impl FilmFilter for ReleaseYearFilter {
    fn name(&self) -> &str {
        "ReleaseYearFilter"
    }

    fn matches(&self, film: &Film) -> bool {
        film.release_year() == self.year
    }

    fn candidates(&self, catalog: &dyn Catalog) -> Option<Vec<FilmId>> {
        Some(catalog.films_by_year(self.year))
    }
}
