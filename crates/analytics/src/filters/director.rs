//! Keep films by one director.

use super::traits::FilmFilter;
use social_graph::{Catalog, DirectorId, Film, FilmId};

pub struct DirectorFilter {
    director: DirectorId,
}

impl DirectorFilter {
    pub fn new(director: DirectorId) -> Self {
        Self { director }
    }
}

impl FilmFilter for DirectorFilter {
    fn name(&self) -> &str {
        "DirectorFilter"
    }

    fn matches(&self, film: &Film) -> bool {
        film.directors.contains(&self.director)
    }

    fn candidates(&self, catalog: &dyn Catalog) -> Option<Vec<FilmId>> {
        Some(catalog.films_by_director(self.director))
    }
}
