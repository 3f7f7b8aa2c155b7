//! Keep films of one genre.

use super::traits::FilmFilter;
use social_graph::{Catalog, Film, FilmId, Genre};

/// Keeps films tagged with the genre (films can carry several).
pub struct GenreFilter {
    genre: Genre,
}

impl GenreFilter {
    pub fn new(genre: Genre) -> Self {
        Self { genre }
    }
}

impl FilmFilter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn matches(&self, film: &Film) -> bool {
        film.genres.contains(&self.genre)
    }

    fn candidates(&self, catalog: &dyn Catalog) -> Option<Vec<FilmId>> {
        Some(catalog.films_by_genre(self.genre))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_genre_filter() {
        let film = Film {
            id: 1,
            name: "Two Genres".to_string(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            genres: vec![Genre::Comedy, Genre::Drama],
            directors: vec![],
        };

        assert!(GenreFilter::new(Genre::Drama).matches(&film));
        assert!(!GenreFilter::new(Genre::Action).matches(&film));
    }
}
