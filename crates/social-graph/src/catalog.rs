//! The entity catalog collaborator.
//!
//! The graph never owns film or user records. It asks a [`Catalog`] whether ids
//! exist and which films carry a genre, a release year or a director. Lookups hand
//! out borrowed records, so an implementation keeps its records resident for its own
//! lifetime. [`InMemoryCatalog`] is the one used by the CLI and the tests.

use crate::error::{GraphError, Result};
use crate::types::{DirectorId, Film, FilmId, Genre, User, UserId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Entity lookups the social graph depends on
pub trait Catalog: Send + Sync {
    fn film(&self, id: FilmId) -> Option<&Film>;

    fn user(&self, id: UserId) -> Option<&User>;

    /// Every film id, ascending
    fn film_ids(&self) -> Vec<FilmId>;

    /// Films tagged with the genre, ascending by id
    fn films_by_genre(&self, genre: Genre) -> Vec<FilmId>;

    /// Films released in the year, ascending by id
    fn films_by_year(&self, year: i32) -> Vec<FilmId>;

    /// Films the director worked on, ascending by id
    fn films_by_director(&self, director: DirectorId) -> Vec<FilmId>;

    fn has_director(&self, id: DirectorId) -> bool;

    fn require_film(&self, id: FilmId) -> Result<&Film> {
        self.film(id).ok_or_else(|| GraphError::film_not_found(id))
    }

    fn require_user(&self, id: UserId) -> Result<&User> {
        self.user(id).ok_or_else(|| GraphError::user_not_found(id))
    }

    fn require_director(&self, id: DirectorId) -> Result<()> {
        if self.has_director(id) {
            Ok(())
        } else {
            Err(GraphError::NotFound {
                entity: "Director",
                id,
            })
        }
    }
}

/// Catalog held in memory, with secondary indices for filter lookups
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    users: HashMap<UserId, User>,
    films: BTreeMap<FilmId, Film>,
    genre_index: HashMap<Genre, BTreeSet<FilmId>>,
    year_index: BTreeMap<i32, BTreeSet<FilmId>>,
    director_index: HashMap<DirectorId, BTreeSet<FilmId>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert or replace a film, keeping the secondary indices current
    pub fn insert_film(&mut self, film: Film) {
        self.remove_film(film.id);

        for &genre in &film.genres {
            self.genre_index.entry(genre).or_default().insert(film.id);
        }
        self.year_index
            .entry(film.release_year())
            .or_default()
            .insert(film.id);
        for &director in &film.directors {
            self.director_index.entry(director).or_default().insert(film.id);
        }
        self.films.insert(film.id, film);
    }

    pub fn remove_film(&mut self, id: FilmId) -> Option<Film> {
        let film = self.films.remove(&id)?;
        for genre in &film.genres {
            if let Some(ids) = self.genre_index.get_mut(genre) {
                ids.remove(&id);
            }
        }
        if let Some(ids) = self.year_index.get_mut(&film.release_year()) {
            ids.remove(&id);
        }
        for director in &film.directors {
            if let Some(ids) = self.director_index.get_mut(director) {
                ids.remove(&id);
            }
        }
        Some(film)
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get counts for debugging/validation: (users, films)
    pub fn counts(&self) -> (usize, usize) {
        (self.users.len(), self.films.len())
    }
}

impl Catalog for InMemoryCatalog {
    fn film(&self, id: FilmId) -> Option<&Film> {
        self.films.get(&id)
    }

    fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    fn film_ids(&self) -> Vec<FilmId> {
        self.films.keys().copied().collect()
    }

    fn films_by_genre(&self, genre: Genre) -> Vec<FilmId> {
        index_lookup(self.genre_index.get(&genre))
    }

    fn films_by_year(&self, year: i32) -> Vec<FilmId> {
        index_lookup(self.year_index.get(&year))
    }

    fn films_by_director(&self, director: DirectorId) -> Vec<FilmId> {
        index_lookup(self.director_index.get(&director))
    }

    fn has_director(&self, id: DirectorId) -> bool {
        self.director_index
            .get(&id)
            .is_some_and(|films| !films.is_empty())
    }
}

fn index_lookup(ids: Option<&BTreeSet<FilmId>>) -> Vec<FilmId> {
    ids.map(|ids| ids.iter().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn film(id: FilmId, year: i32, genres: Vec<Genre>, directors: Vec<DirectorId>) -> Film {
        Film {
            id,
            name: format!("Film {}", id),
            release_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            genres,
            directors,
        }
    }

    #[test]
    fn test_empty_queries() {
        let catalog = InMemoryCatalog::new();

        assert!(catalog.film(1).is_none());
        assert!(catalog.user(1).is_none());
        assert!(catalog.film_ids().is_empty());
        assert!(catalog.films_by_genre(Genre::Drama).is_empty());
        assert!(catalog.films_by_year(2000).is_empty());
        assert!(!catalog.has_director(1));
    }

    #[test]
    fn test_require_raises_not_found() {
        let catalog = InMemoryCatalog::new();

        let err = catalog.require_user(9).unwrap_err();
        assert!(err.is_not_found());
        assert!(catalog.require_film(9).unwrap_err().is_not_found());
        assert!(catalog.require_director(9).unwrap_err().is_not_found());
    }

    #[test]
    fn test_secondary_indices() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_film(film(2, 1999, vec![Genre::Drama], vec![7]));
        catalog.insert_film(film(1, 1999, vec![Genre::Drama, Genre::Comedy], vec![]));
        catalog.insert_film(film(3, 2005, vec![Genre::Comedy], vec![7]));

        assert_eq!(catalog.film_ids(), vec![1, 2, 3]);
        assert_eq!(catalog.films_by_genre(Genre::Drama), vec![1, 2]);
        assert_eq!(catalog.films_by_year(1999), vec![1, 2]);
        assert_eq!(catalog.films_by_director(7), vec![2, 3]);
        assert!(catalog.has_director(7));
    }

    #[test]
    fn test_replacing_film_reindexes() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_film(film(1, 1999, vec![Genre::Drama], vec![7]));
        catalog.insert_film(film(1, 2001, vec![Genre::Action], vec![]));

        assert!(catalog.films_by_genre(Genre::Drama).is_empty());
        assert!(catalog.films_by_year(1999).is_empty());
        assert_eq!(catalog.films_by_genre(Genre::Action), vec![1]);
        assert!(!catalog.has_director(7));
        assert_eq!(catalog.counts(), (0, 1));
    }
}
