//! Core trait for catalog predicates.

use social_graph::{Catalog, Film, FilmId};

/// A test a film either passes or fails.
///
/// Filters see the catalog record, never the relation store, so the ranking engine
/// can treat a composed pipeline as an opaque `film → bool` predicate.
pub trait FilmFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    fn matches(&self, film: &Film) -> bool;

    /// Films this filter can select straight from a catalog index.
    ///
    /// `None` means the filter has no index and must see every film.
    fn candidates(&self, _catalog: &dyn Catalog) -> Option<Vec<FilmId>> {
        None
    }
}
