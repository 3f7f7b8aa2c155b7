//! Film filters and the pipeline that composes them.

pub mod director;
pub mod genre;
pub mod pipeline;
pub mod release_year;
pub mod traits;

// Re-export for convenience
pub use director::DirectorFilter;
pub use genre::GenreFilter;
pub use pipeline::FilterPipeline;
pub use release_year::ReleaseYearFilter;
pub use traits::FilmFilter;
