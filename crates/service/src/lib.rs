//! Service crate for the film social graph.
//!
//! This crate contains the facade that validates ids against the catalog and
//! coordinates the graph and the analytics engines.

pub mod config;
pub mod social;

pub use config::ServiceConfig;
pub use social::{FilmRecommendation, SocialService};
