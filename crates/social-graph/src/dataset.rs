//! Loading a complete dataset directory.
//!
//! A dataset is the catalog plus the edges recorded against it. Loading parses the
//! four files in parallel, builds the catalog, and checks that every edge points at
//! known entities.

use crate::catalog::{Catalog, InMemoryCatalog};
use crate::error::Result;
use crate::parser;
use crate::relations::RelationStore;
use crate::types::{FriendEdge, LikeEdge};
use std::path::Path;
use tracing::info;

/// Everything read from a dataset directory
#[derive(Debug, Default)]
pub struct Dataset {
    pub catalog: InMemoryCatalog,
    pub likes: Vec<LikeEdge>,
    pub friends: Vec<FriendEdge>,
}

impl Dataset {
    /// Load `users.dat`, `films.dat`, `likes.dat`, and `friends.dat` from a directory
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading dataset from {:?}", data_dir);

        let users_path = data_dir.join("users.dat");
        let films_path = data_dir.join("films.dat");
        let likes_path = data_dir.join("likes.dat");
        let friends_path = data_dir.join("friends.dat");

        // Nested joins give four-way parallelism
        let ((users, films), (likes, friends)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_films(&films_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_likes(&likes_path),
                    || parser::parse_friends(&friends_path),
                )
            },
        );

        let mut catalog = InMemoryCatalog::new();
        for user in users? {
            catalog.insert_user(user);
        }
        for film in films? {
            catalog.insert_film(film);
        }

        let dataset = Self {
            catalog,
            likes: likes?,
            friends: friends?,
        };
        dataset.validate()?;

        let (users, films) = dataset.catalog.counts();
        info!(
            "Loaded {} users, {} films, {} likes, {} friend edges",
            users,
            films,
            dataset.likes.len(),
            dataset.friends.len()
        );
        Ok(dataset)
    }

    /// Every edge must reference catalog entities
    pub fn validate(&self) -> Result<()> {
        for like in &self.likes {
            self.catalog.require_user(like.user_id)?;
            self.catalog.require_film(like.film_id)?;
        }
        for friend in &self.friends {
            self.catalog.require_user(friend.user_id)?;
            self.catalog.require_user(friend.friend_id)?;
        }
        Ok(())
    }

    /// Relation store seeded with the loaded edges
    pub fn relation_store(&self) -> RelationStore {
        RelationStore::from_edges(&self.likes, &self.friends)
    }
}
