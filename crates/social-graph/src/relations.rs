//! Like and friend relations.
//!
//! [`Relations`] is the plain edge-set model: every mutation is idempotent and
//! every query against an unknown id answers with an empty set. [`RelationStore`]
//! wraps it in a read-write lock so it can be shared between request threads.
//!
//! Like edges are indexed both ways (user → films, film → users) because ranking
//! counts likes per film while recommendation compares films per user. Friend edges
//! are directed; the inbound index only exists so account teardown can find every
//! edge that points at a user.

use crate::error::{GraphError, Result};
use crate::types::{FilmId, FriendEdge, LikeEdge, UserId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

static EMPTY: BTreeSet<u32> = BTreeSet::new();

/// The edge sets. Ordered maps keep every iteration ascending by id.
#[derive(Debug, Default, Clone)]
pub struct Relations {
    films_by_user: BTreeMap<UserId, BTreeSet<FilmId>>,
    users_by_film: BTreeMap<FilmId, BTreeSet<UserId>>,
    friends: BTreeMap<UserId, BTreeSet<UserId>>,
    followers: BTreeMap<UserId, BTreeSet<UserId>>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    // Likes

    /// Returns true if the edge was not present before
    pub fn add_like(&mut self, user_id: UserId, film_id: FilmId) -> bool {
        let inserted = self.films_by_user.entry(user_id).or_default().insert(film_id);
        self.users_by_film.entry(film_id).or_default().insert(user_id);
        inserted
    }

    /// Returns true if the edge existed
    pub fn remove_like(&mut self, user_id: UserId, film_id: FilmId) -> bool {
        let removed = remove_from(&mut self.films_by_user, user_id, film_id);
        remove_from(&mut self.users_by_film, film_id, user_id);
        removed
    }

    /// Films the user likes
    pub fn likes_of(&self, user_id: UserId) -> &BTreeSet<FilmId> {
        self.films_by_user.get(&user_id).unwrap_or(&EMPTY)
    }

    /// Users who like the film
    pub fn likers_of(&self, film_id: FilmId) -> &BTreeSet<UserId> {
        self.users_by_film.get(&film_id).unwrap_or(&EMPTY)
    }

    pub fn like_count(&self, film_id: FilmId) -> usize {
        self.likers_of(film_id).len()
    }

    /// Every user with at least one like, ascending by id
    pub fn users_with_likes(&self) -> impl Iterator<Item = (UserId, &BTreeSet<FilmId>)> {
        self.films_by_user.iter().map(|(&user_id, films)| (user_id, films))
    }

    // Friends

    /// Adds the directed edge `user_id → friend_id`.
    ///
    /// Self-edges are rejected with `InvalidArgument`.
    pub fn add_friend(&mut self, user_id: UserId, friend_id: UserId) -> Result<bool> {
        if user_id == friend_id {
            return Err(GraphError::invalid(format!(
                "user {} cannot befriend themselves",
                user_id
            )));
        }
        let inserted = self.friends.entry(user_id).or_default().insert(friend_id);
        self.followers.entry(friend_id).or_default().insert(user_id);
        Ok(inserted)
    }

    pub fn remove_friend(&mut self, user_id: UserId, friend_id: UserId) -> bool {
        let removed = remove_from(&mut self.friends, user_id, friend_id);
        remove_from(&mut self.followers, friend_id, user_id);
        removed
    }

    /// Outbound friends of the user
    pub fn friends_of(&self, user_id: UserId) -> &BTreeSet<UserId> {
        self.friends.get(&user_id).unwrap_or(&EMPTY)
    }

    /// Users who list `user_id` as a friend
    pub fn followers_of(&self, user_id: UserId) -> &BTreeSet<UserId> {
        self.followers.get(&user_id).unwrap_or(&EMPTY)
    }

    // Teardown

    /// Drops every edge touching the user: their likes, their friends, and every
    /// friend edge pointing at them.
    pub fn purge_user(&mut self, user_id: UserId) {
        if let Some(films) = self.films_by_user.remove(&user_id) {
            for film_id in films {
                remove_from(&mut self.users_by_film, film_id, user_id);
            }
        }
        if let Some(friends) = self.friends.remove(&user_id) {
            for friend_id in friends {
                remove_from(&mut self.followers, friend_id, user_id);
            }
        }
        if let Some(followers) = self.followers.remove(&user_id) {
            for follower_id in followers {
                remove_from(&mut self.friends, follower_id, user_id);
            }
        }
    }

    /// Drops every like edge on the film
    pub fn purge_film(&mut self, film_id: FilmId) {
        if let Some(users) = self.users_by_film.remove(&film_id) {
            for user_id in users {
                remove_from(&mut self.films_by_user, user_id, film_id);
            }
        }
    }

    /// Sizes for debugging/validation: (users with likes, like edges, friend edges)
    pub fn counts(&self) -> (usize, usize, usize) {
        let likes = self.films_by_user.values().map(|s| s.len()).sum();
        let friends = self.friends.values().map(|s| s.len()).sum();
        (self.films_by_user.len(), likes, friends)
    }
}

/// Removes `value` from the set under `key`, dropping the set once it is empty.
fn remove_from(map: &mut BTreeMap<u32, BTreeSet<u32>>, key: u32, value: u32) -> bool {
    let Some(set) = map.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(&value);
    if set.is_empty() {
        map.remove(&key);
    }
    removed
}

/// Shared, lock-protected [`Relations`].
///
/// Writers are mutually exclusive; readers run concurrently with each other.
/// Query methods return owned snapshots; engines that need several lookups against
/// one consistent state take [`RelationStore::read`] instead.
#[derive(Debug, Default)]
pub struct RelationStore {
    inner: RwLock<Relations>,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from bulk-loaded edges. Self friend edges are skipped.
    pub fn from_edges(likes: &[LikeEdge], friends: &[FriendEdge]) -> Self {
        let mut relations = Relations::new();
        for edge in likes {
            relations.add_like(edge.user_id, edge.film_id);
        }
        for edge in friends {
            if relations.add_friend(edge.user_id, edge.friend_id).is_err() {
                debug!("Skipping self friend edge for user {}", edge.user_id);
            }
        }
        Self {
            inner: RwLock::new(relations),
        }
    }

    /// Shared access to the whole edge set
    pub fn read(&self) -> RwLockReadGuard<'_, Relations> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access to the whole edge set
    pub fn write(&self) -> RwLockWriteGuard<'_, Relations> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_like(&self, user_id: UserId, film_id: FilmId) {
        self.write().add_like(user_id, film_id);
    }

    pub fn remove_like(&self, user_id: UserId, film_id: FilmId) {
        self.write().remove_like(user_id, film_id);
    }

    pub fn likes_of(&self, user_id: UserId) -> BTreeSet<FilmId> {
        self.read().likes_of(user_id).clone()
    }

    pub fn likers_of(&self, film_id: FilmId) -> BTreeSet<UserId> {
        self.read().likers_of(film_id).clone()
    }

    pub fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<()> {
        self.write().add_friend(user_id, friend_id).map(|_| ())
    }

    pub fn remove_friend(&self, user_id: UserId, friend_id: UserId) {
        self.write().remove_friend(user_id, friend_id);
    }

    pub fn friends_of(&self, user_id: UserId) -> BTreeSet<UserId> {
        self.read().friends_of(user_id).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_like_is_idempotent() {
        let store = RelationStore::new();
        store.add_like(1, 10);
        let once = store.likers_of(10);
        store.add_like(1, 10);

        assert_eq!(store.likers_of(10), once);
        assert_eq!(store.read().like_count(10), 1);
        assert_eq!(store.likes_of(1), BTreeSet::from([10]));
    }

    #[test]
    fn test_remove_missing_like_is_noop() {
        let mut relations = Relations::new();
        assert!(!relations.remove_like(1, 10));

        relations.add_like(1, 10);
        assert!(relations.remove_like(1, 10));
        assert!(!relations.remove_like(1, 10));
        assert!(relations.likes_of(1).is_empty());
        assert!(relations.likers_of(10).is_empty());
    }

    #[test]
    fn test_like_indices_stay_in_sync() {
        let mut relations = Relations::new();
        relations.add_like(1, 10);
        relations.add_like(2, 10);
        relations.add_like(1, 11);

        assert_eq!(relations.likers_of(10), &BTreeSet::from([1, 2]));
        assert_eq!(relations.likes_of(1), &BTreeSet::from([10, 11]));

        relations.remove_like(1, 10);
        assert_eq!(relations.likers_of(10), &BTreeSet::from([2]));
        assert_eq!(relations.likes_of(1), &BTreeSet::from([11]));
    }

    #[test]
    fn test_unknown_ids_give_empty_sets() {
        let store = RelationStore::new();
        assert!(store.likes_of(999).is_empty());
        assert!(store.likers_of(999).is_empty());
        assert!(store.friends_of(999).is_empty());
    }

    #[test]
    fn test_friendship_is_directed() {
        let store = RelationStore::new();
        store.add_friend(1, 2).unwrap();

        assert_eq!(store.friends_of(1), BTreeSet::from([2]));
        assert!(store.friends_of(2).is_empty());
        assert_eq!(store.read().followers_of(2), &BTreeSet::from([1]));
    }

    #[test]
    fn test_friend_add_and_remove_are_idempotent() {
        let mut relations = Relations::new();
        assert!(relations.add_friend(1, 2).unwrap());
        assert!(!relations.add_friend(1, 2).unwrap());
        assert_eq!(relations.friends_of(1).len(), 1);

        assert!(relations.remove_friend(1, 2));
        assert!(!relations.remove_friend(1, 2));
        assert!(relations.friends_of(1).is_empty());
        assert!(relations.followers_of(2).is_empty());
    }

    #[test]
    fn test_self_friend_is_rejected() {
        let store = RelationStore::new();
        let err = store.add_friend(5, 5).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
        assert!(store.friends_of(5).is_empty());
    }

    #[test]
    fn test_purge_user_removes_all_touching_edges() {
        let mut relations = Relations::new();
        relations.add_like(1, 10);
        relations.add_like(2, 10);
        relations.add_friend(1, 2).unwrap();
        relations.add_friend(3, 1).unwrap();
        relations.add_friend(3, 2).unwrap();

        relations.purge_user(1);

        assert!(relations.likes_of(1).is_empty());
        assert_eq!(relations.likers_of(10), &BTreeSet::from([2]));
        assert!(relations.friends_of(1).is_empty());
        assert_eq!(relations.followers_of(2), &BTreeSet::from([3]));
        assert!(relations.followers_of(1).is_empty());
        assert_eq!(relations.friends_of(3), &BTreeSet::from([2]));
    }

    #[test]
    fn test_purge_film_removes_likes() {
        let mut relations = Relations::new();
        relations.add_like(1, 10);
        relations.add_like(1, 11);
        relations.add_like(2, 10);

        relations.purge_film(10);

        assert!(relations.likers_of(10).is_empty());
        assert_eq!(relations.likes_of(1), &BTreeSet::from([11]));
        assert!(relations.likes_of(2).is_empty());
        assert_eq!(relations.counts(), (1, 1, 0));
    }

    #[test]
    fn test_from_edges_skips_self_friendship() {
        let store = RelationStore::from_edges(
            &[LikeEdge { user_id: 1, film_id: 10 }],
            &[
                FriendEdge { user_id: 1, friend_id: 1 },
                FriendEdge { user_id: 1, friend_id: 2 },
            ],
        );
        assert_eq!(store.friends_of(1), BTreeSet::from([2]));
        assert_eq!(store.read().counts(), (1, 1, 1));
    }
}
