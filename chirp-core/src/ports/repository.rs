//! Repository port - persistence abstraction

use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Micropost, Relationship, User};

/// Database repository abstraction
///
/// Every method is a single unit of work against the backing store.
/// Implementations must make `destroy_user` atomic and must answer `feed`
/// from one consistent snapshot.
pub trait Repository: Send + Sync {
    // === Users ===

    /// Insert a new user. Fails if the email is already taken.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Overwrite an existing user row
    fn update_user(&self, user: &User) -> Result<()>;

    fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Look up a user by email, ignoring case
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, ordered by name
    fn list_users(&self) -> Result<Vec<User>>;

    fn count_users(&self) -> Result<i64>;

    /// Delete a user together with their microposts and every relationship
    /// they take part in. All or nothing.
    fn destroy_user(&self, id: Uuid) -> Result<DestroyReport>;

    // === Microposts ===

    fn insert_micropost(&self, post: &Micropost) -> Result<()>;

    fn get_micropost(&self, id: Uuid) -> Result<Option<Micropost>>;

    /// Returns whether a post was deleted
    fn delete_micropost(&self, id: Uuid) -> Result<bool>;

    /// Posts by one author, most recent first
    fn microposts_by_user(&self, user_id: Uuid) -> Result<Vec<Micropost>>;

    fn count_microposts(&self) -> Result<i64>;

    // === Relationships ===

    /// Insert a follow edge. Returns false if the edge already existed.
    fn insert_relationship(&self, relationship: &Relationship) -> Result<bool>;

    /// Remove a follow edge. Returns false if there was nothing to remove.
    fn delete_relationship(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool>;

    fn relationship_exists(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool>;

    /// Users followed by `user_id`, ordered by name
    fn following(&self, user_id: Uuid) -> Result<Vec<User>>;

    /// Users following `user_id`, ordered by name
    fn followers(&self, user_id: Uuid) -> Result<Vec<User>>;

    fn count_following(&self, user_id: Uuid) -> Result<i64>;

    fn count_followers(&self, user_id: Uuid) -> Result<i64>;

    fn count_relationships(&self) -> Result<i64>;

    // === Feed ===

    /// Posts by `user_id` or anyone `user_id` follows, most recent first
    /// (ties broken by id), skipping `offset` and returning at most `limit`.
    fn feed(&self, user_id: Uuid, limit: Option<usize>, offset: usize) -> Result<Vec<Micropost>>;
}

/// What a cascading user delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DestroyReport {
    pub user_deleted: bool,
    pub microposts_deleted: i64,
    pub relationships_deleted: i64,
}
