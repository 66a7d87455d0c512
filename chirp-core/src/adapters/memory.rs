//! In-memory repository
//!
//! Plain collections behind a single mutex. Every trait method takes the lock
//! once, so each call is atomic and sees a consistent snapshot, matching what
//! the DuckDB adapter guarantees. Used by service tests and handy for
//! embedding without a database file.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Micropost, Relationship, User};
use crate::ports::{DestroyReport, Repository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    microposts: HashMap<Uuid, Micropost>,
    /// (follower_id, followed_id) -> edge
    relationships: BTreeMap<(Uuid, Uuid), Relationship>,
}

impl Tables {
    fn users_sorted(&self, ids: impl IntoIterator<Item = Uuid>) -> Vec<User> {
        let mut users: Vec<User> = ids
            .into_iter()
            .filter_map(|id| self.users.get(&id).cloned())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        users
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        let email = email.to_lowercase();
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.to_lowercase() == email)
    }
}

/// Most recent first, ties broken by id (same order as the SQL adapter)
fn sort_recent_first(posts: &mut [Micropost]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Repository backed by in-process collections
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

impl Repository for InMemoryRepository {
    fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.users.contains_key(&user.id) {
            return Err(Error::database(format!("duplicate user id {}", user.id)));
        }
        if tables.email_taken(&user.email, None) {
            return Err(Error::validation("email has already been taken"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&user.id) {
            return Err(Error::not_found(format!("user {}", user.id)));
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(Error::validation("email has already been taken"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.lock()?;
        Ok(tables.users_sorted(tables.users.keys().copied()))
    }

    fn count_users(&self) -> Result<i64> {
        Ok(self.lock()?.users.len() as i64)
    }

    fn destroy_user(&self, id: Uuid) -> Result<DestroyReport> {
        let mut tables = self.lock()?;

        let edges_before = tables.relationships.len();
        tables
            .relationships
            .retain(|(follower, followed), _| *follower != id && *followed != id);
        let relationships_deleted = (edges_before - tables.relationships.len()) as i64;

        let posts_before = tables.microposts.len();
        tables.microposts.retain(|_, post| post.user_id != id);
        let microposts_deleted = (posts_before - tables.microposts.len()) as i64;

        let user_deleted = tables.users.remove(&id).is_some();

        Ok(DestroyReport {
            user_deleted,
            microposts_deleted,
            relationships_deleted,
        })
    }

    fn insert_micropost(&self, post: &Micropost) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.microposts.contains_key(&post.id) {
            return Err(Error::database(format!("duplicate micropost id {}", post.id)));
        }
        tables.microposts.insert(post.id, post.clone());
        Ok(())
    }

    fn get_micropost(&self, id: Uuid) -> Result<Option<Micropost>> {
        Ok(self.lock()?.microposts.get(&id).cloned())
    }

    fn delete_micropost(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock()?.microposts.remove(&id).is_some())
    }

    fn microposts_by_user(&self, user_id: Uuid) -> Result<Vec<Micropost>> {
        let tables = self.lock()?;
        let mut posts: Vec<Micropost> = tables
            .microposts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        sort_recent_first(&mut posts);
        Ok(posts)
    }

    fn count_microposts(&self) -> Result<i64> {
        Ok(self.lock()?.microposts.len() as i64)
    }

    fn insert_relationship(&self, relationship: &Relationship) -> Result<bool> {
        let mut tables = self.lock()?;
        let key = (relationship.follower_id, relationship.followed_id);
        if tables.relationships.contains_key(&key) {
            return Ok(false);
        }
        tables.relationships.insert(key, relationship.clone());
        Ok(true)
    }

    fn delete_relationship(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        Ok(self
            .lock()?
            .relationships
            .remove(&(follower_id, followed_id))
            .is_some())
    }

    fn relationship_exists(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        Ok(self
            .lock()?
            .relationships
            .contains_key(&(follower_id, followed_id)))
    }

    fn following(&self, user_id: Uuid) -> Result<Vec<User>> {
        let tables = self.lock()?;
        let ids: Vec<Uuid> = tables
            .relationships
            .keys()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followed)| *followed)
            .collect();
        Ok(tables.users_sorted(ids))
    }

    fn followers(&self, user_id: Uuid) -> Result<Vec<User>> {
        let tables = self.lock()?;
        let ids: Vec<Uuid> = tables
            .relationships
            .keys()
            .filter(|(_, followed)| *followed == user_id)
            .map(|(follower, _)| *follower)
            .collect();
        Ok(tables.users_sorted(ids))
    }

    fn count_following(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.lock()?;
        Ok(tables
            .relationships
            .keys()
            .filter(|(follower, _)| *follower == user_id)
            .count() as i64)
    }

    fn count_followers(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.lock()?;
        Ok(tables
            .relationships
            .keys()
            .filter(|(_, followed)| *followed == user_id)
            .count() as i64)
    }

    fn count_relationships(&self) -> Result<i64> {
        Ok(self.lock()?.relationships.len() as i64)
    }

    fn feed(&self, user_id: Uuid, limit: Option<usize>, offset: usize) -> Result<Vec<Micropost>> {
        let tables = self.lock()?;

        let mut authors: BTreeSet<Uuid> = tables
            .relationships
            .keys()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followed)| *followed)
            .collect();
        authors.insert(user_id);

        let mut posts: Vec<Micropost> = tables
            .microposts
            .values()
            .filter(|p| authors.contains(&p.user_id))
            .cloned()
            .collect();
        sort_recent_first(&mut posts);

        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_uniqueness_ignores_case() {
        let repo = InMemoryRepository::new();
        repo.insert_user(&User::new("A", "a@example.org", "d")).unwrap();

        let mut dup = User::new("B", "x@example.org", "d");
        dup.email = "A@EXAMPLE.ORG".to_string();
        assert!(matches!(repo.insert_user(&dup), Err(Error::Validation(_))));
    }

    #[test]
    fn test_destroy_counts_incident_edges_once() {
        let repo = InMemoryRepository::new();
        let a = User::new("A", "a@example.org", "d");
        let b = User::new("B", "b@example.org", "d");
        repo.insert_user(&a).unwrap();
        repo.insert_user(&b).unwrap();
        repo.insert_relationship(&Relationship::new(a.id, b.id)).unwrap();
        repo.insert_relationship(&Relationship::new(b.id, a.id)).unwrap();
        repo.insert_relationship(&Relationship::new(a.id, a.id)).unwrap();

        let report = repo.destroy_user(a.id).unwrap();
        assert!(report.user_deleted);
        assert_eq!(report.relationships_deleted, 3);
        assert_eq!(repo.count_relationships().unwrap(), 0);
    }

    #[test]
    fn test_destroy_missing_user_is_a_no_op() {
        let repo = InMemoryRepository::new();
        let report = repo.destroy_user(Uuid::new_v4()).unwrap();
        assert_eq!(report, DestroyReport::default());
    }
}
