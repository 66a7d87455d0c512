//! Micropost service

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::validation::validate_micropost;
use crate::domain::{Micropost, SaveOutcome};
use crate::ports::Repository;

/// Micropost service
pub struct MicropostService {
    repository: Arc<dyn Repository>,
}

impl MicropostService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Publish a post for an existing user
    pub fn create(&self, user_id: Uuid, content: &str) -> Result<SaveOutcome<Micropost>> {
        if self.repository.get_user(user_id)?.is_none() {
            return Err(Error::not_found(format!("user {}", user_id)));
        }

        let violations = validate_micropost(content);
        if !violations.is_empty() {
            return Ok(SaveOutcome::Invalid(violations));
        }

        let post = Micropost::new(user_id, content);
        self.repository.insert_micropost(&post)?;
        Ok(SaveOutcome::Saved(post))
    }

    pub fn get(&self, id: Uuid) -> Result<Micropost> {
        self.repository
            .get_micropost(id)?
            .ok_or_else(|| Error::not_found(format!("micropost {}", id)))
    }

    /// Delete a post. Returns whether it existed.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        self.repository.delete_micropost(id)
    }

    /// Posts by one user, most recent first
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Micropost>> {
        self.repository.microposts_by_user(user_id)
    }

    pub fn count(&self) -> Result<i64> {
        self.repository.count_microposts()
    }
}
