//! Micropost domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum micropost length in characters
pub const MAX_CONTENT_LEN: usize = 140;

/// A short post authored by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Micropost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Micropost {
    pub fn new(user_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Override the creation time (fixtures, imports)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_micropost_creation() {
        let author = Uuid::new_v4();
        let post = Micropost::new(author, "Lorem ipsum");
        assert_eq!(post.user_id, author);
        assert_eq!(post.content, "Lorem ipsum");
    }

    #[test]
    fn test_with_created_at() {
        let earlier = Utc::now() - Duration::hours(3);
        let post = Micropost::new(Uuid::new_v4(), "x").with_created_at(earlier);
        assert_eq!(post.created_at, earlier);
    }
}
