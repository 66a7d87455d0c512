//! Status service - store-wide counts

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::ports::Repository;

/// Status service for store summaries
pub struct StatusService {
    repository: Arc<dyn Repository>,
}

impl StatusService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        let users = self.repository.list_users()?;
        let mut top_posters = Vec::with_capacity(users.len());
        for user in &users {
            let posts = self.repository.microposts_by_user(user.id)?.len() as i64;
            top_posters.push(UserSummary {
                id: user.id.to_string(),
                name: user.name.clone(),
                email: user.email.clone(),
                microposts: posts,
                followers: self.repository.count_followers(user.id)?,
                following: self.repository.count_following(user.id)?,
            });
        }
        top_posters.sort_by(|a, b| b.microposts.cmp(&a.microposts).then(a.name.cmp(&b.name)));

        Ok(StatusSummary {
            total_users: users.len() as i64,
            total_microposts: self.repository.count_microposts()?,
            total_relationships: self.repository.count_relationships()?,
            users: top_posters,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_users: i64,
    pub total_microposts: i64,
    pub total_relationships: i64,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub microposts: i64,
    pub followers: i64,
    pub following: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::domain::{Micropost, Relationship, User};

    #[test]
    fn test_status_counts() {
        let repo = Arc::new(InMemoryRepository::new());
        let a = User::new("A", "a@example.org", "d");
        let b = User::new("B", "b@example.org", "d");
        repo.insert_user(&a).unwrap();
        repo.insert_user(&b).unwrap();
        repo.insert_micropost(&Micropost::new(b.id, "hi")).unwrap();
        repo.insert_relationship(&Relationship::new(a.id, b.id)).unwrap();

        let status = StatusService::new(repo).get_status().unwrap();
        assert_eq!(status.total_users, 2);
        assert_eq!(status.total_microposts, 1);
        assert_eq!(status.total_relationships, 1);
        assert_eq!(status.users[0].name, "B");
        assert_eq!(status.users[0].followers, 1);
        assert_eq!(status.users[1].following, 1);
    }
}
