//! Demo service - seed sample users, posts and follow edges
//!
//! Seeding is idempotent: users that already exist (by email) are left alone
//! and their posts are not duplicated, follow edges are only added once.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::demo::{
    generate_demo_posts, generate_demo_relationships, generate_demo_users, DEMO_PASSWORD,
};
use crate::domain::{CredentialHasher, Micropost, Relationship, User};
use crate::ports::Repository;

/// What a seeding run added
#[derive(Debug, Default, Serialize)]
pub struct DemoSeedResult {
    pub users_created: usize,
    pub microposts_created: usize,
    pub relationships_created: usize,
}

/// Demo service for populating a store with sample data
pub struct DemoService {
    repository: Arc<dyn Repository>,
    hasher: CredentialHasher,
}

impl DemoService {
    pub fn new(repository: Arc<dyn Repository>, hasher: CredentialHasher) -> Self {
        Self { repository, hasher }
    }

    pub fn seed(&self) -> Result<DemoSeedResult> {
        let mut result = DemoSeedResult::default();
        let mut ids: HashMap<&str, Uuid> = HashMap::new();
        let mut fresh: Vec<&str> = Vec::new();

        let digest = self.hasher.digest(DEMO_PASSWORD)?;
        let now = Utc::now();

        for demo in generate_demo_users() {
            let id = match self.repository.find_user_by_email(demo.email)? {
                Some(existing) => existing.id,
                None => {
                    let mut user = User::new(demo.name, demo.email, digest.clone());
                    user.activated = true;
                    user.activated_at = Some(now);
                    self.repository
                        .insert_user(&user)
                        .with_context(|| format!("Failed to create demo user {}", demo.handle))?;
                    result.users_created += 1;
                    fresh.push(demo.handle);
                    user.id
                }
            };
            ids.insert(demo.handle, id);
        }

        for post in generate_demo_posts() {
            if !fresh.contains(&post.handle) {
                continue;
            }
            let Some(&author) = ids.get(post.handle) else {
                continue;
            };
            let micropost =
                Micropost::new(author, post.content).with_created_at(post.created_at(now));
            self.repository.insert_micropost(&micropost)?;
            result.microposts_created += 1;
        }

        for (follower, followed) in generate_demo_relationships() {
            let (Some(&follower), Some(&followed)) = (ids.get(follower), ids.get(followed)) else {
                continue;
            };
            if self
                .repository
                .insert_relationship(&Relationship::new(follower, followed))?
            {
                result.relationships_created += 1;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::domain::{Argon2Params, CredentialKind};

    fn service() -> (DemoService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let hasher = CredentialHasher::new(Argon2Params::minimal());
        (DemoService::new(repo.clone(), hasher), repo)
    }

    #[test]
    fn test_seed_populates_store() {
        let (service, repo) = service();
        let result = service.seed().unwrap();

        assert_eq!(result.users_created, generate_demo_users().len());
        assert_eq!(result.microposts_created, generate_demo_posts().len());
        assert_eq!(result.relationships_created, generate_demo_relationships().len());
        assert_eq!(repo.count_microposts().unwrap() as usize, generate_demo_posts().len());

        let reacher = repo.find_user_by_email("reacher@example.com").unwrap().unwrap();
        assert!(reacher.authenticated(CredentialKind::Password, Some(DEMO_PASSWORD)));
    }

    #[test]
    fn test_seed_twice_adds_nothing() {
        let (service, repo) = service();
        service.seed().unwrap();
        let second = service.seed().unwrap();

        assert_eq!(second.users_created, 0);
        assert_eq!(second.microposts_created, 0);
        assert_eq!(second.relationships_created, 0);
        assert_eq!(repo.count_users().unwrap() as usize, generate_demo_users().len());
    }
}
