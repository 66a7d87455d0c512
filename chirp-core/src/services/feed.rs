//! Feed service - a user's own posts merged with posts of everyone they follow

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::Micropost;
use crate::ports::Repository;

pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Feed service
pub struct FeedService {
    repository: Arc<dyn Repository>,
    page_size: usize,
}

impl FeedService {
    pub fn new(repository: Arc<dyn Repository>, page_size: usize) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The whole feed, most recent first
    pub fn feed(&self, user: Uuid) -> Result<Vec<Micropost>> {
        self.require_user(user)?;
        self.repository.feed(user, None, 0)
    }

    /// One page of the feed. Pages are numbered from 1; page 0 is treated as 1.
    pub fn feed_page(&self, user: Uuid, page: usize) -> Result<Vec<Micropost>> {
        self.require_user(user)?;
        let offset = page.saturating_sub(1).saturating_mul(self.page_size);
        self.repository.feed(user, Some(self.page_size), offset)
    }

    fn require_user(&self, id: Uuid) -> Result<()> {
        match self.repository.get_user(id)? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("user {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::adapters::memory::InMemoryRepository;
    use crate::domain::{Relationship, User};

    struct Cast {
        repo: Arc<InMemoryRepository>,
        michael: User,
        archer: User,
        lana: User,
    }

    fn cast() -> Cast {
        let repo = Arc::new(InMemoryRepository::new());
        let michael = User::new("Michael Example", "michael@example.com", "d");
        let archer = User::new("Sterling Archer", "duchess@example.gov", "d");
        let lana = User::new("Lana Kane", "hands@example.gov", "d");
        for user in [&michael, &archer, &lana] {
            repo.insert_user(user).unwrap();
        }

        let now = Utc::now();
        for (i, user) in [&michael, &archer, &lana].iter().enumerate() {
            for n in 0..3 {
                let post = Micropost::new(user.id, format!("post {} by {}", n, user.name))
                    .with_created_at(now - Duration::minutes((i * 3 + n) as i64));
                repo.insert_micropost(&post).unwrap();
            }
        }

        repo.insert_relationship(&Relationship::new(michael.id, lana.id)).unwrap();

        Cast {
            repo,
            michael,
            archer,
            lana,
        }
    }

    #[test]
    fn test_feed_should_have_the_right_posts() {
        let cast = cast();
        let service = FeedService::new(cast.repo.clone(), DEFAULT_PAGE_SIZE);
        let feed = service.feed(cast.michael.id).unwrap();

        // Posts from followed user
        for post in cast.repo.microposts_by_user(cast.lana.id).unwrap() {
            assert!(feed.contains(&post));
        }
        // Posts from self
        for post in cast.repo.microposts_by_user(cast.michael.id).unwrap() {
            assert!(feed.contains(&post));
        }
        // Posts from unfollowed user
        for post in cast.repo.microposts_by_user(cast.archer.id).unwrap() {
            assert!(!feed.contains(&post));
        }
    }

    #[test]
    fn test_feed_is_most_recent_first() {
        let cast = cast();
        let service = FeedService::new(cast.repo.clone(), DEFAULT_PAGE_SIZE);
        let feed = service.feed(cast.michael.id).unwrap();

        assert_eq!(feed.len(), 6);
        assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_feed_drops_posts_after_unfollow() {
        let cast = cast();
        let service = FeedService::new(cast.repo.clone(), DEFAULT_PAGE_SIZE);
        cast.repo.delete_relationship(cast.michael.id, cast.lana.id).unwrap();

        let feed = service.feed(cast.michael.id).unwrap();
        assert!(feed.iter().all(|p| p.user_id == cast.michael.id));
    }

    #[test]
    fn test_feed_pages() {
        let cast = cast();
        let service = FeedService::new(cast.repo.clone(), 4);
        let all = service.feed(cast.michael.id).unwrap();

        let first = service.feed_page(cast.michael.id, 1).unwrap();
        let second = service.feed_page(cast.michael.id, 2).unwrap();
        let third = service.feed_page(cast.michael.id, 3).unwrap();

        assert_eq!(first, all[..4]);
        assert_eq!(second, all[4..]);
        assert!(third.is_empty());
        assert_eq!(service.feed_page(cast.michael.id, 0).unwrap(), first);
    }

    #[test]
    fn test_feed_of_unknown_user() {
        let cast = cast();
        let service = FeedService::new(cast.repo, DEFAULT_PAGE_SIZE);
        assert!(service.feed(Uuid::new_v4()).unwrap_err().is_not_found());
    }
}
