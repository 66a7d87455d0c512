//! Relationship service - the follow graph

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{FollowOutcome, Relationship, SelfFollowPolicy, User};
use crate::ports::Repository;

/// Follower and following counts for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowStats {
    pub followers: i64,
    pub following: i64,
}

/// Relationship service
pub struct RelationshipService {
    repository: Arc<dyn Repository>,
    self_follow: SelfFollowPolicy,
}

impl RelationshipService {
    pub fn new(repository: Arc<dyn Repository>, self_follow: SelfFollowPolicy) -> Self {
        Self {
            repository,
            self_follow,
        }
    }

    pub fn self_follow_policy(&self) -> SelfFollowPolicy {
        self.self_follow
    }

    /// Make `follower` follow `followed`. Following twice is a no-op.
    pub fn follow(&self, follower: Uuid, followed: Uuid) -> Result<FollowOutcome> {
        self.require_user(follower)?;
        self.require_user(followed)?;

        let relationship = Relationship::new(follower, followed);
        if relationship.is_self_follow() && self.self_follow == SelfFollowPolicy::Ignore {
            return Ok(FollowOutcome::SelfFollowIgnored);
        }

        if self.repository.insert_relationship(&relationship)? {
            Ok(FollowOutcome::Followed)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Remove the edge if present. Returns whether anything was removed.
    pub fn unfollow(&self, follower: Uuid, followed: Uuid) -> Result<bool> {
        self.repository.delete_relationship(follower, followed)
    }

    /// Whether `follower` currently follows `followed`
    pub fn is_following(&self, follower: Uuid, followed: Uuid) -> Result<bool> {
        self.repository.relationship_exists(follower, followed)
    }

    /// Whether `user` is followed by `other`
    pub fn is_followed_by(&self, user: Uuid, other: Uuid) -> Result<bool> {
        self.repository.relationship_exists(other, user)
    }

    pub fn following(&self, user: Uuid) -> Result<Vec<User>> {
        self.require_user(user)?;
        self.repository.following(user)
    }

    pub fn followers(&self, user: Uuid) -> Result<Vec<User>> {
        self.require_user(user)?;
        self.repository.followers(user)
    }

    pub fn stats(&self, user: Uuid) -> Result<FollowStats> {
        self.require_user(user)?;
        Ok(FollowStats {
            followers: self.repository.count_followers(user)?,
            following: self.repository.count_following(user)?,
        })
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
    use crate::adapters::memory::InMemoryRepository;

    fn setup(policy: SelfFollowPolicy) -> (RelationshipService, User, User) {
        let repo = Arc::new(InMemoryRepository::new());
        let michael = User::new("Michael Example", "michael@example.com", "digest");
        let archer = User::new("Sterling Archer", "duchess@example.gov", "digest");
        repo.insert_user(&michael).unwrap();
        repo.insert_user(&archer).unwrap();
        (RelationshipService::new(repo, policy), michael, archer)
    }

    #[test]
    fn test_should_follow_and_unfollow_a_user() {
        let (service, michael, archer) = setup(SelfFollowPolicy::default());

        assert!(!service.is_following(michael.id, archer.id).unwrap());
        assert_eq!(service.follow(michael.id, archer.id).unwrap(), FollowOutcome::Followed);
        assert!(service.is_following(michael.id, archer.id).unwrap());
        assert!(service.is_followed_by(archer.id, michael.id).unwrap());
        assert_eq!(service.followers(archer.id).unwrap()[0].id, michael.id);

        assert!(service.unfollow(michael.id, archer.id).unwrap());
        assert!(!service.is_following(michael.id, archer.id).unwrap());
        assert!(service.followers(archer.id).unwrap().is_empty());
    }

    #[test]
    fn test_follow_is_directed() {
        let (service, michael, archer) = setup(SelfFollowPolicy::default());
        service.follow(michael.id, archer.id).unwrap();
        assert!(!service.is_following(archer.id, michael.id).unwrap());
    }

    #[test]
    fn test_follow_twice_is_idempotent() {
        let (service, michael, archer) = setup(SelfFollowPolicy::default());
        service.follow(michael.id, archer.id).unwrap();
        assert_eq!(
            service.follow(michael.id, archer.id).unwrap(),
            FollowOutcome::AlreadyFollowing
        );
        assert_eq!(service.following(michael.id).unwrap().len(), 1);
    }

    #[test]
    fn test_unfollow_without_edge_is_a_no_op() {
        let (service, michael, archer) = setup(SelfFollowPolicy::default());
        assert!(!service.unfollow(michael.id, archer.id).unwrap());
    }

    #[test]
    fn test_self_follow_ignored_by_default() {
        let (service, michael, _) = setup(SelfFollowPolicy::default());
        assert_eq!(
            service.follow(michael.id, michael.id).unwrap(),
            FollowOutcome::SelfFollowIgnored
        );
        assert!(!service.is_following(michael.id, michael.id).unwrap());
    }

    #[test]
    fn test_self_follow_allowed_by_policy() {
        let (service, michael, _) = setup(SelfFollowPolicy::Allow);
        assert_eq!(
            service.follow(michael.id, michael.id).unwrap(),
            FollowOutcome::Followed
        );
        assert!(service.is_following(michael.id, michael.id).unwrap());
    }

    #[test]
    fn test_follow_unknown_user() {
        let (service, michael, _) = setup(SelfFollowPolicy::default());
        let err = service.follow(michael.id, Uuid::new_v4()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stats() {
        let (service, michael, archer) = setup(SelfFollowPolicy::default());
        service.follow(michael.id, archer.id).unwrap();
        service.follow(archer.id, michael.id).unwrap();

        let stats = service.stats(michael.id).unwrap();
        assert_eq!(stats, FollowStats { followers: 1, following: 1 });
    }
}
