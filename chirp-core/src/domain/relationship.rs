//! Follow relationships between users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed follow edge: `follower_id` sees `followed_id`'s posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(follower_id: Uuid, followed_id: Uuid) -> Self {
        Self {
            follower_id,
            followed_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_self_follow(&self) -> bool {
        self.follower_id == self.followed_id
    }
}

/// What to do when a user tries to follow themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfFollowPolicy {
    /// Treat the request as a no-op
    #[default]
    Ignore,
    /// Store the edge like any other
    Allow,
}

impl SelfFollowPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ignore" | "reject" => Some(Self::Ignore),
            "allow" => Some(Self::Allow),
            _ => None,
        }
    }
}

/// Result of a follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    SelfFollowIgnored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_follow_detection() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(Relationship::new(a, a).is_self_follow());
        assert!(!Relationship::new(a, b).is_self_follow());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(SelfFollowPolicy::parse("Allow"), Some(SelfFollowPolicy::Allow));
        assert_eq!(SelfFollowPolicy::parse("ignore"), Some(SelfFollowPolicy::Ignore));
        assert_eq!(SelfFollowPolicy::parse("reject"), Some(SelfFollowPolicy::Ignore));
        assert_eq!(SelfFollowPolicy::parse("sometimes"), None);
        assert_eq!(SelfFollowPolicy::default(), SelfFollowPolicy::Ignore);
    }
}
