//! Demo data for trying things out and for tests
//!
//! A small, fixed cast of users with posts and follow edges:
//! - reacher follows lana and malory, but not archer
//! - lana and archer follow reacher
//! - every user has a few posts spread over the last days

use chrono::{DateTime, Duration, Utc};

/// Password shared by every demo user
pub const DEMO_PASSWORD: &str = "password";

/// A demo account, keyed by a short handle
#[derive(Debug, Clone)]
pub struct DemoUser {
    pub handle: &'static str,
    pub name: &'static str,
    pub email: &'static str,
}

/// A demo post, authored by `handle`, `minutes_ago` before seeding time
#[derive(Debug, Clone)]
pub struct DemoPost {
    pub handle: &'static str,
    pub content: &'static str,
    pub minutes_ago: i64,
}

impl DemoPost {
    pub fn created_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::minutes(self.minutes_ago)
    }
}

/// Generate demo users
pub fn generate_demo_users() -> Vec<DemoUser> {
    vec![
        DemoUser { handle: "reacher", name: "Jack Reacher", email: "reacher@example.com" },
        DemoUser { handle: "archer", name: "Sterling Archer", email: "duchess@example.gov" },
        DemoUser { handle: "lana", name: "Lana Kane", email: "hands@example.gov" },
        DemoUser { handle: "malory", name: "Malory Archer", email: "boss@example.gov" },
    ]
}

/// Generate demo posts
pub fn generate_demo_posts() -> Vec<DemoPost> {
    vec![
        DemoPost { handle: "reacher", content: "I just ate an orange!", minutes_ago: 10 },
        DemoPost { handle: "reacher", content: "Check out the @tauday site by @mhartl", minutes_ago: 3 * 365 * 24 * 60 },
        DemoPost { handle: "reacher", content: "Sad cats are sad", minutes_ago: 2 * 60 },
        DemoPost { handle: "reacher", content: "Writing a short test", minutes_ago: 1 },
        DemoPost { handle: "archer", content: "Oh, is that what you want? Because that's how you get ants!", minutes_ago: 2 * 365 * 24 * 60 },
        DemoPost { handle: "archer", content: "Danger zone!", minutes_ago: 4 * 24 * 60 },
        DemoPost { handle: "lana", content: "I'm sorry. Your words made sense, but your sarcastic tone did not.", minutes_ago: 10 },
        DemoPost { handle: "lana", content: "Dude, this van's, like, rolling probable cause.", minutes_ago: 4 * 60 },
        DemoPost { handle: "malory", content: "Lana, do you want to do it or not?", minutes_ago: 6 * 60 },
    ]
}

/// Generate demo follow edges as (follower handle, followed handle)
pub fn generate_demo_relationships() -> Vec<(&'static str, &'static str)> {
    vec![
        ("reacher", "lana"),
        ("reacher", "malory"),
        ("lana", "reacher"),
        ("archer", "reacher"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_handles_are_consistent() {
        let handles: HashSet<_> = generate_demo_users().iter().map(|u| u.handle).collect();
        assert_eq!(handles.len(), 4);

        for post in generate_demo_posts() {
            assert!(handles.contains(post.handle), "unknown author {}", post.handle);
            assert!(post.content.chars().count() <= crate::domain::MAX_CONTENT_LEN);
        }
        for (follower, followed) in generate_demo_relationships() {
            assert!(handles.contains(follower));
            assert!(handles.contains(followed));
        }
    }

    #[test]
    fn test_reacher_does_not_follow_archer() {
        assert!(!generate_demo_relationships().contains(&("reacher", "archer")));
        assert!(generate_demo_relationships().contains(&("reacher", "lana")));
    }
}
