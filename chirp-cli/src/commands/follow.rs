//! Follow commands - edit and inspect the follow graph

use anyhow::Result;
use colored::Colorize;

use chirp_core::{FollowOutcome, LoggingService};

use super::{get_context, log_user_event};
use crate::output;

pub fn follow(
    follower: &str,
    followed: &str,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let follower = ctx.user_service.resolve(follower)?;
    let followed = ctx.user_service.resolve(followed)?;

    let outcome = ctx.relationship_service.follow(follower.id, followed.id)?;
    if outcome == FollowOutcome::Followed {
        log_user_event(logger, "followed", "follow", follower.id);
    }

    if json {
        println!("{}", serde_json::json!({ "outcome": outcome }));
        return Ok(());
    }

    match outcome {
        FollowOutcome::Followed => {
            output::success(&format!("✓ {} now follows {}", follower.name, followed.name))
        }
        FollowOutcome::AlreadyFollowing => {
            output::info(&format!("{} already follows {}", follower.name, followed.name))
        }
        FollowOutcome::SelfFollowIgnored => {
            output::warning("Following yourself is not enabled (relationships.selfFollow)")
        }
    }
    Ok(())
}

pub fn unfollow(
    follower: &str,
    followed: &str,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let follower = ctx.user_service.resolve(follower)?;
    let followed = ctx.user_service.resolve(followed)?;

    let removed = ctx.relationship_service.unfollow(follower.id, followed.id)?;
    if removed {
        log_user_event(logger, "unfollowed", "unfollow", follower.id);
    }

    if json {
        println!("{}", serde_json::json!({ "unfollowed": removed }));
    } else if removed {
        output::success(&format!("✓ {} unfollowed {}", follower.name, followed.name));
    } else {
        output::info(&format!("{} was not following {}", follower.name, followed.name));
    }
    Ok(())
}

pub fn following(user: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user = ctx.user_service.resolve(user)?;
    let users = ctx.relationship_service.following(user.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    println!("{} {}", user.name.bold(), format!("follows {}", users.len()).dimmed());
    if !users.is_empty() {
        println!("{}", output::user_table(&users));
    }
    Ok(())
}

pub fn followers(user: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user = ctx.user_service.resolve(user)?;
    let users = ctx.relationship_service.followers(user.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    println!(
        "{} {}",
        user.name.bold(),
        format!("has {} followers", users.len()).dimmed()
    );
    if !users.is_empty() {
        println!("{}", output::user_table(&users));
    }
    Ok(())
}
