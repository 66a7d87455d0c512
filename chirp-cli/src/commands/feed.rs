//! Feed command - a user's posts plus posts from everyone they follow

use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use uuid::Uuid;

use chirp_core::LoggingService;

use super::{get_context, log_user_event};
use crate::output;

pub fn run(
    user: &str,
    page: usize,
    all: bool,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let user = ctx.user_service.resolve(user)?;

    let posts = if all {
        ctx.feed_service.feed(user.id)?
    } else {
        ctx.feed_service.feed_page(user.id, page)?
    };
    log_user_event(logger, "feed_viewed", "feed", user.id);

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        output::info("Nothing to show. Follow someone or post something.");
        return Ok(());
    }

    let mut names: HashMap<Uuid, String> = HashMap::new();
    for post in &posts {
        if !names.contains_key(&post.user_id) {
            let name = ctx
                .user_service
                .get(post.user_id)
                .map(|u| u.name)
                .unwrap_or_else(|_| "unknown".to_string());
            names.insert(post.user_id, name);
        }
    }

    println!("{}", format!("Feed for {}", user.name).bold());
    println!(
        "{}",
        output::post_table(&posts, |p| names.get(&p.user_id).cloned().unwrap_or_default())
    );
    if !all && posts.len() == ctx.feed_service.page_size() {
        println!("{}", format!("More with --page {}", page.max(1) + 1).dimmed());
    }
    Ok(())
}
