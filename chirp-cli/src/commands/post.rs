//! Post commands - publish, delete and list microposts

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use uuid::Uuid;

use chirp_core::{LoggingService, SaveOutcome};

use super::{get_context, log_user_event};
use crate::output;

#[derive(Subcommand)]
pub enum PostCommands {
    /// Publish a micropost (at most 140 characters)
    Create {
        /// Author email or ID
        user: String,
        content: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a micropost
    Delete {
        /// Micropost ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's microposts, most recent first
    List {
        /// Author email or ID
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: PostCommands, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;

    match command {
        PostCommands::Create {
            user,
            content,
            json,
        } => {
            let user = ctx.user_service.resolve(&user)?;
            match ctx.micropost_service.create(user.id, &content)? {
                SaveOutcome::Saved(post) => {
                    log_user_event(logger, "micropost_created", "post create", user.id);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&post)?);
                    } else {
                        output::success("✓ Micropost created");
                        println!("  {}", post.id);
                    }
                }
                SaveOutcome::Invalid(violations) => {
                    if json {
                        println!("{}", serde_json::json!({ "saved": false, "errors": violations }));
                    } else {
                        output::violations(&violations);
                    }
                    bail!("Micropost was not saved");
                }
            }
        }
        PostCommands::Delete { id, json } => {
            let id = Uuid::parse_str(&id).with_context(|| format!("Invalid micropost ID: {}", id))?;
            let author = ctx.micropost_service.get(id).ok().map(|post| post.user_id);
            let deleted = ctx.micropost_service.delete(id)?;
            if let (true, Some(author)) = (deleted, author) {
                log_user_event(logger, "micropost_deleted", "post delete", author);
            }
            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else if deleted {
                output::success("✓ Micropost deleted");
            } else {
                output::warning("No such micropost");
            }
        }
        PostCommands::List { user, json } => {
            let user = ctx.user_service.resolve(&user)?;
            let posts = ctx.micropost_service.list_for_user(user.id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else if posts.is_empty() {
                output::info(&format!("{} has not posted yet.", user.name));
            } else {
                println!("{}", output::post_table(&posts, |_| user.name.clone()));
            }
        }
    }

    Ok(())
}
