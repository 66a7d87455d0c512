//! User commands - register, inspect, update and remove accounts

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Password};

use chirp_core::{LoggingService, NewUser, SaveOutcome, User, UserChanges};

use super::{get_context, log_user_event};
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Create {
        /// Display name
        name: String,
        /// Email address (stored lower-cased)
        email: String,
        /// Password (prompted for if omitted)
        #[arg(long, env = "CHIRP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one user with follow counts
    Show {
        /// User email or ID
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change name, email or password
    Update {
        /// User email or ID
        user: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a user with all their posts and follows
    Destroy {
        /// User email or ID
        user: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check an email and password
    Login {
        email: String,
        /// Password (prompted for if omitted)
        #[arg(long, env = "CHIRP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Issue a remember-me token on success
        #[arg(long)]
        remember: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn prompt_new_password() -> Result<(String, String)> {
    let password = Password::new().with_prompt("Password").interact()?;
    let confirmation = Password::new().with_prompt("Confirm password").interact()?;
    Ok((password, confirmation))
}

/// Report a saved user, or print the violations and fail
fn finish(outcome: SaveOutcome<User>, json: bool, verb: &str) -> Result<()> {
    match outcome {
        SaveOutcome::Saved(user) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                output::success(&format!("✓ {} {} <{}>", verb, user.name, user.email));
                println!("  {}", user.id.to_string().dimmed());
            }
            Ok(())
        }
        SaveOutcome::Invalid(violations) => {
            if json {
                let messages: Vec<String> = violations.iter().map(output::full_message).collect();
                println!(
                    "{}",
                    serde_json::json!({ "saved": false, "errors": violations, "messages": messages })
                );
            } else {
                output::violations(&violations);
            }
            bail!("User was not saved")
        }
    }
}

pub fn run(command: UserCommands, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;

    match command {
        UserCommands::Create {
            name,
            email,
            password,
            json,
        } => {
            let (password, confirmation) = match password {
                Some(password) => (password.clone(), password),
                None => prompt_new_password()?,
            };
            let new_user = NewUser {
                name,
                email,
                password,
                password_confirmation: Some(confirmation),
            };
            let outcome = ctx.user_service.create(&new_user)?;
            if let SaveOutcome::Saved(user) = &outcome {
                log_user_event(logger, "user_created", "user create", user.id);
            }
            finish(outcome, json, "Created")
        }
        UserCommands::List { json } => {
            let users = ctx.user_service.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
                return Ok(());
            }
            if users.is_empty() {
                output::info("No users yet. Try `chirp demo` to add some.");
                return Ok(());
            }
            println!("{}", output::user_table(&users));
            Ok(())
        }
        UserCommands::Show { user, json } => {
            let user = ctx.user_service.resolve(&user)?;
            let stats = ctx.relationship_service.stats(user.id)?;
            let posts = ctx.micropost_service.list_for_user(user.id)?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "user": user,
                        "followers": stats.followers,
                        "following": stats.following,
                        "microposts": posts.len(),
                    }))?
                );
                return Ok(());
            }

            println!("{}", user.name.bold());
            println!("  {}", user.email);
            println!("  {}", user.id.to_string().dimmed());
            println!();
            println!(
                "  {} following  {} followers  {} microposts",
                stats.following,
                stats.followers,
                posts.len()
            );
            if !posts.is_empty() {
                println!();
                println!("{}", output::post_table(&posts, |_| user.name.clone()));
            }
            Ok(())
        }
        UserCommands::Update {
            user,
            name,
            email,
            password,
            json,
        } => {
            let user = ctx.user_service.resolve(&user)?;
            let (password, password_confirmation) = if password {
                let (p, c) = prompt_new_password()?;
                (Some(p), Some(c))
            } else {
                (None, None)
            };
            let changes = UserChanges {
                name,
                email,
                password,
                password_confirmation,
            };
            let outcome = ctx.user_service.update(user.id, &changes)?;
            if let SaveOutcome::Saved(user) = &outcome {
                log_user_event(logger, "user_updated", "user update", user.id);
            }
            finish(outcome, json, "Updated")
        }
        UserCommands::Destroy { user, force, json } => {
            let user = ctx.user_service.resolve(&user)?;

            if !force && !json {
                println!(
                    "\n{}",
                    format!("This will delete {} <{}>.", user.name, user.email).yellow()
                );
                println!(
                    "{}\n",
                    "Their microposts and follow relationships are deleted too.".dimmed()
                );
                if !Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
                {
                    println!("{}\n", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            let report = ctx.user_service.destroy(user.id)?;
            log_user_event(logger, "user_destroyed", "user destroy", user.id);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::success(&format!("✓ Deleted {}", user.name));
                println!(
                    "  {} microposts and {} relationships removed",
                    report.microposts_deleted, report.relationships_deleted
                );
            }
            Ok(())
        }
        UserCommands::Login {
            email,
            password,
            remember,
            json,
        } => {
            let password = match password {
                Some(password) => password,
                None => Password::new().with_prompt("Password").interact()?,
            };

            let Some(user) = ctx.user_service.authenticate(&email, &password)? else {
                if json {
                    println!("{}", serde_json::json!({ "authenticated": false }));
                }
                bail!("Invalid email/password combination");
            };
            log_user_event(logger, "user_authenticated", "user login", user.id);

            let token = if remember {
                Some(ctx.user_service.remember(user.id)?)
            } else {
                None
            };

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "authenticated": true,
                        "user": user,
                        "remember_token": token,
                    })
                );
            } else {
                output::success(&format!("✓ Logged in as {}", user.name));
                if let Some(token) = token {
                    println!("  Remember token: {}", token);
                }
                if !user.activated {
                    output::warning("Account not activated.");
                }
            }
            Ok(())
        }
    }
}
