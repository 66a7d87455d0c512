//! Chirp CLI - follow people and read their microposts from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use chirp_core::{LogEvent, LoggingService};
use commands::{demo, feed, follow, get_logger, log_event, logs, post, status, user};

/// Chirp - a tiny social graph in your terminal
#[derive(Parser)]
#[command(name = "chirp", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Manage microposts
    Post {
        #[command(subcommand)]
        command: post::PostCommands,
    },

    /// Follow a user
    Follow {
        /// Follower email or ID
        follower: String,
        /// Email or ID of the user to follow
        followed: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stop following a user
    Unfollow {
        /// Follower email or ID
        follower: String,
        /// Email or ID of the user to unfollow
        followed: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the users someone follows
    Following {
        /// User email or ID
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List someone's followers
    Followers {
        /// User email or ID
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user's feed
    Feed {
        /// User email or ID
        user: String,
        /// Page number, starting at 1
        #[arg(long, short, default_value = "1")]
        page: usize,
        /// Show the whole feed instead of one page
        #[arg(long, conflicts_with = "page")]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show store status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Seed demo users, posts and follows
    Demo {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::User { command } => match command {
                user::UserCommands::Create { .. } => "user create",
                user::UserCommands::List { .. } => "user list",
                user::UserCommands::Show { .. } => "user show",
                user::UserCommands::Update { .. } => "user update",
                user::UserCommands::Destroy { .. } => "user destroy",
                user::UserCommands::Login { .. } => "user login",
            },
            Commands::Post { command } => match command {
                post::PostCommands::Create { .. } => "post create",
                post::PostCommands::Delete { .. } => "post delete",
                post::PostCommands::List { .. } => "post list",
            },
            Commands::Follow { .. } => "follow",
            Commands::Unfollow { .. } => "unfollow",
            Commands::Following { .. } => "following",
            Commands::Followers { .. } => "followers",
            Commands::Feed { .. } => "feed",
            Commands::Status { .. } => "status",
            Commands::Demo { .. } => "demo",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command_name = cli.command.name();

    // Reading the log should not add to it
    let logger = match cli.command {
        Commands::Logs { .. } => None,
        _ => get_logger(),
    };
    log_event(&logger, LogEvent::new("command_started").with_command(command_name));

    match run(cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(command_name)
                    .with_error(e.to_string())
                    .with_error_details(format!("{:?}", e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: &Option<LoggingService>) -> Result<()> {
    match cli.command {
        Commands::User { command } => user::run(command, logger),
        Commands::Post { command } => post::run(command, logger),
        Commands::Follow { follower, followed, json } => {
            follow::follow(&follower, &followed, json, logger)
        }
        Commands::Unfollow { follower, followed, json } => {
            follow::unfollow(&follower, &followed, json, logger)
        }
        Commands::Following { user, json } => follow::following(&user, json),
        Commands::Followers { user, json } => follow::followers(&user, json),
        Commands::Feed { user, page, all, json } => feed::run(&user, page, all, json, logger),
        Commands::Status { json } => status::run(json),
        Commands::Demo { json } => demo::run(json),
        Commands::Logs { command } => logs::run(command),
    }
}
