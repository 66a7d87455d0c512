//! Demo command - seed sample users, posts and follows

use anyhow::Result;
use colored::Colorize;

use chirp_core::adapters::demo::{generate_demo_users, DEMO_PASSWORD};

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.demo_service.seed()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success("✓ Demo data ready");
    println!(
        "  {} users, {} microposts, {} relationships added",
        result.users_created, result.microposts_created, result.relationships_created
    );
    println!();
    println!("{}", "Demo accounts".bold());
    for user in generate_demo_users() {
        println!("  {} <{}>", user.name, user.email);
    }
    println!("{}", format!("Password for all: {}", DEMO_PASSWORD).dimmed());
    Ok(())
}
