//! Status command - show store counts

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Chirp Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Users", &status.total_users.to_string()]);
    table.add_row(vec!["Microposts", &status.total_microposts.to_string()]);
    table.add_row(vec!["Relationships", &status.total_relationships.to_string()]);
    println!("{}", table);

    if let Some(path) = ctx.repository.db_path() {
        println!("{}", format!("Database: {}", path.display()).dimmed());
    }

    if !status.users.is_empty() {
        println!();
        println!("{}", "Most Active Users".bold());
        let mut table = output::create_table();
        table.set_header(vec!["Name", "Microposts", "Following", "Followers"]);
        for user in status.users.iter().take(10) {
            table.add_row(vec![
                user.name.clone(),
                user.microposts.to_string(),
                user.following.to_string(),
                user.followers.to_string(),
            ]);
        }
        println!("{}", table);
    }

    Ok(())
}
