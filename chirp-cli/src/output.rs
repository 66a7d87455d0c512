//! Output formatting utilities

use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use chirp_core::{Micropost, User, Violation};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// "password_confirmation" -> "Password confirmation"
fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Full sentence for a violation, e.g. "Email has already been taken"
pub fn full_message(violation: &Violation) -> String {
    format!("{} {}", humanize(&violation.field), violation.message)
}

/// Print validation failures, one per line
pub fn violations(violations: &[Violation]) {
    error(&format!(
        "The form contains {} error{}:",
        violations.len(),
        if violations.len() == 1 { "" } else { "s" }
    ));
    for violation in violations {
        eprintln!("  • {}", full_message(violation));
    }
}

/// Short relative time, e.g. "5 minutes ago"
pub fn time_ago(at: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "less than a minute ago".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 365 {
        plural(elapsed.num_days(), "day")
    } else {
        plural(elapsed.num_days() / 365, "year")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Table of users
pub fn user_table(users: &[User]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Name", "Email", "Activated", "ID"]);
    for user in users {
        table.add_row(vec![
            user.name.clone(),
            user.email.clone(),
            (if user.activated { "yes" } else { "no" }).to_string(),
            user.id.to_string(),
        ]);
    }
    table
}

/// Table of posts, with author names resolved through `author`
pub fn post_table(posts: &[Micropost], author: impl Fn(&Micropost) -> String) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Posted", "Author", "Content", "ID"]);
    for post in posts {
        table.add_row(vec![
            time_ago(post.created_at),
            author(post),
            post.content.clone(),
            post.id.to_string(),
        ]);
    }
    table
}
