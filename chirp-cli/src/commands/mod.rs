//! CLI command implementations

pub mod demo;
pub mod feed;
pub mod follow;
pub mod logs;
pub mod post;
pub mod status;
pub mod user;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chirp_core::{ChirpContext, EntryPoint, LogEvent, LoggingService};
use uuid::Uuid;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let chirp_dir = get_chirp_dir().ok()?;
    std::fs::create_dir_all(&chirp_dir).ok()?;
    LoggingService::new(&chirp_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Record that `command` did `event` on behalf of `user_id`
pub fn log_user_event(logger: &Option<LoggingService>, event: &str, command: &str, user_id: Uuid) {
    log_event(
        logger,
        LogEvent::new(event).with_command(command).with_user(user_id),
    );
}

/// Get the chirp directory from environment or default
pub fn get_chirp_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CHIRP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".chirp"))
        .context("Could not find home directory; set CHIRP_DIR")
}

/// Get or create chirp context
pub fn get_context() -> Result<ChirpContext> {
    let chirp_dir = get_chirp_dir()?;

    std::fs::create_dir_all(&chirp_dir)
        .with_context(|| format!("Failed to create chirp directory: {:?}", chirp_dir))?;

    ChirpContext::new(&chirp_dir).context("Failed to initialize chirp context")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_user_event_records_user_id() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Some(LoggingService::new(temp_dir.path(), EntryPoint::Cli, "test").unwrap());
        let user_id = Uuid::new_v4();

        log_user_event(&logger, "followed", "follow", user_id);

        let entries = logger.as_ref().unwrap().get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "followed");
        assert_eq!(entries[0].command.as_deref(), Some("follow"));
        assert_eq!(entries[0].user_id, Some(user_id.to_string()));
    }

    #[test]
    fn test_log_user_event_without_logger_is_noop() {
        log_user_event(&None, "feed_viewed", "feed", Uuid::new_v4());
    }
}
