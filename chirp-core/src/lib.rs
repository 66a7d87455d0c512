//! Chirp Core - Business logic for a small microblogging social graph
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Micropost, Relationship) and validation
//! - **ports**: Trait definitions for external dependencies (Repository)
//! - **services**: Business logic orchestration (users, follows, feed)
//! - **adapters**: Concrete implementations (DuckDB, in-memory, demo data)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use domain::CredentialHasher;
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    FollowOutcome, Micropost, NewUser, Relationship, SaveOutcome, SelfFollowPolicy, User,
    UserChanges, Violation,
};
pub use domain::result::Error;
pub use ports::DestroyReport;
pub use services::{EntryPoint, LogEntry, LogEvent, LoggingService};

/// Database file inside the chirp directory
pub const DB_FILENAME: &str = "chirp.duckdb";

/// Main context for Chirp operations
///
/// This is the primary entry point for all business logic. It holds
/// the database connection, configuration, and all services.
pub struct ChirpContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub user_service: UserService,
    pub micropost_service: MicropostService,
    pub relationship_service: RelationshipService,
    pub feed_service: FeedService,
    pub status_service: StatusService,
    pub demo_service: DemoService,
}

impl ChirpContext {
    /// Create a new Chirp context
    pub fn new(chirp_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(chirp_dir)?;
        let config = Config::load(chirp_dir)?;

        let db_path = chirp_dir.join(DB_FILENAME);
        let repository = Arc::new(DuckDbRepository::new(&db_path)?);

        // Initialize schema
        repository.ensure_schema()?;

        Ok(Self::with_repository(config, repository))
    }

    /// Wire all services around an already opened repository
    pub fn with_repository(config: Config, repository: Arc<DuckDbRepository>) -> Self {
        let store: Arc<dyn Repository> = repository.clone();
        let hasher = CredentialHasher::new(config.argon2);

        let user_service = UserService::new(Arc::clone(&store), hasher);
        let micropost_service = MicropostService::new(Arc::clone(&store));
        let relationship_service = RelationshipService::new(Arc::clone(&store), config.self_follow);
        let feed_service = FeedService::new(Arc::clone(&store), config.feed_page_size);
        let status_service = StatusService::new(Arc::clone(&store));
        let demo_service = DemoService::new(store, hasher);

        Self {
            config,
            repository,
            user_service,
            micropost_service,
            relationship_service,
            feed_service,
            status_service,
            demo_service,
        }
    }
}
