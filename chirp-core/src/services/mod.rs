//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod demo;
mod feed;
pub mod logging;
mod micropost;
pub mod migration;
mod relationship;
mod status;
mod user;

pub use demo::{DemoSeedResult, DemoService};
pub use feed::{FeedService, DEFAULT_PAGE_SIZE};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use micropost::MicropostService;
pub use migration::{MigrationResult, MigrationService};
pub use relationship::{FollowStats, RelationshipService};
pub use status::{StatusService, StatusSummary, UserSummary};
pub use user::UserService;
