//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod credential;
mod micropost;
mod relationship;
pub mod result;
mod user;
pub mod validation;

pub use credential::{Argon2Params, CredentialHasher, CredentialKind};
pub use micropost::{Micropost, MAX_CONTENT_LEN};
pub use relationship::{FollowOutcome, Relationship, SelfFollowPolicy};
pub use user::{normalize_email, NewUser, User, UserChanges};
pub use validation::{SaveOutcome, UserCandidate, Violation};
