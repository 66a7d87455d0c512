//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credential::{self, CredentialKind};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Always stored lower-case
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    #[serde(skip_serializing, default)]
    pub remember_digest: Option<String>,
    #[serde(skip_serializing, default)]
    pub activation_digest: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_digest: Option<String>,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet activated user. The email is normalized.
    pub fn new(
        name: impl Into<String>,
        email: &str,
        password_digest: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: normalize_email(email),
            password_digest: password_digest.into(),
            remember_digest: None,
            activation_digest: None,
            reset_digest: None,
            activated: false,
            activated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored digest for a credential kind, if any
    pub fn digest_for(&self, kind: CredentialKind) -> Option<&str> {
        match kind {
            CredentialKind::Password => {
                Some(self.password_digest.as_str()).filter(|d| !d.is_empty())
            }
            CredentialKind::Remember => self.remember_digest.as_deref(),
            CredentialKind::Activation => self.activation_digest.as_deref(),
            CredentialKind::Reset => self.reset_digest.as_deref(),
        }
    }

    /// Check a token against the stored digest for `kind`.
    ///
    /// Returns false when either side is missing; never fails.
    pub fn authenticated(&self, kind: CredentialKind, token: Option<&str>) -> bool {
        match (self.digest_for(kind), token) {
            (Some(digest), Some(token)) => credential::verify(token, digest),
            _ => false,
        }
    }
}

/// Canonical form of an email address
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Input for registering a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            name: name.into(),
            email: email.into(),
            password_confirmation: Some(password.clone()),
            password,
        }
    }
}

/// Partial update of a user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}
