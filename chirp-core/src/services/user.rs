//! User service - registration, updates, credentials and account removal

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::credential::{self, CredentialHasher};
use crate::domain::result::{Error, Result};
use crate::domain::validation::{validate_user, UserCandidate};
use crate::domain::{
    normalize_email, CredentialKind, NewUser, SaveOutcome, User, UserChanges, Violation,
};
use crate::ports::{DestroyReport, Repository};

const EMAIL_TAKEN: &str = "has already been taken";

/// User service
pub struct UserService {
    repository: Arc<dyn Repository>,
    hasher: CredentialHasher,
}

impl UserService {
    pub fn new(repository: Arc<dyn Repository>, hasher: CredentialHasher) -> Self {
        Self { repository, hasher }
    }

    /// Validate a candidate against the field rules and email uniqueness.
    ///
    /// `existing` is the id of the user being updated, so a user never
    /// conflicts with their own email.
    pub fn validate(
        &self,
        candidate: &UserCandidate,
        existing: Option<Uuid>,
    ) -> Result<Vec<Violation>> {
        let mut violations = validate_user(candidate);

        let email_is_checkable = !violations.iter().any(|v| v.field == "email");
        if email_is_checkable {
            if let Some(other) = self.repository.find_user_by_email(candidate.email)? {
                if Some(other.id) != existing {
                    violations.push(Violation::new("email", EMAIL_TAKEN));
                }
            }
        }

        Ok(violations)
    }

    /// Register a new user. Invalid input is reported, not raised, and
    /// nothing is stored.
    pub fn create(&self, new_user: &NewUser) -> Result<SaveOutcome<User>> {
        let email = normalize_email(&new_user.email);
        let candidate = UserCandidate {
            name: &new_user.name,
            email: &email,
            password: Some(&new_user.password),
            password_confirmation: new_user.password_confirmation.as_deref(),
        };

        let violations = self.validate(&candidate, None)?;
        if !violations.is_empty() {
            return Ok(SaveOutcome::Invalid(violations));
        }

        let digest = self.hasher.digest(&new_user.password)?;
        let user = User::new(new_user.name.clone(), &email, digest);

        match self.repository.insert_user(&user) {
            Ok(()) => Ok(SaveOutcome::Saved(user)),
            // Lost a race with a concurrent registration of the same email
            Err(Error::Validation(_)) => Ok(SaveOutcome::Invalid(vec![Violation::new(
                "email",
                EMAIL_TAKEN,
            )])),
            Err(e) => Err(e),
        }
    }

    /// Apply changes to an existing user. The password is only validated and
    /// re-hashed when a new one is given.
    pub fn update(&self, id: Uuid, changes: &UserChanges) -> Result<SaveOutcome<User>> {
        let mut user = self.get(id)?;

        let name = changes.name.clone().unwrap_or_else(|| user.name.clone());
        let email = changes
            .email
            .as_deref()
            .map(normalize_email)
            .unwrap_or_else(|| user.email.clone());
        let candidate = UserCandidate {
            name: &name,
            email: &email,
            password: changes.password.as_deref(),
            password_confirmation: changes.password_confirmation.as_deref(),
        };

        let violations = self.validate(&candidate, Some(id))?;
        if !violations.is_empty() {
            return Ok(SaveOutcome::Invalid(violations));
        }

        if let Some(password) = &changes.password {
            user.password_digest = self.hasher.digest(password)?;
            // A new password invalidates outstanding reset links
            user.reset_digest = None;
        }
        user.name = name;
        user.email = email;
        user.updated_at = Utc::now();

        match self.repository.update_user(&user) {
            Ok(()) => Ok(SaveOutcome::Saved(user)),
            Err(Error::Validation(_)) => Ok(SaveOutcome::Invalid(vec![Violation::new(
                "email",
                EMAIL_TAKEN,
            )])),
            Err(e) => Err(e),
        }
    }

    /// Fetch a user that must exist
    pub fn get(&self, id: Uuid) -> Result<User> {
        self.repository
            .get_user(id)?
            .ok_or_else(|| Error::not_found(format!("user {}", id)))
    }

    /// Reload the stored copy of a user
    pub fn reload(&self, user: &User) -> Result<User> {
        self.get(user.id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.find_user_by_email(&normalize_email(email))
    }

    pub fn list(&self) -> Result<Vec<User>> {
        self.repository.list_users()
    }

    /// Resolve a user given either a UUID or an email address
    pub fn resolve(&self, reference: &str) -> Result<User> {
        if let Ok(id) = Uuid::parse_str(reference) {
            return self.get(id);
        }
        self.find_by_email(reference)?
            .ok_or_else(|| Error::not_found(format!("user {}", reference)))
    }

    /// Check an email/password pair. Unknown emails and wrong passwords both
    /// yield `None`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = self.find_by_email(email)?;
        Ok(user.filter(|u| u.authenticated(CredentialKind::Password, Some(password))))
    }

    /// Issue a remember-me token; only its digest is stored
    pub fn remember(&self, id: Uuid) -> Result<String> {
        self.issue_token(id, CredentialKind::Remember)
    }

    /// Drop the remember-me digest
    pub fn forget(&self, id: Uuid) -> Result<()> {
        let mut user = self.get(id)?;
        user.remember_digest = None;
        user.updated_at = Utc::now();
        self.repository.update_user(&user)
    }

    /// Issue an activation token for a not yet activated user
    pub fn create_activation(&self, id: Uuid) -> Result<String> {
        self.issue_token(id, CredentialKind::Activation)
    }

    /// Activate a user if the token matches. Returns whether it did.
    pub fn activate(&self, id: Uuid, token: &str) -> Result<bool> {
        let mut user = self.get(id)?;
        if user.activated || !user.authenticated(CredentialKind::Activation, Some(token)) {
            return Ok(false);
        }

        let now = Utc::now();
        user.activated = true;
        user.activated_at = Some(now);
        user.activation_digest = None;
        user.updated_at = now;
        self.repository.update_user(&user)?;
        Ok(true)
    }

    /// Issue a password reset token
    pub fn create_reset(&self, id: Uuid) -> Result<String> {
        self.issue_token(id, CredentialKind::Reset)
    }

    fn issue_token(&self, id: Uuid, kind: CredentialKind) -> Result<String> {
        let mut user = self.get(id)?;
        let token = credential::new_token();
        let digest = Some(self.hasher.digest(&token)?);

        match kind {
            CredentialKind::Remember => user.remember_digest = digest,
            CredentialKind::Activation => user.activation_digest = digest,
            CredentialKind::Reset => user.reset_digest = digest,
            CredentialKind::Password => {
                return Err(Error::credential("passwords are not issued as tokens"))
            }
        }
        user.updated_at = Utc::now();
        self.repository.update_user(&user)?;
        Ok(token)
    }

    /// Delete a user with all their posts and follow edges, atomically.
    pub fn destroy(&self, id: Uuid) -> Result<DestroyReport> {
        let report = self.repository.destroy_user(id)?;
        if !report.user_deleted {
            return Err(Error::not_found(format!("user {}", id)));
        }
        Ok(report)
    }
}
