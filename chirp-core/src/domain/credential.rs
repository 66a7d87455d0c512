//! Credential digests and random tokens
//!
//! Secrets (passwords, remember tokens, activation and reset tokens) are never
//! stored; only their Argon2id PHC strings are. Verification reads the cost
//! parameters back out of the stored string, so digests created with different
//! costs can coexist.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Default Argon2id parameters (the argon2 crate's recommended defaults)
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_MEMORY_COST: u32 = 19456; // 19 MiB
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Which stored digest a token is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Password,
    Remember,
    Activation,
    Reset,
}

/// Argon2id cost parameters used when creating new digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl Argon2Params {
    /// Lowest cost argon2 accepts. For tests and demo data only.
    pub fn minimal() -> Self {
        Self {
            time_cost: 1,
            memory_cost: 8,
            parallelism: 1,
        }
    }
}

/// Creates Argon2id digests with a fixed cost
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialHasher {
    params: Argon2Params,
}

impl CredentialHasher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            None,
        )
        .map_err(|e| Error::credential(format!("Invalid argon2 params: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a secret into a PHC string
    pub fn digest(&self, secret: &str) -> Result<String> {
        let salt_bytes: [u8; 16] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::credential(format!("Invalid salt: {}", e)))?;

        self.argon2()?
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::credential(format!("Failed to hash secret: {}", e)))
    }
}

/// Check a secret against a stored PHC string.
///
/// Malformed digests never match.
pub fn verify(secret: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Generate a random URL-safe token (16 bytes of entropy)
pub fn new_token() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(Argon2Params::minimal())
    }

    #[test]
    fn test_digest_and_verify() {
        let digest = hasher().digest("fubareh").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify("fubareh", &digest));
        assert!(!verify("fubareH", &digest));
    }

    #[test]
    fn test_digests_are_salted() {
        let a = hasher().digest("same secret").unwrap();
        let b = hasher().digest("same secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        assert!(!verify("anything", ""));
        assert!(!verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_new_token_is_url_safe() {
        let token = new_token();
        assert_eq!(token.len(), 22);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, new_token());
    }

    #[test]
    fn test_invalid_params_are_reported() {
        let hasher = CredentialHasher::new(Argon2Params {
            time_cost: 0,
            memory_cost: 8,
            parallelism: 1,
        });
        let err = hasher.digest("secret").unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
    }
}
