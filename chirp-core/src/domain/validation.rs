//! Record validation
//!
//! Each record type has an ordered table of rules. A rule names the field it
//! guards, a predicate that must hold, and the message reported when it does
//! not. Validation never fails: it returns the list of violations, which is
//! empty for a valid record.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::micropost::MAX_CONTENT_LEN;

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;

// ASCII only: `\w` and `(?i)` would also admit letters like `ö` or the Kelvin sign
const EMAIL_PATTERN: &str =
    r"\A[A-Za-z0-9_+\-.]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]+\z";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Outcome of a write that is subject to validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<T> {
    Saved(T),
    Invalid(Vec<Violation>),
}

impl<T> SaveOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn saved(self) -> Option<T> {
        match self {
            Self::Saved(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Saved(_) => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

/// The user fields subject to validation
#[derive(Debug, Clone, Copy)]
pub struct UserCandidate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    /// `None` when the password is not being changed
    pub password: Option<&'a str>,
    pub password_confirmation: Option<&'a str>,
}

struct Rule<F> {
    field: &'static str,
    check: F,
    message: &'static str,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn name_present(c: &UserCandidate) -> bool {
    !is_blank(c.name)
}

fn name_length(c: &UserCandidate) -> bool {
    char_len(c.name) <= MAX_NAME_LEN
}

fn email_present(c: &UserCandidate) -> bool {
    !is_blank(c.email)
}

fn email_length(c: &UserCandidate) -> bool {
    char_len(c.email) <= MAX_EMAIL_LEN
}

fn email_format(c: &UserCandidate) -> bool {
    is_blank(c.email) || email_regex().is_match(c.email)
}

fn password_present(c: &UserCandidate) -> bool {
    c.password.map_or(true, |p| !is_blank(p))
}

fn password_length(c: &UserCandidate) -> bool {
    c.password.map_or(true, |p| char_len(p) >= MIN_PASSWORD_LEN)
}

fn password_confirmed(c: &UserCandidate) -> bool {
    match (c.password, c.password_confirmation) {
        (Some(password), Some(confirmation)) => password == confirmation,
        _ => true,
    }
}

const USER_RULES: &[Rule<fn(&UserCandidate<'_>) -> bool>] = &[
    Rule { field: "name", check: name_present, message: "can't be blank" },
    Rule { field: "name", check: name_length, message: "is too long (maximum is 50 characters)" },
    Rule { field: "email", check: email_present, message: "can't be blank" },
    Rule { field: "email", check: email_length, message: "is too long (maximum is 255 characters)" },
    Rule { field: "email", check: email_format, message: "is invalid" },
    Rule { field: "password", check: password_present, message: "can't be blank" },
    Rule { field: "password", check: password_length, message: "is too short (minimum is 6 characters)" },
    Rule { field: "password_confirmation", check: password_confirmed, message: "doesn't match password" },
];

/// Run the user rules in order. Uniqueness needs the store and is checked by
/// `UserService`.
pub fn validate_user(candidate: &UserCandidate) -> Vec<Violation> {
    USER_RULES
        .iter()
        .filter(|rule| !(rule.check)(candidate))
        .map(|rule| Violation::new(rule.field, rule.message))
        .collect()
}

fn content_present(content: &str) -> bool {
    !is_blank(content)
}

fn content_length(content: &str) -> bool {
    char_len(content) <= MAX_CONTENT_LEN
}

const MICROPOST_RULES: &[Rule<fn(&str) -> bool>] = &[
    Rule { field: "content", check: content_present, message: "can't be blank" },
    Rule { field: "content", check: content_length, message: "is too long (maximum is 140 characters)" },
];

pub fn validate_micropost(content: &str) -> Vec<Violation> {
    MICROPOST_RULES
        .iter()
        .filter(|rule| !(rule.check)(content))
        .map(|rule| Violation::new(rule.field, rule.message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> UserCandidate<'static> {
        UserCandidate {
            name: "Example User",
            email: "user@example.org",
            password: Some("fubareh"),
            password_confirmation: Some("fubareh"),
        }
    }

    fn fields(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_candidate() {
        assert!(validate_user(&candidate()).is_empty());
    }

    #[test]
    fn test_name_should_be_present() {
        let c = UserCandidate { name: "     ", ..candidate() };
        assert_eq!(fields(&validate_user(&c)), vec!["name"]);
    }

    #[test]
    fn test_name_should_not_be_too_long() {
        let long = "a".repeat(51);
        let c = UserCandidate { name: &long, ..candidate() };
        let violations = validate_user(&c);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("too long"));

        let ok = "a".repeat(50);
        let c = UserCandidate { name: &ok, ..candidate() };
        assert!(validate_user(&c).is_empty());
    }

    #[test]
    fn test_email_should_be_present() {
        let c = UserCandidate { email: "    ", ..candidate() };
        assert_eq!(fields(&validate_user(&c)), vec!["email"]);
    }

    #[test]
    fn test_email_should_not_be_too_long() {
        let long = format!("{}@example.com", "a".repeat(244));
        let c = UserCandidate { email: &long, ..candidate() };
        assert!(!validate_user(&c).is_empty());
    }

    #[test]
    fn test_email_accepts_valid_addresses() {
        let valid = [
            "user@example.com",
            "USER@fu.com",
            "A_US-ER@fu.bar.org",
            "first.last@fu.jp",
            "alice+bob@bar.cn",
        ];
        for address in valid {
            let c = UserCandidate { email: address, ..candidate() };
            assert!(validate_user(&c).is_empty(), "{:?} should be valid", address);
        }
    }

    #[test]
    fn test_email_rejects_invalid_addresses() {
        let invalid = [
            "user@example,org",
            "user_at_fu.org",
            "user.name@example.",
            "fu@bar_baz.com",
            "fu@bar+baz.com",
            "fu@bar..com",
            "jösé@example.com",
            "user@exämple.com",
            "user@example.\u{212A}om",
        ];
        for address in invalid {
            let c = UserCandidate { email: address, ..candidate() };
            assert!(!validate_user(&c).is_empty(), "{} should be invalid", address);
        }
    }

    #[test]
    fn test_password_should_be_present() {
        let blank = " ".repeat(6);
        let c = UserCandidate {
            password: Some(&blank),
            password_confirmation: Some(&blank),
            ..candidate()
        };
        assert_eq!(fields(&validate_user(&c)), vec!["password"]);
    }

    #[test]
    fn test_password_minimum_length() {
        let short = "a".repeat(5);
        let c = UserCandidate {
            password: Some(&short),
            password_confirmation: Some(&short),
            ..candidate()
        };
        assert_eq!(fields(&validate_user(&c)), vec!["password"]);
    }

    #[test]
    fn test_password_confirmation_mismatch() {
        let c = UserCandidate { password_confirmation: Some("fubareH"), ..candidate() };
        assert_eq!(fields(&validate_user(&c)), vec!["password_confirmation"]);
    }

    #[test]
    fn test_password_skipped_when_unchanged() {
        let c = UserCandidate { password: None, password_confirmation: None, ..candidate() };
        assert!(validate_user(&c).is_empty());
    }

    #[test]
    fn test_rules_report_in_order() {
        let c = UserCandidate {
            name: "",
            email: "",
            password: Some(""),
            password_confirmation: None,
        };
        assert_eq!(
            fields(&validate_user(&c)),
            vec!["name", "email", "password", "password"]
        );
    }

    #[test]
    fn test_micropost_rules() {
        assert!(validate_micropost("Lorem ipsum").is_empty());
        assert_eq!(validate_micropost("   ").len(), 1);
        assert_eq!(validate_micropost(&"a".repeat(141)).len(), 1);
        assert!(validate_micropost(&"a".repeat(140)).is_empty());
    }

    #[test]
    fn test_save_outcome_accessors() {
        let saved: SaveOutcome<i32> = SaveOutcome::Saved(1);
        assert!(saved.is_saved());
        assert!(saved.violations().is_empty());
        assert_eq!(saved.saved(), Some(1));

        let invalid: SaveOutcome<i32> = SaveOutcome::Invalid(vec![Violation::new("name", "can't be blank")]);
        assert!(!invalid.is_saved());
        assert_eq!(invalid.violations()[0].to_string(), "name can't be blank");
        assert_eq!(invalid.saved(), None);
    }
}
