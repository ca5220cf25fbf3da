pub mod health;
pub use self::health::health;

pub mod contact;
pub mod content;
pub mod projects;

// common functions for the handlers
use regex::Regex;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Trim a field, treating blank input as missing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
