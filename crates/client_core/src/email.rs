use std::sync::LazyLock;

use regex::Regex;

use crate::error::EmailError;

pub const MAX_EMAILS: usize = 5;

const WIRE_SEPARATOR: &str = ", ";

const EMAIL_PATTERN_SOURCE: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN_SOURCE).expect("email pattern is a valid regex"));

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

/// Notification addresses in entry order. Holds at most [`MAX_EMAILS`] distinct, well-formed entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailList {
    entries: Vec<String>,
}

impl EmailList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the comma-joined wire form. Blank segments are dropped; entries are not re-validated.
    pub fn from_wire(raw: &str) -> Self {
        let mut list = Self::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !list.contains(entry) {
                list.entries.push(entry.to_string());
            }
        }
        list
    }

    pub fn to_wire(&self) -> String {
        self.entries.join(WIRE_SEPARATOR)
    }

    pub fn push(&mut self, candidate: &str) -> Result<(), EmailError> {
        if self.is_full() {
            return Err(EmailError::LimitReached);
        }
        if !is_valid_email(candidate) {
            return Err(EmailError::InvalidFormat);
        }
        if self.contains(candidate) {
            return Err(EmailError::Duplicate);
        }
        self.entries.push(candidate.to_string());
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, target: &str) -> bool {
        match self.entries.iter().position(|entry| entry == target) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.entries.iter().any(|entry| entry == candidate)
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_EMAILS
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "tests/email_tests.rs"]
mod tests;
