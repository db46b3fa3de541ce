//! Stable identifiers for todo records
//!
//! ID Format: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//!
//! Hash is derived from text + creation timestamp, so adding the same text
//! twice produces two different IDs. Records persisted before IDs existed
//! get a legacy ID derived from their text and list position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid todo ID format: expected 't-{{7-char-hash}}', got '{0}'")]
    InvalidTodoId(String),
}

/// Generates a 7-character hash from arbitrary seed text
fn generate_hash(seed: &str) -> String {
    let hash = blake3::hash(seed.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Todo ID in the format `t-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoId {
    hash: String,
}

impl TodoId {
    /// Creates a new ID from text and creation timestamp
    pub fn new(text: &str, timestamp: DateTime<Utc>) -> Self {
        let seed = format!("{}{}", text, timestamp.timestamp_nanos_opt().unwrap_or(0));
        Self {
            hash: generate_hash(&seed),
        }
    }

    /// Creates the ID assigned to a stored record that has none
    pub fn legacy(text: &str, position: usize, attempt: u32) -> Self {
        let seed = format!("legacy:{}:{}:{}", position, attempt, text);
        Self {
            hash: generate_hash(&seed),
        }
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.hash)
    }
}

impl FromStr for TodoId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTodoId(s.to_string()))?;

        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTodoId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
        })
    }
}

impl TryFrom<String> for TodoId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TodoId> for String {
    fn from(id: TodoId) -> Self {
        id.to_string()
    }
}
