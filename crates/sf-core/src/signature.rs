//! Correlation Signatures
//!
//! An opaque string that threads one transition or swap attempt through
//! logs, events and readiness matching. Consumers compare signatures, never
//! parse them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque correlation signature for one attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Wrap an externally supplied signature string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh unique signature
    pub fn generate() -> Self {
        Self(format!("sf-{}", Uuid::new_v4().simple()))
    }

    /// Generate a signature carrying a requester label for log readability
    pub fn generate_for(label: &str) -> Self {
        Self(format!("sf-{}-{}", label, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Signature {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Signature {
    fn from(value: String) -> Self {
        Self(value)
    }
}
