//! Failure Policy
//!
//! SceneForge runs every secondary dependency (fade overlay, loading
//! indicator) under one of two policies:
//!
//! - **Strict** — a missing dependency fails loudly so integration bugs are
//!   visible during development.
//! - **Degraded** — the affected feature is disabled for the rest of the
//!   session after exactly one diagnostic; the session continues without the
//!   visual effect.

use serde::{Deserialize, Serialize};

/// How missing secondary dependencies are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Escalate dependency loss to the caller
    Strict,
    /// Report once, then permanently no-op the affected feature
    Degraded,
}

impl FailurePolicy {
    /// Policy matching the build profile: strict in debug builds, degraded
    /// in release builds
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Degraded
        }
    }

    #[inline]
    pub fn is_strict(self) -> bool {
        matches!(self, FailurePolicy::Strict)
    }

    pub fn name(self) -> &'static str {
        match self {
            FailurePolicy::Strict => "strict",
            FailurePolicy::Degraded => "degraded",
        }
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::for_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_matches_profile() {
        let policy = FailurePolicy::for_build();
        if cfg!(debug_assertions) {
            assert_eq!(policy, FailurePolicy::Strict);
        } else {
            assert_eq!(policy, FailurePolicy::Degraded);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FailurePolicy::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }
}
