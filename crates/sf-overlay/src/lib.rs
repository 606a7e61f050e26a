//! # SceneForge Overlay
//!
//! Visual overlay subsystems used by scene transitions: a full-screen
//! fade veil and a loading indicator. Both live in dedicated overlay
//! content units that are provisioned lazily on first use rather than
//! at application startup.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   Transition Flow                        │
//! └────────────┬───────────────────────────┬────────────────┘
//!              ▼                           ▼
//! ┌────────────────────────┐  ┌────────────────────────────┐
//! │     FadeSubsystem      │  │  LoadingOverlaySubsystem   │
//! │  ensure → drive curve  │  │  ensure → show / hide      │
//! └──────┬─────────┬───────┘  └──────┬─────────┬───────────┘
//!        ▼         ▼                 ▼         ▼
//! ┌────────────┐ ┌─────────────────────┐ ┌────────────────┐
//! │ SceneProv. │ │   OverlayLocator    │ │ LoadingIndic.  │
//! │ load/poll  │ │ find surface/indic. │ │ show / hide    │
//! └────────────┘ └─────────────────────┘ └────────────────┘
//! ```
//!
//! ## Failure model
//!
//! Provisioning failures are terminal per subsystem instance: once a
//! subsystem concludes its overlay cannot be made available it never
//! retries. Under a strict [`FailurePolicy`](sf_core::FailurePolicy)
//! the fade subsystem re-raises the remembered failure on every call;
//! under a degraded policy it reports the condition exactly once and
//! becomes a permanent no-op. The loading indicator is cosmetic and
//! never blocks a transition regardless of policy.

pub mod fade;
pub mod loading;
pub mod surface;

pub use fade::{FadeSubsystem, ProvisionPhase, DEFAULT_FADE_UNIT};
pub use loading::{LoadingOverlaySubsystem, DEFAULT_LOADING_UNIT};
pub use surface::{
    CountingIndicator, FadeSurface, LoadingIndicator, MemoryOverlayHost, OverlayLocator,
    OverlayPhase, SharedFadeSurface,
};

use thiserror::Error;

/// Errors raised by overlay subsystems.
#[derive(Debug, Clone, Error)]
pub enum OverlayError {
    /// A required overlay dependency could not be provisioned. Raised
    /// by strict-policy subsystems; degraded-policy subsystems report
    /// and downgrade to no-ops instead.
    #[error("overlay feature '{feature}' unavailable: {reason}")]
    DependencyUnavailable {
        /// Which overlay feature failed ("fade" or "loading_overlay").
        feature: &'static str,
        /// Human-readable description of the first failure observed.
        reason: String,
    },
}

/// Result alias for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;
