//! # sf-transition — SceneForge Transition Core
//!
//! The orchestrated path between major content states. One transition
//! is a strictly ordered sequence over collaborators owned elsewhere:
//!
//! ```text
//! Started ─▶ overlay ensure ─▶ fade out ─▶ indicator on
//!         ─▶ unload set ─▶ load set ─▶ activate target
//!         ─▶ ScenesReady ─▶ completion gate ─▶ indicator off
//!         ─▶ fade in ─▶ Completed
//! ```
//!
//! ## Architecture
//!
//! - [`TransitionOrchestrator`] — single-flight executor of the
//!   sequence above; at most one transition exists at any time, a
//!   second request is rejected synchronously.
//! - [`EventChannel`] / [`EventTeardown`] — typed broadcast channels
//!   for flow events, each registering a clear closure so application
//!   teardown can drop stale subscribers without reflection tricks.
//! - [`CompletionGate`] — host hook between readiness and reveal.
//! - [`ContentSwapContext`] — pending/committed content plan register
//!   with atomic hand-over.
//! - [`GameLoopCoordinator`] — gates game start on the readiness
//!   signal of its own startup transition, correlated by signature.
//!
//! Everything is constructed explicitly at a composition root and
//! injected; nothing in this crate reaches for a global.

pub mod coordinator;
pub mod events;
pub mod gate;
pub mod orchestrator;
pub mod request;
pub mod swap;
pub mod trace;

pub use coordinator::{
    AuthorityClaim, GameLoopCoordinator, GameLoopHandle, GameLoopResolver, StartAuthority,
};
pub use events::{EventChannel, EventTeardown, FlowEvents};
pub use gate::{CompletionGate, GateFn, NoopGate};
pub use orchestrator::{OrchestratorBuilder, PendingTransition, TransitionOrchestrator};
pub use request::{TransitionContext, TransitionRequest, TransitionRequestBuilder};
pub use swap::{ContentSwapContext, ContentSwapPlan, SwapCommit, SwapEvents};
pub use trace::{StepRecord, TransitionReport, TransitionStep};

use sf_overlay::OverlayError;
use thiserror::Error;

/// Errors raised while driving a transition.
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    /// A transition is already in flight. The new request is rejected,
    /// never queued or merged.
    #[error("transition already in flight, rejected request from '{requested_by}'")]
    AlreadyInFlight { requested_by: String },

    /// Route id not present in the catalog.
    #[error("route '{0}' is not in the catalog")]
    RouteNotFound(String),

    /// Style id not present in the catalog.
    #[error("style '{0}' is not in the catalog")]
    StyleNotFound(String),

    /// A scene unit in the load set could not be brought up.
    #[error("scene unit '{unit}' cannot be loaded: {reason}")]
    UnitNotLoadable { unit: String, reason: String },

    /// The target active unit was loaded but activation was rejected.
    #[error("activation of scene unit '{unit}' failed: {reason}")]
    ActivationFailed { unit: String, reason: String },

    /// Game start was requested by an instance that no longer holds
    /// the start authority.
    #[error("start authority is held by '{holder}'")]
    NotAuthoritative { holder: String },

    /// A required overlay dependency failed under the strict policy.
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// Result alias for transition operations.
pub type TransitionResult<T> = Result<T, TransitionError>;
