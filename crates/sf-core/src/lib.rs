//! # sf-core — SceneForge Core Types
//!
//! Leaf types shared by every SceneForge crate:
//! - Correlation signatures threading one transition/swap attempt through logs and events
//! - Strict/degraded failure policy selection
//! - Easing curves and fade configuration
//! - The cooperative tick scheduler contract (suspend, resume next tick, never block)
//! - Degraded-mode reporting sink
//! - The `SceneProvider` host contract plus an in-memory reference provider
//!
//! ## Architecture
//!
//! SceneForge never talks to a concrete engine. Hosts implement
//! [`SceneProvider`] (scene units), [`TickSource`] (scheduling) and
//! [`DegradeReporter`] (observability); everything above composes against
//! those contracts.

pub mod curve;
pub mod fade;
pub mod policy;
pub mod provider;
pub mod report;
pub mod signature;
pub mod tick;

// Re-exports
pub use curve::EasingCurve;
pub use fade::FadeConfig;
pub use policy::FailurePolicy;
pub use provider::{MemorySceneProvider, SceneProvider, UnitAck, UnloadHook};
pub use report::{DegradeReport, DegradeReporter, LogReporter, RecordingReporter};
pub use signature::Signature;
pub use tick::{ManualTicker, RuntimeTicker, TickSource};
