//! # Transition Report
//!
//! A report captures the full step timeline of one transition attempt:
//! which steps ran, when (milliseconds since the attempt started), and
//! the outcome. Returned by the orchestrator for diagnostics panes and
//! harness assertions.

use serde::{Deserialize, Serialize};
use sf_core::Signature;

/// Steps of the transition sequence, in nominal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStep {
    /// Request accepted, `Started` emitted
    Started,
    /// Loading overlay provisioned (or degraded quietly)
    OverlayEnsured,
    /// Screen fully obscured
    FadeOutDone,
    /// Loading indicator shown
    IndicatorShown,
    /// Unload set processed
    UnloadsDone,
    /// Load set processed
    LoadsDone,
    /// Target unit is active
    Activated,
    /// `ScenesReady` emitted
    ScenesReady,
    /// Completion gate resolved
    GateReleased,
    /// Loading indicator hidden
    IndicatorHidden,
    /// Screen fully revealed
    FadeInDone,
    /// `Completed` emitted
    Completed,
    /// Sequence terminated early
    Failed,
}

impl TransitionStep {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionStep::Started => "started",
            TransitionStep::OverlayEnsured => "overlay_ensured",
            TransitionStep::FadeOutDone => "fade_out_done",
            TransitionStep::IndicatorShown => "indicator_shown",
            TransitionStep::UnloadsDone => "unloads_done",
            TransitionStep::LoadsDone => "loads_done",
            TransitionStep::Activated => "activated",
            TransitionStep::ScenesReady => "scenes_ready",
            TransitionStep::GateReleased => "gate_released",
            TransitionStep::IndicatorHidden => "indicator_hidden",
            TransitionStep::FadeInDone => "fade_in_done",
            TransitionStep::Completed => "completed",
            TransitionStep::Failed => "failed",
        }
    }
}

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: TransitionStep,
    /// Milliseconds since the attempt started
    pub at_ms: u64,
    /// Free-form detail ("" when there is nothing to add)
    #[serde(default)]
    pub note: String,
}

/// Step timeline of one transition attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionReport {
    pub signature: Signature,
    pub style: String,
    /// Steps in execution order
    pub steps: Vec<StepRecord>,
}

impl TransitionReport {
    pub fn new(signature: Signature, style: impl Into<String>) -> Self {
        Self {
            signature,
            style: style.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step record
    pub fn record(&mut self, step: TransitionStep, at_ms: u64, note: impl Into<String>) {
        self.steps.push(StepRecord {
            step,
            at_ms,
            note: note.into(),
        });
    }

    /// Whether the sequence reached `Completed`
    pub fn succeeded(&self) -> bool {
        self.has_step(TransitionStep::Completed)
    }

    pub fn has_step(&self, step: TransitionStep) -> bool {
        self.steps.iter().any(|r| r.step == step)
    }

    /// The failure record, if the sequence terminated early
    pub fn failure(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == TransitionStep::Failed)
    }

    /// Timestamp of a step, if it was recorded
    pub fn step_at_ms(&self, step: TransitionStep) -> Option<u64> {
        self.steps.iter().find(|r| r.step == step).map(|r| r.at_ms)
    }

    /// Total duration: timestamp of the last recorded step
    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map(|r| r.at_ms).unwrap_or(0)
    }

    /// Step names in execution order, for compact assertions and logs
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|r| r.step.name()).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════
