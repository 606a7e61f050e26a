//! Degraded-Mode Reporting
//!
//! When a secondary dependency is permanently lost under the degraded
//! policy, the owning subsystem reports the loss exactly once through this
//! sink and goes quiet.

use parking_lot::Mutex;

use crate::signature::Signature;

/// Observability sink for degraded-feature diagnostics
pub trait DegradeReporter: Send + Sync {
    /// Report one permanently disabled feature.
    ///
    /// `feature` names the subsystem, `reason` the failing step, `detail`
    /// the underlying cause, `profile` the style/profile label active when
    /// the loss was discovered.
    fn report(&self, feature: &str, reason: &str, detail: &str, signature: &Signature, profile: &str);
}

/// Default reporter: one warning through the log facade
#[derive(Debug, Default)]
pub struct LogReporter;

impl DegradeReporter for LogReporter {
    fn report(&self, feature: &str, reason: &str, detail: &str, signature: &Signature, profile: &str) {
        log::warn!(
            "[degrade] feature={} reason={} profile={} signature={} detail={}",
            feature,
            reason,
            profile,
            signature,
            detail
        );
    }
}

/// One captured degrade report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradeReport {
    pub feature: String,
    pub reason: String,
    pub detail: String,
    pub signature: Signature,
    pub profile: String,
}

/// Capturing reporter for harnesses and diagnostics panes
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: Mutex<Vec<DegradeReport>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured reports in arrival order
    pub fn reports(&self) -> Vec<DegradeReport> {
        self.entries.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Number of reports naming a feature
    pub fn count_for(&self, feature: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|r| r.feature == feature)
            .count()
    }
}

impl DegradeReporter for RecordingReporter {
    fn report(&self, feature: &str, reason: &str, detail: &str, signature: &Signature, profile: &str) {
        self.entries.lock().push(DegradeReport {
            feature: feature.to_string(),
            reason: reason.to_string(),
            detail: detail.to_string(),
            signature: signature.clone(),
            profile: profile.to_string(),
        });
    }
}
