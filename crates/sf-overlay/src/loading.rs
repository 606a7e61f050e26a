//! # Loading Overlay Subsystem
//!
//! Cosmetic loading indicator shown while scene content is swapped.
//! Shares the fade subsystem's lazy provisioning lifecycle with two
//! deliberate differences:
//!
//! - provisioning polls are bounded, never indefinite;
//! - `show`/`hide` never fail loudly. A missing indicator degrades to
//!   a logged-once no-op under either policy, because the indicator
//!   must never block a transition.
//!
//! A strict policy still gets a fail-fast path: `ensure_ready` checks
//! that the overlay unit is declared loadable before any asynchronous
//! step, so a misconfigured host aborts the transition before time is
//! spent on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use sf_core::{DegradeReporter, FailurePolicy, SceneProvider, Signature, TickSource};

use crate::fade::ProvisionPhase;
use crate::surface::{LoadingIndicator, OverlayLocator, OverlayPhase};
use crate::{OverlayError, OverlayResult};

/// Conventional name of the content unit hosting the loading indicator
pub const DEFAULT_LOADING_UNIT: &str = "LoadingOverlayScene";

/// Default bound on provisioning polls (~10s at a 16 ms tick)
const DEFAULT_POLL_BUDGET: u32 = 600;

enum IndicatorState {
    Uninitialized,
    Ready {
        indicator: Arc<dyn LoadingIndicator>,
        valid: Arc<AtomicBool>,
    },
    Unavailable {
        reason: String,
    },
}

/// Lazily provisioned loading indicator driver.
pub struct LoadingOverlaySubsystem {
    unit: String,
    provider: Arc<dyn SceneProvider>,
    locator: Arc<dyn OverlayLocator>,
    ticker: Arc<dyn TickSource>,
    reporter: Arc<dyn DegradeReporter>,
    policy: FailurePolicy,
    profile: RwLock<String>,
    state: tokio::sync::Mutex<IndicatorState>,
    reported: AtomicBool,
    miss_logged: AtomicBool,
    poll_budget: u32,
}

impl LoadingOverlaySubsystem {
    pub fn new(
        unit: impl Into<String>,
        provider: Arc<dyn SceneProvider>,
        locator: Arc<dyn OverlayLocator>,
        ticker: Arc<dyn TickSource>,
        reporter: Arc<dyn DegradeReporter>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            unit: unit.into(),
            provider,
            locator,
            ticker,
            reporter,
            policy,
            profile: RwLock::new(String::from("default")),
            state: tokio::sync::Mutex::new(IndicatorState::Uninitialized),
            reported: AtomicBool::new(false),
            miss_logged: AtomicBool::new(false),
            poll_budget: DEFAULT_POLL_BUDGET,
        }
    }

    /// Override the provisioning poll bound
    pub fn with_poll_budget(mut self, polls: u32) -> Self {
        self.poll_budget = polls;
        self
    }

    /// Record which style profile is driving upcoming show/hide
    /// cycles. Only used to label degrade reports.
    pub fn set_active_profile(&self, label: &str) {
        *self.profile.write() = label.to_string();
    }

    /// Current provisioning phase
    pub fn phase(&self) -> ProvisionPhase {
        match self.state.try_lock() {
            Err(_) => ProvisionPhase::Provisioning,
            Ok(guard) => match &*guard {
                IndicatorState::Uninitialized => ProvisionPhase::Uninitialized,
                IndicatorState::Ready { valid, .. } => {
                    if valid.load(Ordering::Acquire) {
                        ProvisionPhase::Ready
                    } else {
                        ProvisionPhase::Uninitialized
                    }
                }
                IndicatorState::Unavailable { .. } => ProvisionPhase::Unavailable,
            },
        }
    }

    /// Provision the indicator ahead of a transition.
    ///
    /// Under a strict policy an unit that is not even declared
    /// loadable fails here, synchronously, before any time is spent;
    /// any later provisioning failure is raised as well. Under a
    /// degraded policy every failure is reported once and `Ok(())`
    /// is returned.
    pub async fn ensure_ready(&self, signature: &Signature) -> OverlayResult<()> {
        if self.policy.is_strict() && !self.provider.is_unit_registered(&self.unit) {
            return Err(OverlayError::DependencyUnavailable {
                feature: "loading_overlay",
                reason: format!("unit '{}' is not declared loadable", self.unit),
            });
        }
        self.ensure_indicator(signature).await.map(|_| ())
    }

    /// Show the indicator. Never fails loudly.
    pub async fn show(&self, signature: &Signature, phase: OverlayPhase) {
        match self.ensure_indicator(signature).await {
            Ok(Some(indicator)) => indicator.show(phase),
            Ok(None) => {}
            Err(err) => self.note_missing(&err),
        }
    }

    /// Hide the indicator. Never fails loudly.
    pub async fn hide(&self, signature: &Signature, phase: OverlayPhase) {
        match self.ensure_indicator(signature).await {
            Ok(Some(indicator)) => indicator.hide(phase),
            Ok(None) => {}
            Err(err) => self.note_missing(&err),
        }
    }

    fn note_missing(&self, err: &OverlayError) {
        if !self.miss_logged.swap(true, Ordering::AcqRel) {
            log::warn!("[loading] continuing without indicator: {err}");
        }
    }

    /// Resolve a usable indicator, provisioning on first use. Same
    /// lock discipline as the fade subsystem: concurrent callers park
    /// on the state lock and observe the outcome on entry.
    async fn ensure_indicator(
        &self,
        signature: &Signature,
    ) -> OverlayResult<Option<Arc<dyn LoadingIndicator>>> {
        let mut state = self.state.lock().await;

        if let IndicatorState::Ready { indicator, valid } = &*state {
            if valid.load(Ordering::Acquire) {
                return Ok(Some(Arc::clone(indicator)));
            }
            log::info!(
                "[loading] unit '{}' was unloaded, reprovisioning (signature={signature})",
                self.unit
            );
            *state = IndicatorState::Uninitialized;
        }

        if let IndicatorState::Unavailable { reason } = &*state {
            let reason = reason.clone();
            drop(state);
            return self.unavailable(signature, "ensure", reason);
        }

        match self.provision(signature).await {
            Ok((indicator, valid)) => {
                let out = Arc::clone(&indicator);
                *state = IndicatorState::Ready { indicator, valid };
                Ok(Some(out))
            }
            Err(reason) => {
                *state = IndicatorState::Unavailable {
                    reason: reason.clone(),
                };
                drop(state);
                self.unavailable(signature, "provision", reason)
            }
        }
    }

    /// One provisioning attempt with a bounded completion poll.
    async fn provision(
        &self,
        signature: &Signature,
    ) -> Result<(Arc<dyn LoadingIndicator>, Arc<AtomicBool>), String> {
        log::info!(
            "[loading] provisioning unit '{}' (signature={signature})",
            self.unit
        );

        if !self.provider.is_unit_loaded(&self.unit) {
            let Some(_ack) = self.provider.load_unit(&self.unit) else {
                return Err(format!("load request for unit '{}' was refused", self.unit));
            };
            let mut polls = 0u32;
            while !self.provider.is_unit_loaded(&self.unit) {
                if polls >= self.poll_budget {
                    return Err(format!(
                        "unit '{}' did not finish loading within {} polls",
                        self.unit, self.poll_budget
                    ));
                }
                self.ticker.yield_tick().await;
                polls += 1;
            }
        }

        let Some(indicator) = self.locator.find_loading_indicator(&self.unit) else {
            return Err(format!(
                "unit '{}' contains no loading indicator",
                self.unit
            ));
        };

        let valid = Arc::new(AtomicBool::new(true));
        let token = Arc::clone(&valid);
        self.provider.register_unload_hook(
            &self.unit,
            Box::new(move || {
                token.store(false, Ordering::Release);
            }),
        );

        log::info!(
            "[loading] unit '{}' ready (signature={signature})",
            self.unit
        );
        Ok((indicator, valid))
    }

    fn unavailable(
        &self,
        signature: &Signature,
        reason: &str,
        detail: String,
    ) -> OverlayResult<Option<Arc<dyn LoadingIndicator>>> {
        if self.policy.is_strict() {
            return Err(OverlayError::DependencyUnavailable {
                feature: "loading_overlay",
                reason: detail,
            });
        }
        if !self.reported.swap(true, Ordering::AcqRel) {
            self.reporter.report(
                "loading_overlay",
                reason,
                &detail,
                signature,
                &self.profile.read(),
            );
        }
        Ok(None)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use sf_core::{ManualTicker, MemorySceneProvider, RecordingReporter};

    use super::*;
    use crate::surface::{CountingIndicator, MemoryOverlayHost};

    struct Fixture {
        provider: Arc<MemorySceneProvider>,
        host: Arc<MemoryOverlayHost>,
        reporter: Arc<RecordingReporter>,
        indicator: Arc<CountingIndicator>,
    }

    impl Fixture {
        fn new() -> Self {
            let provider = Arc::new(MemorySceneProvider::new());
            provider.register_units([DEFAULT_LOADING_UNIT]);

            let host = Arc::new(MemoryOverlayHost::new());
            let indicator = Arc::new(CountingIndicator::new());
            host.put_loading_indicator(DEFAULT_LOADING_UNIT, Arc::clone(&indicator) as _);

            Self {
                provider,
                host,
                reporter: Arc::new(RecordingReporter::new()),
                indicator,
            }
        }

        fn subsystem(&self, policy: FailurePolicy) -> LoadingOverlaySubsystem {
            LoadingOverlaySubsystem::new(
                DEFAULT_LOADING_UNIT,
                Arc::clone(&self.provider) as _,
                Arc::clone(&self.host) as _,
                Arc::new(ManualTicker::new(16)) as _,
                Arc::clone(&self.reporter) as _,
                policy,
            )
        }
    }

    #[tokio::test]
    async fn test_ensure_then_show_hide() {
        let fx = Fixture::new();
        let loading = fx.subsystem(FailurePolicy::Strict);

        let sig = Signature::new("sf-test");
        loading.ensure_ready(&sig).await.expect("ensure");
        assert_eq!(loading.phase(), ProvisionPhase::Ready);

        loading.show(&sig, OverlayPhase::Loading).await;
        assert!(fx.indicator.is_visible());
        loading.hide(&sig, OverlayPhase::Reveal).await;
        assert!(!fx.indicator.is_visible());

        assert_eq!(
            fx.provider.operations(),
            vec![format!("load:{DEFAULT_LOADING_UNIT}")],
            "show/hide reuse the provisioned indicator"
        );
    }

    #[tokio::test]
    async fn test_strict_precheck_fails_before_any_async_step() {
        let provider = Arc::new(MemorySceneProvider::new());
        let host = Arc::new(MemoryOverlayHost::new());
        let loading = LoadingOverlaySubsystem::new(
            DEFAULT_LOADING_UNIT,
            Arc::clone(&provider) as _,
            host as _,
            Arc::new(ManualTicker::new(16)) as _,
            Arc::new(RecordingReporter::new()) as _,
            FailurePolicy::Strict,
        );

        let result = loading.ensure_ready(&Signature::new("sf-test")).await;
        assert!(matches!(
            result,
            Err(OverlayError::DependencyUnavailable {
                feature: "loading_overlay",
                ..
            })
        ));
        assert!(
            provider.operations().is_empty(),
            "pre-check must reject before requesting a load"
        );
        assert_eq!(
            loading.phase(),
            ProvisionPhase::Uninitialized,
            "pre-check failure is not a provisioning attempt"
        );
    }

    #[tokio::test]
    async fn test_degraded_missing_unit_reports_once() {
        let provider = Arc::new(MemorySceneProvider::new());
        let host = Arc::new(MemoryOverlayHost::new());
        let reporter = Arc::new(RecordingReporter::new());
        let loading = LoadingOverlaySubsystem::new(
            DEFAULT_LOADING_UNIT,
            provider as _,
            host as _,
            Arc::new(ManualTicker::new(16)) as _,
            Arc::clone(&reporter) as _,
            FailurePolicy::Degraded,
        );
        loading.set_active_profile("gameplay");

        let sig = Signature::new("sf-test");
        loading.ensure_ready(&sig).await.expect("degraded ensure");
        loading.show(&sig, OverlayPhase::Loading).await;
        loading.hide(&sig, OverlayPhase::Reveal).await;

        assert_eq!(reporter.count_for("loading_overlay"), 1);
        assert_eq!(reporter.reports()[0].profile, "gameplay");
        assert_eq!(loading.phase(), ProvisionPhase::Unavailable);
    }

    #[tokio::test]
    async fn test_bounded_polling_gives_up_on_stalled_load() {
        let fx = Fixture::new();
        fx.provider.stall_loads_of(DEFAULT_LOADING_UNIT);
        let loading = fx.subsystem(FailurePolicy::Degraded).with_poll_budget(4);

        loading
            .ensure_ready(&Signature::new("sf-test"))
            .await
            .expect("degraded ensure");

        assert_eq!(loading.phase(), ProvisionPhase::Unavailable);
        assert_eq!(fx.reporter.count(), 1);
        assert!(
            fx.reporter.reports()[0].detail.contains("4 polls"),
            "detail should name the exhausted budget"
        );
    }

    #[tokio::test]
    async fn test_show_never_fails_loudly_under_strict() {
        let fx = Fixture::new();
        fx.provider.refuse_loads_of(DEFAULT_LOADING_UNIT);
        let loading = fx.subsystem(FailurePolicy::Strict);

        let sig = Signature::new("sf-test");
        assert!(loading.ensure_ready(&sig).await.is_err());

        // Show and hide swallow the remembered failure.
        loading.show(&sig, OverlayPhase::Loading).await;
        loading.hide(&sig, OverlayPhase::Reveal).await;
        assert_eq!(fx.indicator.show_count(), 0);
        assert_eq!(
            fx.reporter.count(),
            0,
            "strict failures do not use the degrade reporter"
        );
    }

    #[tokio::test]
    async fn test_locator_miss_is_terminal() {
        let fx = Fixture::new();
        fx.host.clear_unit(DEFAULT_LOADING_UNIT);
        let loading = fx.subsystem(FailurePolicy::Degraded);

        let sig = Signature::new("sf-test");
        loading.show(&sig, OverlayPhase::Loading).await;
        loading.show(&sig, OverlayPhase::Loading).await;

        assert_eq!(fx.reporter.count(), 1, "exactly one report for the miss");
        assert_eq!(
            fx.provider.operations(),
            vec![format!("load:{DEFAULT_LOADING_UNIT}")],
            "no reprovisioning after the terminal miss"
        );
    }

    #[tokio::test]
    async fn test_unload_hook_triggers_reprovision() {
        let fx = Fixture::new();
        let loading = fx.subsystem(FailurePolicy::Strict);

        let sig = Signature::new("sf-test");
        loading.ensure_ready(&sig).await.expect("first ensure");

        fx.provider
            .unload_unit(DEFAULT_LOADING_UNIT)
            .expect("unload accepted")
            .await;
        assert_eq!(loading.phase(), ProvisionPhase::Uninitialized);

        loading.show(&sig, OverlayPhase::Loading).await;
        assert_eq!(fx.indicator.show_count(), 1, "show reprovisions and lands");
        assert_eq!(loading.phase(), ProvisionPhase::Ready);
    }
}
