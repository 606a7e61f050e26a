//! # Transition Orchestrator
//!
//! Owns the single-flight transition sequence. At most one transition
//! exists at any time: the in-flight claim is a compare-exchange on an
//! atomic flag, a concurrent request is rejected synchronously and
//! never queued or merged. The flag is released by a drop guard, so
//! every exit path (success, failure, panic unwind) clears it.
//!
//! Failure handling follows the failure policy:
//! - **strict** — the first failing step escalates as an error;
//! - **degraded** — the sequence still terminates at the failing step
//!   but the outcome is returned inside the report instead of raised.
//!
//! Either way the failure is logged with its full context (signature,
//! step, scene lists) before the flag is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sf_catalog::{RouteCatalog, StyleCatalog};
use sf_core::{FailurePolicy, SceneProvider, Signature, TickSource};
use sf_overlay::{FadeSubsystem, LoadingOverlaySubsystem, OverlayPhase};

use crate::events::FlowEvents;
use crate::gate::{CompletionGate, NoopGate};
use crate::request::{TransitionContext, TransitionRequest};
use crate::trace::{TransitionReport, TransitionStep};
use crate::{TransitionError, TransitionResult};

/// Record of the attempt currently in flight, for correlating late
/// readiness signals.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransition {
    pub signature: Signature,
    pub style: String,
    /// Ticker timestamp at which the attempt started
    pub started_at_ms: u64,
}

/// Clears a single-flight flag when dropped.
pub(crate) struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    /// Claim the flag; `None` if something else holds it.
    pub(crate) fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Single-flight executor of the transition sequence.
pub struct TransitionOrchestrator {
    provider: Arc<dyn SceneProvider>,
    fade: Arc<FadeSubsystem>,
    loading: Arc<LoadingOverlaySubsystem>,
    ticker: Arc<dyn TickSource>,
    events: FlowEvents,
    gate: Arc<dyn CompletionGate>,
    policy: FailurePolicy,
    routes: RouteCatalog,
    styles: StyleCatalog,
    in_flight: AtomicBool,
    pending: Mutex<Option<PendingTransition>>,
}

/// Builder for [`TransitionOrchestrator`]. Catalogs default to the
/// builtins, the gate to [`NoopGate`], the policy to the build default.
pub struct OrchestratorBuilder {
    provider: Arc<dyn SceneProvider>,
    fade: Arc<FadeSubsystem>,
    loading: Arc<LoadingOverlaySubsystem>,
    ticker: Arc<dyn TickSource>,
    events: FlowEvents,
    gate: Arc<dyn CompletionGate>,
    policy: FailurePolicy,
    routes: RouteCatalog,
    styles: StyleCatalog,
}

impl OrchestratorBuilder {
    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn gate(mut self, gate: Arc<dyn CompletionGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn routes(mut self, routes: RouteCatalog) -> Self {
        self.routes = routes;
        self
    }

    pub fn styles(mut self, styles: StyleCatalog) -> Self {
        self.styles = styles;
        self
    }

    pub fn build(self) -> TransitionOrchestrator {
        TransitionOrchestrator {
            provider: self.provider,
            fade: self.fade,
            loading: self.loading,
            ticker: self.ticker,
            events: self.events,
            gate: self.gate,
            policy: self.policy,
            routes: self.routes,
            styles: self.styles,
            in_flight: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }
}

impl TransitionOrchestrator {
    pub fn builder(
        provider: Arc<dyn SceneProvider>,
        fade: Arc<FadeSubsystem>,
        loading: Arc<LoadingOverlaySubsystem>,
        ticker: Arc<dyn TickSource>,
        events: FlowEvents,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            provider,
            fade,
            loading,
            ticker,
            events,
            gate: Arc::new(NoopGate),
            policy: FailurePolicy::for_build(),
            routes: RouteCatalog::with_builtins(),
            styles: StyleCatalog::with_builtins(),
        }
    }

    /// Lifecycle event channels
    pub fn events(&self) -> &FlowEvents {
        &self.events
    }

    pub fn routes(&self) -> &RouteCatalog {
        &self.routes
    }

    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Whether a transition is currently in flight
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The attempt currently in flight, if any
    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending.lock().clone()
    }

    /// Resolve a route/style pair into an executable request.
    pub fn build_route_request(
        &self,
        route_id: &str,
        style_id: &str,
        requested_by: &str,
    ) -> TransitionResult<TransitionRequest> {
        let route = self
            .routes
            .try_get(route_id)
            .ok_or_else(|| TransitionError::RouteNotFound(route_id.to_string()))?;
        let style = self
            .styles
            .try_get(style_id)
            .ok_or_else(|| TransitionError::StyleNotFound(style_id.to_string()))?;

        Ok(TransitionRequest::builder()
            .load(route.load.iter().cloned())
            .unload(route.unload.iter().cloned())
            .activate(&route.active)
            .style(&style.id)
            .use_fade(style.use_fade)
            .requested_by(requested_by)
            .build())
    }

    /// Resolve and execute a catalog route in one call.
    pub async fn run_route(
        &self,
        route_id: &str,
        style_id: &str,
        requested_by: &str,
    ) -> TransitionResult<TransitionReport> {
        let request = self.build_route_request(route_id, style_id, requested_by)?;
        self.execute(request).await
    }

    /// Execute one transition request.
    ///
    /// Rejects synchronously with [`TransitionError::AlreadyInFlight`]
    /// when another transition holds the in-flight claim. On failure a
    /// strict policy returns the error; a degraded policy returns the
    /// report with the failure recorded as its last step.
    pub async fn execute(&self, request: TransitionRequest) -> TransitionResult<TransitionReport> {
        let Some(_flight) = FlightGuard::claim(&self.in_flight) else {
            log::warn!(
                "[transition] rejected request from '{}': another transition is in flight",
                request.requested_by()
            );
            return Err(TransitionError::AlreadyInFlight {
                requested_by: request.requested_by().to_string(),
            });
        };

        let ctx = TransitionContext::from_request(&request);
        let started_at = self.ticker.now_ms();
        *self.pending.lock() = Some(PendingTransition {
            signature: ctx.signature.clone(),
            style: ctx.style.clone(),
            started_at_ms: started_at,
        });

        let mut report = TransitionReport::new(ctx.signature.clone(), ctx.style.clone());
        let outcome = self
            .run_sequence(&request, &ctx, started_at, &mut report)
            .await;

        *self.pending.lock() = None;

        match outcome {
            Ok(()) => Ok(report),
            Err(err) => {
                let at_ms = self.elapsed_since(started_at);
                log::error!(
                    "[transition] failed after {at_ms}ms: {err} (signature={}, style='{}', load={:?}, unload={:?}, active='{}')",
                    ctx.signature,
                    ctx.style,
                    ctx.scenes_to_load,
                    ctx.scenes_to_unload,
                    ctx.target_active_scene
                );
                report.record(TransitionStep::Failed, at_ms, err.to_string());
                if self.policy.is_strict() {
                    Err(err)
                } else {
                    Ok(report)
                }
            }
        }
    }

    async fn run_sequence(
        &self,
        request: &TransitionRequest,
        ctx: &TransitionContext,
        started_at: u64,
        report: &mut TransitionReport,
    ) -> TransitionResult<()> {
        let sig = &ctx.signature;

        log::info!(
            "[transition] '{}' requested by '{}': load={:?} unload={:?} active='{}' fade={} (signature={sig})",
            ctx.style,
            ctx.requested_by,
            ctx.scenes_to_load,
            ctx.scenes_to_unload,
            ctx.target_active_scene,
            request.use_fade()
        );
        self.events.started.emit(ctx.clone());
        report.record(TransitionStep::Started, self.elapsed_since(started_at), "");

        self.fade.set_active_profile(&ctx.style);
        self.loading.set_active_profile(&ctx.style);

        // Fade profile resolution happens inside the in-flight claim.
        // Style labels unknown to the catalog keep whatever profile
        // was configured directly.
        if let Some(style) = self.styles.try_get(&ctx.style) {
            self.fade.configure(style.fade);
        }

        self.loading.ensure_ready(sig).await?;
        report.record(
            TransitionStep::OverlayEnsured,
            self.elapsed_since(started_at),
            "",
        );

        if request.use_fade() {
            self.fade.fade_out(sig).await?;
            report.record(
                TransitionStep::FadeOutDone,
                self.elapsed_since(started_at),
                "",
            );
        }

        self.loading.show(sig, OverlayPhase::Loading).await;
        report.record(
            TransitionStep::IndicatorShown,
            self.elapsed_since(started_at),
            "",
        );

        // Unloads: a unit that is not loaded is skipped; a refused
        // unload is logged and tolerated.
        let mut unloaded = 0usize;
        for unit in &ctx.scenes_to_unload {
            if !self.provider.is_unit_loaded(unit) {
                log::debug!("[transition] '{unit}' not loaded, skipping unload (signature={sig})");
                continue;
            }
            match self.provider.unload_unit(unit) {
                Some(ack) => {
                    ack.await;
                    unloaded += 1;
                }
                None => log::warn!(
                    "[transition] unload of '{unit}' refused, continuing (signature={sig})"
                ),
            }
        }
        report.record(
            TransitionStep::UnloadsDone,
            self.elapsed_since(started_at),
            format!("{unloaded} unloaded"),
        );

        // Loads: every unit must come up.
        let mut loaded = 0usize;
        for unit in &ctx.scenes_to_load {
            if self.provider.is_unit_loaded(unit) {
                log::debug!("[transition] '{unit}' already loaded (signature={sig})");
                continue;
            }
            if !self.provider.is_unit_registered(unit) {
                return Err(TransitionError::UnitNotLoadable {
                    unit: unit.clone(),
                    reason: "not declared loadable".to_string(),
                });
            }
            let Some(ack) = self.provider.load_unit(unit) else {
                return Err(TransitionError::UnitNotLoadable {
                    unit: unit.clone(),
                    reason: "load request refused".to_string(),
                });
            };
            ack.await;
            if !self.provider.is_unit_loaded(unit) {
                return Err(TransitionError::UnitNotLoadable {
                    unit: unit.clone(),
                    reason: "load did not complete".to_string(),
                });
            }
            loaded += 1;
        }
        report.record(
            TransitionStep::LoadsDone,
            self.elapsed_since(started_at),
            format!("{loaded} loaded"),
        );

        // Activation: an empty target keeps the current active unit.
        if ctx.target_active_scene.is_empty() {
            log::debug!(
                "[transition] keeping active unit '{}' (signature={sig})",
                self.provider.active_unit_name()
            );
        } else {
            if !self.provider.is_unit_loaded(&ctx.target_active_scene) {
                return Err(TransitionError::ActivationFailed {
                    unit: ctx.target_active_scene.clone(),
                    reason: "unit is not loaded".to_string(),
                });
            }
            if !self.provider.try_set_active_unit(&ctx.target_active_scene) {
                return Err(TransitionError::ActivationFailed {
                    unit: ctx.target_active_scene.clone(),
                    reason: "host rejected the change".to_string(),
                });
            }
            report.record(
                TransitionStep::Activated,
                self.elapsed_since(started_at),
                ctx.target_active_scene.clone(),
            );
        }

        self.events.scenes_ready.emit(ctx.clone());
        report.record(
            TransitionStep::ScenesReady,
            self.elapsed_since(started_at),
            "",
        );
        log::info!(
            "[transition] scenes ready, active='{}' (signature={sig})",
            self.provider.active_unit_name()
        );

        self.gate.before_reveal(ctx).await;
        report.record(
            TransitionStep::GateReleased,
            self.elapsed_since(started_at),
            "",
        );

        self.loading.hide(sig, OverlayPhase::Reveal).await;
        report.record(
            TransitionStep::IndicatorHidden,
            self.elapsed_since(started_at),
            "",
        );

        if request.use_fade() {
            self.fade.fade_in(sig).await?;
            report.record(
                TransitionStep::FadeInDone,
                self.elapsed_since(started_at),
                "",
            );
        }

        self.events.completed.emit(ctx.clone());
        report.record(
            TransitionStep::Completed,
            self.elapsed_since(started_at),
            "",
        );
        log::info!(
            "[transition] completed in {}ms (signature={sig})",
            self.elapsed_since(started_at)
        );

        Ok(())
    }

    fn elapsed_since(&self, started_at: u64) -> u64 {
        self.ticker.now_ms().saturating_sub(started_at)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use sf_core::{ManualTicker, MemorySceneProvider, RecordingReporter};
    use sf_overlay::{MemoryOverlayHost, DEFAULT_FADE_UNIT, DEFAULT_LOADING_UNIT};

    use super::*;
    use crate::events::EventTeardown;

    fn orchestrator(policy: FailurePolicy) -> (TransitionOrchestrator, Arc<MemorySceneProvider>) {
        let provider = Arc::new(MemorySceneProvider::new());
        provider.register_units([
            DEFAULT_FADE_UNIT,
            DEFAULT_LOADING_UNIT,
            "FrontendScene",
            "GameplayScene",
            "UIGlobalScene",
        ]);

        let host = Arc::new(MemoryOverlayHost::new());
        host.put_fade_surface(
            DEFAULT_FADE_UNIT,
            Arc::new(sf_overlay::SharedFadeSurface::default()) as _,
        );
        host.put_loading_indicator(
            DEFAULT_LOADING_UNIT,
            Arc::new(sf_overlay::CountingIndicator::new()) as _,
        );

        let ticker: Arc<dyn TickSource> = Arc::new(ManualTicker::new(16));
        let reporter: Arc<dyn sf_core::DegradeReporter> = Arc::new(RecordingReporter::new());
        let fade = Arc::new(FadeSubsystem::new(
            DEFAULT_FADE_UNIT,
            Arc::clone(&provider) as _,
            Arc::clone(&host) as _,
            Arc::clone(&ticker),
            Arc::clone(&reporter),
            policy,
        ));
        let loading = Arc::new(LoadingOverlaySubsystem::new(
            DEFAULT_LOADING_UNIT,
            Arc::clone(&provider) as _,
            Arc::clone(&host) as _,
            Arc::clone(&ticker),
            reporter,
            policy,
        ));

        let teardown = EventTeardown::new();
        let events = FlowEvents::new(&teardown);

        let orchestrator = TransitionOrchestrator::builder(
            Arc::clone(&provider) as _,
            fade,
            loading,
            ticker,
            events,
        )
        .policy(policy)
        .build();

        (orchestrator, provider)
    }

    #[tokio::test]
    async fn test_unknown_route_is_rejected() {
        let (orchestrator, _) = orchestrator(FailurePolicy::Strict);
        let result = orchestrator.run_route("no_such_route", "instant", "test").await;
        assert!(matches!(result, Err(TransitionError::RouteNotFound(_))));
        assert!(!orchestrator.is_in_flight());
    }

    #[tokio::test]
    async fn test_unknown_style_is_rejected() {
        let (orchestrator, _) = orchestrator(FailurePolicy::Strict);
        let result = orchestrator.run_route("gameplay", "no_such_style", "test").await;
        assert!(matches!(result, Err(TransitionError::StyleNotFound(_))));
    }

    #[tokio::test]
    async fn test_pending_record_cleared_after_run() {
        let (orchestrator, _) = orchestrator(FailurePolicy::Strict);
        assert!(orchestrator.pending().is_none());

        let report = orchestrator
            .run_route("gameplay", "instant", "test")
            .await
            .expect("route runs");
        assert!(report.succeeded());
        assert!(orchestrator.pending().is_none());
        assert!(!orchestrator.is_in_flight());
    }

    #[tokio::test]
    async fn test_route_request_carries_style_profile() {
        let (orchestrator, _) = orchestrator(FailurePolicy::Strict);
        let request = orchestrator
            .build_route_request("gameplay", "Gameplay", "test")
            .expect("resolves");

        assert_eq!(request.style_id(), "gameplay");
        assert!(request.use_fade());
        assert_eq!(request.scenes_to_load(), ["GameplayScene", "UIGlobalScene"]);
        assert_eq!(request.target_active_scene(), "GameplayScene");
    }
}
