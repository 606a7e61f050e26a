//! # Fade Subsystem
//!
//! Drives the full-screen obscuring veil used around scene swaps. The
//! veil lives in its own overlay content unit and is provisioned
//! lazily: nothing is loaded until the first fade with a non-zero
//! duration actually needs a surface.
//!
//! ## Provisioning lifecycle
//!
//! ```text
//! Uninitialized ──ensure──▶ Provisioning ──ok──▶ Ready
//!                                │                  │
//!                             failure          unit unloaded
//!                                ▼                  ▼
//!                           Unavailable        Uninitialized
//!                            (terminal)       (reprovisions)
//! ```
//!
//! `Unavailable` is terminal for the subsystem instance. A strict
//! policy re-raises the remembered failure on every subsequent fade;
//! a degraded policy reports once through the [`DegradeReporter`] and
//! then swallows every fade as a no-op.
//!
//! The `Ready` state carries a validity token tied to the overlay
//! unit through an unload hook. When the host unloads the unit the
//! token flips and the next fade provisions from scratch instead of
//! driving a dead surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use sf_core::{
    DegradeReporter, EasingCurve, FadeConfig, FailurePolicy, SceneProvider, Signature, TickSource,
};

use crate::surface::{FadeSurface, OverlayLocator};
use crate::{OverlayError, OverlayResult};

/// Conventional name of the content unit hosting the fade veil
pub const DEFAULT_FADE_UNIT: &str = "FadeOverlayScene";

/// Observable provisioning phase, for diagnostics and harnesses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPhase {
    /// No provisioning attempted yet
    Uninitialized,
    /// A provisioning attempt is in flight
    Provisioning,
    /// Surface located and valid
    Ready,
    /// Provisioning failed; the subsystem will not retry
    Unavailable,
}

enum ProvisionState {
    Uninitialized,
    Ready {
        surface: Arc<dyn FadeSurface>,
        valid: Arc<AtomicBool>,
    },
    Unavailable {
        reason: String,
    },
}

/// Lazily provisioned fade veil driver.
///
/// All methods take `&self`; the subsystem is shared behind an `Arc`
/// by the transition flow and the host.
pub struct FadeSubsystem {
    unit: String,
    provider: Arc<dyn SceneProvider>,
    locator: Arc<dyn OverlayLocator>,
    ticker: Arc<dyn TickSource>,
    reporter: Arc<dyn DegradeReporter>,
    policy: FailurePolicy,
    config: RwLock<FadeConfig>,
    profile: RwLock<String>,
    state: tokio::sync::Mutex<ProvisionState>,
    reported: AtomicBool,
}

impl FadeSubsystem {
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
            config: RwLock::new(FadeConfig::default()),
            profile: RwLock::new(String::from("default")),
            state: tokio::sync::Mutex::new(ProvisionState::Uninitialized),
            reported: AtomicBool::new(false),
        }
    }

    /// Replace the active fade configuration in full. Durations and
    /// curves from the previous configuration do not carry over.
    pub fn configure(&self, config: FadeConfig) {
        *self.config.write() = config;
    }

    /// Record which style profile is driving upcoming fades. Only
    /// used to label degrade reports.
    pub fn set_active_profile(&self, label: &str) {
        *self.profile.write() = label.to_string();
    }

    /// Snapshot of the active configuration
    pub fn config(&self) -> FadeConfig {
        *self.config.read()
    }

    /// Current provisioning phase. `Provisioning` is reported while
    /// another task holds the state lock.
    pub fn phase(&self) -> ProvisionPhase {
        match self.state.try_lock() {
            Err(_) => ProvisionPhase::Provisioning,
            Ok(guard) => match &*guard {
                ProvisionState::Uninitialized => ProvisionPhase::Uninitialized,
                ProvisionState::Ready { valid, .. } => {
                    if valid.load(Ordering::Acquire) {
                        ProvisionPhase::Ready
                    } else {
                        ProvisionPhase::Uninitialized
                    }
                }
                ProvisionState::Unavailable { .. } => ProvisionPhase::Unavailable,
            },
        }
    }

    /// Raise the veil to fully opaque over the configured fade-out
    /// duration.
    pub async fn fade_out(&self, signature: &Signature) -> OverlayResult<()> {
        let (duration_ms, curve) = {
            let config = self.config.read();
            (config.fade_out_ms, config.fade_out_curve)
        };
        self.drive(signature, duration_ms, curve, 1.0).await
    }

    /// Dissolve the veil to fully transparent over the configured
    /// fade-in duration.
    pub async fn fade_in(&self, signature: &Signature) -> OverlayResult<()> {
        let (duration_ms, curve) = {
            let config = self.config.read();
            (config.fade_in_ms, config.fade_in_curve)
        };
        self.drive(signature, duration_ms, curve, 0.0).await
    }

    async fn drive(
        &self,
        signature: &Signature,
        duration_ms: u32,
        curve: EasingCurve,
        target: f32,
    ) -> OverlayResult<()> {
        // A zero-duration fade is a valid "skip" state and must not
        // provision anything.
        if duration_ms == 0 {
            log::debug!(
                "[fade] zero duration, skipping (target={target}, signature={signature})"
            );
            return Ok(());
        }

        let surface = match self.ensure_surface(signature).await? {
            Some(surface) => surface,
            None => return Ok(()),
        };

        let from = surface.level();
        let start = self.ticker.now_ms();
        log::debug!(
            "[fade] driving {from:.2} -> {target:.2} over {duration_ms}ms ({}, signature={signature})",
            curve.name()
        );

        loop {
            self.ticker.yield_tick().await;
            let elapsed = self.ticker.now_ms().saturating_sub(start);
            if elapsed >= u64::from(duration_ms) {
                surface.set_level(target);
                break;
            }
            let t = elapsed as f32 / duration_ms as f32;
            surface.set_level(from + (target - from) * curve.apply(t));
        }
        Ok(())
    }

    /// Resolve a usable surface, provisioning on first use.
    ///
    /// Returns `Ok(None)` when the subsystem is degraded-unavailable
    /// (callers treat the fade as done). Concurrent callers park on
    /// the state lock; whichever enters first provisions, the rest
    /// observe the outcome on entry.
    async fn ensure_surface(
        &self,
        signature: &Signature,
    ) -> OverlayResult<Option<Arc<dyn FadeSurface>>> {
        let mut state = self.state.lock().await;

        if let ProvisionState::Ready { surface, valid } = &*state {
            if valid.load(Ordering::Acquire) {
                return Ok(Some(Arc::clone(surface)));
            }
            log::info!(
                "[fade] unit '{}' was unloaded, reprovisioning (signature={signature})",
                self.unit
            );
            *state = ProvisionState::Uninitialized;
        }

        if let ProvisionState::Unavailable { reason } = &*state {
            let reason = reason.clone();
            drop(state);
            return self.unavailable(signature, "ensure", reason);
        }

        match self.provision(signature).await {
            Ok((surface, valid)) => {
                let out = Arc::clone(&surface);
                *state = ProvisionState::Ready { surface, valid };
                Ok(Some(out))
            }
            Err(reason) => {
                *state = ProvisionState::Unavailable {
                    reason: reason.clone(),
                };
                drop(state);
                self.unavailable(signature, "provision", reason)
            }
        }
    }

    /// One provisioning attempt: additive load, poll to completion,
    /// locate the surface, arm the validity token.
    async fn provision(
        &self,
        signature: &Signature,
    ) -> Result<(Arc<dyn FadeSurface>, Arc<AtomicBool>), String> {
        log::info!(
            "[fade] provisioning unit '{}' (signature={signature})",
            self.unit
        );

        if !self.provider.is_unit_loaded(&self.unit) {
            let Some(_ack) = self.provider.load_unit(&self.unit) else {
                return Err(format!("load request for unit '{}' was refused", self.unit));
            };
            while !self.provider.is_unit_loaded(&self.unit) {
                self.ticker.yield_tick().await;
            }
        }

        let Some(surface) = self.locator.find_fade_surface(&self.unit) else {
            return Err(format!("unit '{}' contains no fade surface", self.unit));
        };

        let valid = Arc::new(AtomicBool::new(true));
        let token = Arc::clone(&valid);
        self.provider.register_unload_hook(
            &self.unit,
            Box::new(move || {
                token.store(false, Ordering::Release);
            }),
        );

        log::info!("[fade] unit '{}' ready (signature={signature})", self.unit);
        Ok((surface, valid))
    }

    /// Apply the failure policy to a terminal unavailability.
    fn unavailable(
        &self,
        signature: &Signature,
        reason: &str,
        detail: String,
    ) -> OverlayResult<Option<Arc<dyn FadeSurface>>> {
        if self.policy.is_strict() {
            return Err(OverlayError::DependencyUnavailable {
                feature: "fade",
                reason: detail,
            });
        }
        if !self.reported.swap(true, Ordering::AcqRel) {
            self.reporter
                .report("fade", reason, &detail, signature, &self.profile.read());
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
    use crate::surface::{MemoryOverlayHost, SharedFadeSurface};

    struct Fixture {
        provider: Arc<MemorySceneProvider>,
        host: Arc<MemoryOverlayHost>,
        reporter: Arc<RecordingReporter>,
        surface: Arc<SharedFadeSurface>,
    }

    impl Fixture {
        fn new() -> Self {
            let provider = Arc::new(MemorySceneProvider::new());
            provider.register_units([DEFAULT_FADE_UNIT]);

            let host = Arc::new(MemoryOverlayHost::new());
            let surface = Arc::new(SharedFadeSurface::new(0.0));
            host.put_fade_surface(DEFAULT_FADE_UNIT, Arc::clone(&surface) as _);

            Self {
                provider,
                host,
                reporter: Arc::new(RecordingReporter::new()),
                surface,
            }
        }

        fn subsystem(&self, policy: FailurePolicy) -> FadeSubsystem {
            FadeSubsystem::new(
                DEFAULT_FADE_UNIT,
                Arc::clone(&self.provider) as _,
                Arc::clone(&self.host) as _,
                Arc::new(ManualTicker::new(16)) as _,
                Arc::clone(&self.reporter) as _,
                policy,
            )
        }
    }

    #[tokio::test]
    async fn test_fade_out_reaches_exact_target() {
        let fx = Fixture::new();
        let fade = fx.subsystem(FailurePolicy::Strict);
        fade.configure(FadeConfig::symmetric(100, EasingCurve::Linear));

        let sig = Signature::new("sf-test");
        fade.fade_out(&sig).await.expect("fade out");

        assert_eq!(fx.surface.level(), 1.0, "veil should end fully opaque");
        assert_eq!(fade.phase(), ProvisionPhase::Ready);
        assert_eq!(
            fx.provider.operations(),
            vec![format!("load:{DEFAULT_FADE_UNIT}")]
        );

        fade.fade_in(&sig).await.expect("fade in");
        assert_eq!(fx.surface.level(), 0.0, "veil should end fully transparent");
    }

    #[tokio::test]
    async fn test_fade_samples_between_endpoints() {
        let fx = Fixture::new();
        let fade = fx.subsystem(FailurePolicy::Strict);
        // 160ms over 16ms ticks: nine sampled points plus the final snap.
        fade.configure(FadeConfig::symmetric(160, EasingCurve::Linear));

        fade.fade_out(&Signature::new("sf-test"))
            .await
            .expect("fade out");
        assert_eq!(
            fx.surface.set_call_count(),
            10,
            "one set per tick including the final snap"
        );
    }

    #[tokio::test]
    async fn test_zero_duration_never_provisions() {
        let fx = Fixture::new();
        let fade = fx.subsystem(FailurePolicy::Strict);
        fade.configure(FadeConfig::instant());

        fade.fade_out(&Signature::new("sf-test"))
            .await
            .expect("instant fade");

        assert_eq!(fade.phase(), ProvisionPhase::Uninitialized);
        assert!(
            fx.provider.operations().is_empty(),
            "instant fade must not load the overlay unit"
        );
        assert_eq!(fx.surface.set_call_count(), 0);
    }

    #[tokio::test]
    async fn test_strict_re_raises_remembered_failure() {
        let fx = Fixture::new();
        fx.provider.refuse_loads_of(DEFAULT_FADE_UNIT);
        let fade = fx.subsystem(FailurePolicy::Strict);
        fade.configure(FadeConfig::symmetric(50, EasingCurve::Linear));

        let sig = Signature::new("sf-test");
        let first = fade.fade_out(&sig).await;
        assert!(matches!(
            first,
            Err(OverlayError::DependencyUnavailable { feature: "fade", .. })
        ));
        assert_eq!(fade.phase(), ProvisionPhase::Unavailable);

        // No second provisioning attempt: the failure is terminal.
        let second = fade.fade_in(&sig).await;
        assert!(second.is_err());
        assert!(fx.provider.operations().is_empty());
    }

    #[tokio::test]
    async fn test_degraded_reports_once_then_noop() {
        let fx = Fixture::new();
        fx.provider.refuse_loads_of(DEFAULT_FADE_UNIT);
        let fade = fx.subsystem(FailurePolicy::Degraded);
        fade.configure(FadeConfig::symmetric(50, EasingCurve::Linear));
        fade.set_active_profile("gameplay");

        let sig = Signature::new("sf-test");
        fade.fade_out(&sig).await.expect("degraded fade swallows");
        fade.fade_in(&sig).await.expect("degraded fade swallows");
        fade.fade_out(&sig).await.expect("degraded fade swallows");

        assert_eq!(fx.reporter.count_for("fade"), 1, "exactly one report");
        let report = &fx.reporter.reports()[0];
        assert_eq!(report.profile, "gameplay");
        assert_eq!(fx.surface.set_call_count(), 0);
    }

    #[tokio::test]
    async fn test_locator_miss_is_terminal() {
        let fx = Fixture::new();
        fx.host.clear_unit(DEFAULT_FADE_UNIT);
        let fade = fx.subsystem(FailurePolicy::Degraded);
        fade.configure(FadeConfig::symmetric(50, EasingCurve::Linear));

        fade.fade_out(&Signature::new("sf-test"))
            .await
            .expect("degraded fade swallows");

        assert_eq!(fade.phase(), ProvisionPhase::Unavailable);
        assert_eq!(fx.reporter.count(), 1);
        assert_eq!(fx.reporter.reports()[0].reason, "provision");
        // The unit did load; only the locator came up empty.
        assert_eq!(
            fx.provider.operations(),
            vec![format!("load:{DEFAULT_FADE_UNIT}")]
        );
    }

    #[tokio::test]
    async fn test_unload_hook_triggers_reprovision() {
        let fx = Fixture::new();
        let fade = fx.subsystem(FailurePolicy::Strict);
        fade.configure(FadeConfig::symmetric(50, EasingCurve::Linear));

        let sig = Signature::new("sf-test");
        fade.fade_out(&sig).await.expect("first fade");
        assert_eq!(fade.phase(), ProvisionPhase::Ready);

        fx.provider
            .unload_unit(DEFAULT_FADE_UNIT)
            .expect("unload accepted")
            .await;
        assert_eq!(
            fade.phase(),
            ProvisionPhase::Uninitialized,
            "unload hook should invalidate the surface"
        );

        fade.fade_in(&sig).await.expect("second fade reprovisions");
        assert_eq!(fade.phase(), ProvisionPhase::Ready);
        assert_eq!(
            fx.provider.operations(),
            vec![
                format!("load:{DEFAULT_FADE_UNIT}"),
                format!("unload:{DEFAULT_FADE_UNIT}"),
                format!("load:{DEFAULT_FADE_UNIT}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_fades_provision_once() {
        let fx = Fixture::new();
        let fade = Arc::new(fx.subsystem(FailurePolicy::Strict));
        fade.configure(FadeConfig::symmetric(50, EasingCurve::Linear));

        let sig = Signature::new("sf-test");
        let a = {
            let fade = Arc::clone(&fade);
            let sig = sig.clone();
            async move { fade.fade_out(&sig).await }
        };
        let b = {
            let fade = Arc::clone(&fade);
            let sig = sig.clone();
            async move { fade.fade_out(&sig).await }
        };
        let (ra, rb) = tokio::join!(a, b);
        ra.expect("first fade");
        rb.expect("second fade");

        assert_eq!(
            fx.provider.operations(),
            vec![format!("load:{DEFAULT_FADE_UNIT}")],
            "only one provisioning load for concurrent fades"
        );
    }

    #[tokio::test]
    async fn test_configure_replaces_in_full() {
        let fx = Fixture::new();
        let fade = fx.subsystem(FailurePolicy::Strict);

        fade.configure(FadeConfig::new(400, 300, EasingCurve::EaseOutQuad, EasingCurve::EaseInQuad));
        fade.configure(FadeConfig::instant());

        let config = fade.config();
        assert_eq!(config.fade_in_ms, 0);
        assert_eq!(config.fade_out_ms, 0, "old durations must not survive");
    }
}
