//! # Game Loop Coordinator
//!
//! Gates game start on the readiness signal of its own startup
//! transition. The game loop must not run before the gameplay scenes
//! are loaded and active, and must not be started by a readiness
//! signal belonging to some other transition, so the coordinator
//! correlates by signature and style before releasing the handle.
//!
//! Start ownership is made explicit through [`StartAuthority`]: the
//! coordinator claims it at construction, displacing whoever held it
//! before. Hosts with a legacy auto-start path check
//! [`StartAuthority::is_claimed`] and stand down when a coordinator
//! owns the start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;

use crate::orchestrator::TransitionOrchestrator;
use crate::request::TransitionContext;
use crate::trace::TransitionReport;
use crate::{TransitionError, TransitionResult};

/// Started exactly once per successful startup transition.
pub trait GameLoopHandle: Send + Sync {
    /// Start the game loop for the now-active content.
    fn release(&self, ctx: &TransitionContext);
}

/// Locates the game loop handle at readiness time. Resolution is
/// deferred to the moment it is needed because the handle typically
/// lives inside a scene unit that only exists once loaded.
pub trait GameLoopResolver: Send + Sync {
    fn resolve(&self) -> Option<Arc<dyn GameLoopHandle>>;
}

#[derive(Default)]
struct AuthorityState {
    holder: Option<String>,
    generation: u64,
}

/// Proof of an authority claim. Stale once someone else claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorityClaim {
    generation: u64,
}

/// Shared token deciding who may start the game loop.
#[derive(Default)]
pub struct StartAuthority {
    state: Mutex<AuthorityState>,
}

impl StartAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the authority, displacing any previous holder.
    pub fn claim(&self, holder: &str) -> AuthorityClaim {
        let mut state = self.state.lock();
        if let Some(previous) = &state.holder {
            log::info!("[coordinator] start authority moves from '{previous}' to '{holder}'");
        }
        state.holder = Some(holder.to_string());
        state.generation += 1;
        AuthorityClaim {
            generation: state.generation,
        }
    }

    /// Whether the claim is still the latest one
    pub fn is_current(&self, claim: AuthorityClaim) -> bool {
        self.state.lock().generation == claim.generation
    }

    /// Whether anyone holds the authority. Legacy start paths check
    /// this and stand down when it is claimed.
    pub fn is_claimed(&self) -> bool {
        self.state.lock().holder.is_some()
    }

    /// Label of the current holder
    pub fn holder(&self) -> Option<String> {
        self.state.lock().holder.clone()
    }
}

/// Drives the startup route and releases the game loop when its own
/// transition signals readiness.
pub struct GameLoopCoordinator {
    orchestrator: Arc<TransitionOrchestrator>,
    resolver: Arc<dyn GameLoopResolver>,
    authority: Arc<StartAuthority>,
    claim: AuthorityClaim,
    route_id: String,
    style_id: String,
    start_pending: Arc<AtomicBool>,
}

impl GameLoopCoordinator {
    /// Construct the coordinator and claim the start authority.
    pub fn new(
        orchestrator: Arc<TransitionOrchestrator>,
        resolver: Arc<dyn GameLoopResolver>,
        authority: Arc<StartAuthority>,
        route_id: impl Into<String>,
        style_id: impl Into<String>,
    ) -> Self {
        let claim = authority.claim("game-loop-coordinator");
        Self {
            orchestrator,
            resolver,
            authority,
            claim,
            route_id: route_id.into(),
            style_id: style_id.into(),
            start_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a start is pending (requested, readiness not seen yet)
    pub fn is_start_pending(&self) -> bool {
        self.start_pending.load(Ordering::Acquire)
    }

    /// Run the startup route and release the game loop on matching
    /// readiness.
    ///
    /// Re-requests while a start is pending are rejected; so are
    /// requests from a coordinator whose authority has been displaced.
    /// A failed transition clears the pending flag so a later request
    /// can try again.
    pub async fn request_start(&self) -> TransitionResult<TransitionReport> {
        if !self.authority.is_current(self.claim) {
            let holder = self.authority.holder().unwrap_or_default();
            log::warn!("[coordinator] ignoring start request: authority displaced to '{holder}'");
            return Err(TransitionError::NotAuthoritative { holder });
        }
        if self
            .start_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("[coordinator] ignoring start request: a start is already pending");
            return Err(TransitionError::AlreadyInFlight {
                requested_by: "game-loop-coordinator".to_string(),
            });
        }

        // Build the request first so the signature to correlate on is
        // known before anything runs.
        let request = match self.orchestrator.build_route_request(
            &self.route_id,
            &self.style_id,
            "game-loop-coordinator",
        ) {
            Ok(request) => request,
            Err(err) => {
                self.start_pending.store(false, Ordering::Release);
                return Err(err);
            }
        };

        let expected_signature = request.signature().clone();
        let expected_style = request.style_id().to_string();
        log::info!(
            "[coordinator] starting route '{}' with style '{expected_style}' (signature={expected_signature})",
            self.route_id
        );

        // Subscribe before executing so the readiness signal cannot be
        // missed, then react to it while the transition is still
        // revealing.
        let mut ready_rx = self.orchestrator.events().scenes_ready.subscribe();
        let resolver = Arc::clone(&self.resolver);
        let pending = Arc::clone(&self.start_pending);
        let listener = tokio::spawn(async move {
            loop {
                match ready_rx.recv().await {
                    Ok(ctx) => {
                        if ctx.signature != expected_signature || ctx.style != expected_style {
                            log::debug!(
                                "[coordinator] ignoring readiness signal of another attempt (signature={})",
                                ctx.signature
                            );
                            continue;
                        }
                        match resolver.resolve() {
                            Some(handle) => {
                                log::info!(
                                    "[coordinator] scenes ready, releasing game loop (signature={})",
                                    ctx.signature
                                );
                                handle.release(&ctx);
                            }
                            None => log::error!(
                                "[coordinator] scenes ready but no game loop handle resolved (signature={})",
                                ctx.signature
                            ),
                        }
                        pending.store(false, Ordering::Release);
                        break;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("[coordinator] readiness listener lagged by {missed} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let outcome = self.orchestrator.execute(request).await;
        match &outcome {
            Ok(report) if report.succeeded() => {
                // The matching readiness signal is in the channel;
                // wait for the listener so callers observe a settled
                // pending flag.
                let _ = listener.await;
            }
            _ => {
                listener.abort();
                self.start_pending.store(false, Ordering::Release);
            }
        }
        outcome
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════
