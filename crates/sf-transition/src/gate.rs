//! # Completion Gate
//!
//! Host hook between scene readiness and the reveal steps. The
//! orchestrator awaits the gate after emitting `ScenesReady` and
//! before hiding the indicator and fading back in, so a host can keep
//! the screen obscured while it finishes its own preparation (say,
//! first-frame warm-up of the new content).

use futures_util::future::BoxFuture;

use crate::request::TransitionContext;

/// Hook awaited between scene readiness and the reveal.
pub trait CompletionGate: Send + Sync {
    /// Resolve when the reveal may proceed. Runs exactly once per
    /// transition, after `ScenesReady`.
    fn before_reveal<'a>(&'a self, ctx: &'a TransitionContext) -> BoxFuture<'a, ()>;
}

/// Default gate: the reveal proceeds immediately.
#[derive(Debug, Default)]
pub struct NoopGate;

impl CompletionGate for NoopGate {
    fn before_reveal<'a>(&'a self, _ctx: &'a TransitionContext) -> BoxFuture<'a, ()> {
        Box::pin(async {})
    }
}

/// Closure adapter for one-off gates.
pub struct GateFn<F> {
    f: F,
}

impl<F> GateFn<F>
where
    F: Fn(TransitionContext) -> BoxFuture<'static, ()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> CompletionGate for GateFn<F>
where
    F: Fn(TransitionContext) -> BoxFuture<'static, ()> + Send + Sync,
{
    fn before_reveal<'a>(&'a self, ctx: &'a TransitionContext) -> BoxFuture<'a, ()> {
        (self.f)(ctx.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn context() -> TransitionContext {
        TransitionContext {
            signature: sf_core::Signature::new("sf-gate"),
            style: "gameplay".to_string(),
            scenes_to_load: vec![],
            scenes_to_unload: vec![],
            target_active_scene: String::new(),
            requested_by: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_noop_gate_resolves_immediately() {
        let gate = NoopGate;
        gate.before_reveal(&context()).await;
    }

    #[tokio::test]
    async fn test_gate_fn_sees_the_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let gate = GateFn::new(move |ctx: TransitionContext| {
            let seen = Arc::clone(&seen);
            Box::pin(async move {
                assert_eq!(ctx.style, "gameplay");
                seen.fetch_add(1, Ordering::SeqCst);
            }) as BoxFuture<'static, ()>
        });

        gate.before_reveal(&context()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
