//! # Content Swap Context
//!
//! Two-slot register for swapping auxiliary content (the playable game
//! inside the frontend shell): a *pending* plan staged ahead of a
//! transition and a *current* plan describing what the application is
//! running now. Commit is an atomic move from pending to current, so
//! observers never see a half-updated pair.
//!
//! Plans compare by content id: re-planning the same content under a
//! fresh signature is still "the same plan" to consumers.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sf_core::Signature;

use crate::events::{EventChannel, EventTeardown};
use crate::orchestrator::FlightGuard;

/// One staged content hand-over.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ContentSwapPlan {
    /// Which content to run
    pub content_id: String,
    /// Correlation signature of the attempt that staged the plan
    pub signature: Signature,
}

impl ContentSwapPlan {
    pub fn new(content_id: impl Into<String>, signature: Signature) -> Self {
        Self {
            content_id: content_id.into(),
            signature,
        }
    }
}

impl PartialEq for ContentSwapPlan {
    fn eq(&self, other: &Self) -> bool {
        self.content_id == other.content_id
    }
}

/// Payload of a committed hand-over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapCommit {
    /// What was current before this commit
    pub previous: Option<ContentSwapPlan>,
    /// What is current now
    pub current: ContentSwapPlan,
    /// Why the commit happened ("scenes-ready", "boot", ...)
    pub reason: String,
}

/// Swap lifecycle channels.
#[derive(Clone)]
pub struct SwapEvents {
    pub pending_set: Arc<EventChannel<ContentSwapPlan>>,
    pub committed: Arc<EventChannel<SwapCommit>>,
    pub pending_cleared: Arc<EventChannel<ContentSwapPlan>>,
}

impl SwapEvents {
    pub fn new(teardown: &EventTeardown) -> Self {
        Self {
            pending_set: EventChannel::registered("swap.pending_set", teardown),
            committed: EventChannel::registered("swap.committed", teardown),
            pending_cleared: EventChannel::registered("swap.pending_cleared", teardown),
        }
    }
}

#[derive(Default)]
struct SwapSlots {
    pending: Option<ContentSwapPlan>,
    current: Option<ContentSwapPlan>,
}

/// Pending/current content plan register with atomic hand-over.
pub struct ContentSwapContext {
    slots: Mutex<SwapSlots>,
    events: SwapEvents,
    apply_in_flight: AtomicBool,
}

impl ContentSwapContext {
    pub fn new(teardown: &EventTeardown) -> Self {
        Self {
            slots: Mutex::new(SwapSlots::default()),
            events: SwapEvents::new(teardown),
            apply_in_flight: AtomicBool::new(false),
        }
    }

    pub fn events(&self) -> &SwapEvents {
        &self.events
    }

    /// The staged plan, if any
    pub fn pending(&self) -> Option<ContentSwapPlan> {
        self.slots.lock().pending.clone()
    }

    /// The running plan, if any
    pub fn current(&self) -> Option<ContentSwapPlan> {
        self.slots.lock().current.clone()
    }

    /// Stage a plan. A blank content id is rejected as a warned no-op,
    /// never an error.
    pub fn set_pending(&self, plan: ContentSwapPlan, reason: &str) {
        if plan.content_id.trim().is_empty() {
            log::warn!(
                "[swap] ignoring pending plan with blank content id (reason={reason}, signature={})",
                plan.signature
            );
            return;
        }
        self.slots.lock().pending = Some(plan.clone());
        log::info!(
            "[swap] pending '{}' (reason={reason}, signature={})",
            plan.content_id,
            plan.signature
        );
        self.events.pending_set.emit(plan);
    }

    /// Atomically move pending to current. `None` when nothing was
    /// pending; observers of `committed` see previous and current in
    /// one payload.
    pub fn try_commit_pending(&self, reason: &str) -> Option<ContentSwapPlan> {
        let (previous, committed) = {
            let mut slots = self.slots.lock();
            let plan = slots.pending.take()?;
            let previous = slots.current.replace(plan.clone());
            (previous, plan)
        };

        log::info!(
            "[swap] committed '{}' (reason={reason}, signature={})",
            committed.content_id,
            committed.signature
        );
        self.events.committed.emit(SwapCommit {
            previous,
            current: committed.clone(),
            reason: reason.to_string(),
        });
        Some(committed)
    }

    /// Drop the staged plan, if any
    pub fn clear_pending(&self, reason: &str) {
        let cleared = self.slots.lock().pending.take();
        if let Some(plan) = cleared {
            log::info!(
                "[swap] cleared pending '{}' (reason={reason}, signature={})",
                plan.content_id,
                plan.signature
            );
            self.events.pending_cleared.emit(plan);
        }
    }

    /// Stage a plan and run the application's apply step under a
    /// single-flight guard. When apply reports failure the pending
    /// plan is cleared so a stale plan cannot be committed later.
    ///
    /// Returns whether the swap was accepted and applied.
    pub async fn request_swap<F>(&self, plan: ContentSwapPlan, reason: &str, apply: F) -> bool
    where
        F: std::future::Future<Output = bool>,
    {
        if plan.content_id.trim().is_empty() {
            log::warn!(
                "[swap] rejecting swap request with blank content id (signature={})",
                plan.signature
            );
            return false;
        }
        let Some(_guard) = FlightGuard::claim(&self.apply_in_flight) else {
            log::warn!(
                "[swap] rejecting swap to '{}': another swap is applying",
                plan.content_id
            );
            return false;
        };

        let content_id = plan.content_id.clone();
        self.set_pending(plan, reason);

        let applied = apply.await;
        if !applied {
            log::warn!("[swap] apply failed for '{content_id}' (reason={reason}), clearing pending");
            self.clear_pending(reason);
        }
        applied
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════
