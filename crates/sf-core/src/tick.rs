//! Cooperative Tick Scheduling
//!
//! Transitions suspend between steps (fade sampling, provisioning polls)
//! without blocking a thread. [`TickSource`] is the scheduler contract:
//! `yield_tick` suspends until the next scheduling tick, `now_ms` reads
//! unscaled wall-clock time. Hosts with a frame loop can implement it over
//! their frame callback; everything else uses [`RuntimeTicker`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;

/// Scheduler contract for cooperative suspension
pub trait TickSource: Send + Sync {
    /// Suspend until the next scheduling tick. Never blocks a thread.
    fn yield_tick(&self) -> BoxFuture<'_, ()>;

    /// Unscaled wall-clock milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// Tokio-backed ticker with a fixed tick interval
pub struct RuntimeTicker {
    origin: Instant,
    tick: Duration,
}

impl RuntimeTicker {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            origin: Instant::now(),
            tick: Duration::from_millis(tick_ms),
        }
    }

    /// 16 ms tick, matching a 60 Hz frame callback
    pub fn frame_60hz() -> Self {
        Self::new(16)
    }
}

impl Default for RuntimeTicker {
    fn default() -> Self {
        Self::frame_60hz()
    }
}

impl TickSource for RuntimeTicker {
    fn yield_tick(&self) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(self.tick))
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Deterministic ticker for harnesses: each yield advances a virtual clock
/// by a fixed step and cooperatively yields to the executor.
pub struct ManualTicker {
    now_ms: AtomicU64,
    step_ms: u64,
}

impl ManualTicker {
    pub fn new(step_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(0),
            step_ms,
        }
    }

    /// Advance the virtual clock without yielding
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TickSource for ManualTicker {
    fn yield_tick(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.now_ms.fetch_add(self.step_ms, Ordering::SeqCst);
        })
    }

    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
