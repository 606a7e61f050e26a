//! Scene Provider Contract
//!
//! The host owns scene units; SceneForge only requests operations on them.
//! Loads are additive: a loaded unit joins the set of loaded units and a
//! separate activation step picks the active one.
//!
//! `load_unit`/`unload_unit` return `None` when the host refuses the request
//! (unknown unit, shutting down). The returned acknowledgment future
//! resolves when the operation completes; callers may also drop it and poll
//! `is_unit_loaded` instead.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;

/// Acknowledgment for one asynchronous unit operation
pub type UnitAck = BoxFuture<'static, ()>;

/// Callback fired when a unit finishes unloading
pub type UnloadHook = Box<dyn Fn() + Send + Sync>;

/// Host contract for scene unit operations
pub trait SceneProvider: Send + Sync {
    /// Begin an additive load. `None` means the host refused the request.
    fn load_unit(&self, name: &str) -> Option<UnitAck>;

    /// Begin an unload. `None` means the host refused the request
    /// (typically: the unit is not loaded).
    fn unload_unit(&self, name: &str) -> Option<UnitAck>;

    /// Whether the unit is currently loaded
    fn is_unit_loaded(&self, name: &str) -> bool;

    /// Whether the unit is declared loadable at all. Synchronous; used for
    /// strict-policy pre-checks before any time is spent.
    fn is_unit_registered(&self, name: &str) -> bool;

    /// Make a loaded unit the active one. Returns false if the unit is not
    /// loaded or the host rejects the change.
    fn try_set_active_unit(&self, name: &str) -> bool;

    /// Name of the currently active unit (empty if none)
    fn active_unit_name(&self) -> String;

    /// Register a callback fired when `unit` finishes unloading. Used by
    /// provisioning subsystems to invalidate controller references exactly
    /// when their owning unit goes away.
    fn register_unload_hook(&self, unit: &str, hook: UnloadHook);
}

#[derive(Default)]
struct ProviderState {
    registered: HashSet<String>,
    loaded: HashSet<String>,
    active: String,
    refuse_load: HashSet<String>,
    refuse_unload: HashSet<String>,
    stall_load: HashSet<String>,
    refuse_activation: HashSet<String>,
    unload_hooks: HashMap<String, Vec<UnloadHook>>,
    ops: Vec<String>,
}

/// Deterministic in-memory provider for demos and harnesses.
///
/// Operations complete after a configurable number of cooperative yields on
/// a spawned task, so loads are genuinely asynchronous under any tokio
/// runtime. Failure injection: refuse a load/unload (no acknowledgment),
/// stall a load forever, or reject activation of a unit.
pub struct MemorySceneProvider {
    state: Arc<Mutex<ProviderState>>,
    latency_yields: u32,
}

impl MemorySceneProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState::default())),
            latency_yields: 2,
        }
    }

    /// Override how many scheduler yields an operation takes to complete
    pub fn with_latency(mut self, yields: u32) -> Self {
        self.latency_yields = yields;
        self
    }

    /// Declare units loadable
    pub fn register_units<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock();
        for name in names {
            state.registered.insert(name.into());
        }
    }

    /// Declare a unit loadable and mark it loaded immediately
    pub fn preload_unit(&self, name: &str) {
        let mut state = self.state.lock();
        state.registered.insert(name.to_string());
        state.loaded.insert(name.to_string());
    }

    /// Script the active unit directly
    pub fn set_active_unit(&self, name: &str) {
        self.state.lock().active = name.to_string();
    }

    /// Make `load_unit(name)` return no acknowledgment
    pub fn refuse_loads_of(&self, name: &str) {
        self.state.lock().refuse_load.insert(name.to_string());
    }

    /// Make `unload_unit(name)` return no acknowledgment
    pub fn refuse_unloads_of(&self, name: &str) {
        self.state.lock().refuse_unload.insert(name.to_string());
    }

    /// Accept the load but never complete it
    pub fn stall_loads_of(&self, name: &str) {
        self.state.lock().stall_load.insert(name.to_string());
    }

    /// Make `try_set_active_unit(name)` fail even when loaded
    pub fn refuse_activation_of(&self, name: &str) {
        self.state.lock().refuse_activation.insert(name.to_string());
    }

    /// Loaded units, sorted for stable assertions
    pub fn loaded_units(&self) -> Vec<String> {
        let mut units: Vec<String> = self.state.lock().loaded.iter().cloned().collect();
        units.sort();
        units
    }

    /// Accepted operations in request order ("load:X", "unload:X", "activate:X")
    pub fn operations(&self) -> Vec<String> {
        self.state.lock().ops.clone()
    }
}

impl Default for MemorySceneProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneProvider for MemorySceneProvider {
    fn load_unit(&self, name: &str) -> Option<UnitAck> {
        let stalled = {
            let mut state = self.state.lock();
            if !state.registered.contains(name) || state.refuse_load.contains(name) {
                return None;
            }
            state.ops.push(format!("load:{name}"));
            state.stall_load.contains(name)
        };

        if stalled {
            return Some(Box::pin(futures_util::future::pending()));
        }

        let state = Arc::clone(&self.state);
        let unit = name.to_string();
        let yields = self.latency_yields;
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
            state.lock().loaded.insert(unit);
            let _ = tx.send(());
        });

        Some(Box::pin(async move {
            let _ = rx.await;
        }))
    }

    fn unload_unit(&self, name: &str) -> Option<UnitAck> {
        {
            let mut state = self.state.lock();
            if !state.loaded.contains(name) || state.refuse_unload.contains(name) {
                return None;
            }
            state.ops.push(format!("unload:{name}"));
        }

        let state = Arc::clone(&self.state);
        let unit = name.to_string();
        let yields = self.latency_yields;
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
            let hooks = {
                let mut st = state.lock();
                st.loaded.remove(&unit);
                if st.active == unit {
                    st.active.clear();
                }
                st.unload_hooks.remove(&unit).unwrap_or_default()
            };
            // Hooks run outside the lock; they may call back into the provider.
            for hook in &hooks {
                hook();
            }
            let _ = tx.send(());
        });

        Some(Box::pin(async move {
            let _ = rx.await;
        }))
    }

    fn is_unit_loaded(&self, name: &str) -> bool {
        self.state.lock().loaded.contains(name)
    }

    fn is_unit_registered(&self, name: &str) -> bool {
        self.state.lock().registered.contains(name)
    }

    fn try_set_active_unit(&self, name: &str) -> bool {
        let mut state = self.state.lock();
        if !state.loaded.contains(name) || state.refuse_activation.contains(name) {
            return false;
        }
        state.active = name.to_string();
        state.ops.push(format!("activate:{name}"));
        true
    }

    fn active_unit_name(&self) -> String {
        self.state.lock().active.clone()
    }

    fn register_unload_hook(&self, unit: &str, hook: UnloadHook) {
        self.state
            .lock()
            .unload_hooks
            .entry(unit.to_string())
            .or_default()
            .push(hook);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_load_completes_and_marks_loaded() {
        let provider = MemorySceneProvider::new();
        provider.register_units(["GameplayScene"]);
        assert!(!provider.is_unit_loaded("GameplayScene"));

        let ack = provider.load_unit("GameplayScene").expect("accepted");
        ack.await;
        assert!(provider.is_unit_loaded("GameplayScene"));
        assert_eq!(provider.operations(), vec!["load:GameplayScene"]);
    }

    #[tokio::test]
    async fn test_unregistered_load_returns_no_ack() {
        let provider = MemorySceneProvider::new();
        assert!(provider.load_unit("Nowhere").is_none());
        assert!(provider.operations().is_empty());
    }

    #[tokio::test]
    async fn test_refused_load_returns_no_ack() {
        let provider = MemorySceneProvider::new();
        provider.register_units(["FadeOverlay"]);
        provider.refuse_loads_of("FadeOverlay");
        assert!(provider.load_unit("FadeOverlay").is_none());
    }

    #[tokio::test]
    async fn test_activation_requires_loaded_unit() {
        let provider = MemorySceneProvider::new();
        provider.register_units(["GameplayScene"]);
        assert!(!provider.try_set_active_unit("GameplayScene"));

        provider.preload_unit("GameplayScene");
        assert!(provider.try_set_active_unit("GameplayScene"));
        assert_eq!(provider.active_unit_name(), "GameplayScene");
    }

    #[tokio::test]
    async fn test_unload_fires_hooks_once() {
        let provider = MemorySceneProvider::new();
        provider.preload_unit("FadeOverlay");

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        provider.register_unload_hook(
            "FadeOverlay",
            Box::new(move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        provider.unload_unit("FadeOverlay").expect("accepted").await;
        assert!(!provider.is_unit_loaded("FadeOverlay"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Hook was consumed; a later reload+unload cycle fires nothing.
        provider.preload_unit("FadeOverlay");
        provider.unload_unit("FadeOverlay").expect("accepted").await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unloading_active_unit_clears_active() {
        let provider = MemorySceneProvider::new();
        provider.preload_unit("FrontendScene");
        assert!(provider.try_set_active_unit("FrontendScene"));

        provider
            .unload_unit("FrontendScene")
            .expect("accepted")
            .await;
        assert_eq!(provider.active_unit_name(), "");
    }
}
