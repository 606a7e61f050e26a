//! # Overlay Surfaces
//!
//! Traits for the visual controls that live inside overlay content
//! units, plus in-memory reference implementations used by tests and
//! the demo host.
//!
//! Subsystems never construct these controls themselves. They are
//! discovered through an [`OverlayLocator`] after the owning unit has
//! been loaded, mirroring how a presentation layer exposes widgets
//! that only exist while their scene is resident.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use portable_atomic::AtomicF32;

// ═══════════════════════════════════════════════════════════════════
// Phases
// ═══════════════════════════════════════════════════════════════════

/// Stage of a transition during which an indicator is shown or
/// hidden. Carried so indicator implementations can adjust their
/// presentation (e.g. a progress spinner during `Loading` versus a
/// brief flourish during `Reveal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayPhase {
    /// The screen is being obscured before content is swapped.
    FadeOut,
    /// Scene units are being unloaded and loaded.
    Loading,
    /// The target scene is being activated.
    Activation,
    /// The screen is being revealed over the new content.
    Reveal,
}

impl OverlayPhase {
    /// Short lowercase label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            OverlayPhase::FadeOut => "fade_out",
            OverlayPhase::Loading => "loading",
            OverlayPhase::Activation => "activation",
            OverlayPhase::Reveal => "reveal",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Control traits
// ═══════════════════════════════════════════════════════════════════

/// A full-screen obscuring control with a single scalar level.
///
/// Level 0.0 is fully transparent (content visible), 1.0 is fully
/// opaque (content hidden). The fade subsystem drives this value tick
/// by tick; implementations only need to store and expose it.
pub trait FadeSurface: Send + Sync {
    /// Set the obscuring level. Values outside `[0.0, 1.0]` may be
    /// clamped by the implementation.
    fn set_level(&self, level: f32);

    /// Current obscuring level.
    fn level(&self) -> f32;
}

/// A loading indicator control shown while scene content is swapped.
pub trait LoadingIndicator: Send + Sync {
    /// Make the indicator visible for the given phase.
    fn show(&self, phase: OverlayPhase);

    /// Hide the indicator for the given phase.
    fn hide(&self, phase: OverlayPhase);
}

/// Discovers overlay controls inside a loaded content unit.
///
/// Returns the first matching control, or `None` when the unit does
/// not contain one. Subsystems treat a `None` here as a provisioning
/// failure for that unit.
pub trait OverlayLocator: Send + Sync {
    /// Find the fade surface hosted by `unit`, if any.
    fn find_fade_surface(&self, unit: &str) -> Option<Arc<dyn FadeSurface>>;

    /// Find the loading indicator hosted by `unit`, if any.
    fn find_loading_indicator(&self, unit: &str) -> Option<Arc<dyn LoadingIndicator>>;
}

// ═══════════════════════════════════════════════════════════════════
// Reference implementations
// ═══════════════════════════════════════════════════════════════════

/// Lock-free fade surface backed by an atomic float.
///
/// Also counts `set_level` invocations so harnesses can assert that a
/// fade was (or was not) driven.
pub struct SharedFadeSurface {
    level: AtomicF32,
    set_calls: AtomicU32,
}

impl SharedFadeSurface {
    /// Create a surface at the given initial level.
    pub fn new(initial: f32) -> Self {
        Self {
            level: AtomicF32::new(initial.clamp(0.0, 1.0)),
            set_calls: AtomicU32::new(0),
        }
    }

    /// Number of `set_level` calls observed so far.
    pub fn set_call_count(&self) -> u32 {
        self.set_calls.load(Ordering::Acquire)
    }
}

impl Default for SharedFadeSurface {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl FadeSurface for SharedFadeSurface {
    fn set_level(&self, level: f32) {
        self.level.store(level.clamp(0.0, 1.0), Ordering::Release);
        self.set_calls.fetch_add(1, Ordering::AcqRel);
    }

    fn level(&self) -> f32 {
        self.level.load(Ordering::Acquire)
    }
}

/// Loading indicator that records show/hide traffic.
#[derive(Default)]
pub struct CountingIndicator {
    shows: AtomicU32,
    hides: AtomicU32,
    visible: AtomicBool,
}

impl CountingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `show` calls observed so far.
    pub fn show_count(&self) -> u32 {
        self.shows.load(Ordering::Acquire)
    }

    /// Number of `hide` calls observed so far.
    pub fn hide_count(&self) -> u32 {
        self.hides.load(Ordering::Acquire)
    }

    /// Whether the most recent call was a `show`.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}

impl LoadingIndicator for CountingIndicator {
    fn show(&self, phase: OverlayPhase) {
        self.shows.fetch_add(1, Ordering::AcqRel);
        self.visible.store(true, Ordering::Release);
        log::debug!("[overlay] indicator shown (phase={})", phase.name());
    }

    fn hide(&self, phase: OverlayPhase) {
        self.hides.fetch_add(1, Ordering::AcqRel);
        self.visible.store(false, Ordering::Release);
        log::debug!("[overlay] indicator hidden (phase={})", phase.name());
    }
}

/// In-memory locator that maps unit names to registered controls.
///
/// Units with no registered control behave exactly like a loaded unit
/// that simply does not contain one, which is how locator misses are
/// injected in tests.
#[derive(Default)]
pub struct MemoryOverlayHost {
    surfaces: Mutex<HashMap<String, Arc<dyn FadeSurface>>>,
    indicators: Mutex<HashMap<String, Arc<dyn LoadingIndicator>>>,
}

impl MemoryOverlayHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host a fade surface inside `unit`.
    pub fn put_fade_surface(&self, unit: &str, surface: Arc<dyn FadeSurface>) {
        self.surfaces.lock().insert(unit.to_string(), surface);
    }

    /// Host a loading indicator inside `unit`.
    pub fn put_loading_indicator(&self, unit: &str, indicator: Arc<dyn LoadingIndicator>) {
        self.indicators.lock().insert(unit.to_string(), indicator);
    }

    /// Remove every control hosted by `unit`.
    pub fn clear_unit(&self, unit: &str) {
        self.surfaces.lock().remove(unit);
        self.indicators.lock().remove(unit);
    }
}

impl OverlayLocator for MemoryOverlayHost {
    fn find_fade_surface(&self, unit: &str) -> Option<Arc<dyn FadeSurface>> {
        self.surfaces.lock().get(unit).cloned()
    }

    fn find_loading_indicator(&self, unit: &str) -> Option<Arc<dyn LoadingIndicator>> {
        self.indicators.lock().get(unit).cloned()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════
