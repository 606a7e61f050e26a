//! # Flow Events
//!
//! Typed broadcast channels for transition lifecycle events. Every
//! channel registers a clear closure with an [`EventTeardown`] registry
//! at creation; application teardown calls [`EventTeardown::clear_all`]
//! to drop stale subscribers in one pass instead of hunting them down
//! per channel.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::request::TransitionContext;

/// Buffered events per channel before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 32;

/// One typed broadcast channel.
///
/// `clear` swaps the underlying sender, which closes every receiver
/// handed out so far; later subscribers attach to the fresh sender.
pub struct EventChannel<T: Clone + Send + 'static> {
    sender: RwLock<broadcast::Sender<T>>,
}

impl<T: Clone + Send + 'static> EventChannel<T> {
    /// Create a channel that is not part of any teardown registry
    pub fn new() -> Arc<Self> {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Arc::new(Self {
            sender: RwLock::new(sender),
        })
    }

    /// Create a channel and register its clear closure under `name`
    pub fn registered(name: &str, teardown: &EventTeardown) -> Arc<Self> {
        let channel = Self::new();
        let handle = Arc::clone(&channel);
        teardown.register(name, Box::new(move || handle.clear()));
        channel
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.read().subscribe()
    }

    /// Emit an event to all current subscribers. Returns how many
    /// subscribers received it; zero subscribers is not an error.
    pub fn emit(&self, event: T) -> usize {
        self.sender.read().send(event).unwrap_or(0)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.read().receiver_count()
    }

    /// Disconnect every current subscriber
    pub fn clear(&self) {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        *self.sender.write() = sender;
    }
}

/// Registry of channel clear closures.
///
/// Channels register themselves at creation; teardown walks the list
/// once. The registry holds each channel alive through its closure,
/// so it must be owned by the composition root, not by a subscriber.
#[derive(Default)]
pub struct EventTeardown {
    clearers: Mutex<Vec<(String, Box<dyn Fn() + Send + Sync>)>>,
}

impl EventTeardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clear closure under a diagnostic name
    pub fn register(&self, name: &str, clear: Box<dyn Fn() + Send + Sync>) {
        self.clearers.lock().push((name.to_string(), clear));
    }

    /// Clear every registered channel. Returns how many were cleared.
    pub fn clear_all(&self) -> usize {
        let clearers = self.clearers.lock();
        for (name, clear) in clearers.iter() {
            log::debug!("[events] clearing channel '{name}'");
            clear();
        }
        clearers.len()
    }

    /// Registered channel names, in registration order
    pub fn channel_names(&self) -> Vec<String> {
        self.clearers
            .lock()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clearers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clearers.lock().is_empty()
    }
}

/// The three transition lifecycle channels, in emission order.
#[derive(Clone)]
pub struct FlowEvents {
    /// Sequence accepted and starting
    pub started: Arc<EventChannel<TransitionContext>>,
    /// Scene content is swapped and active; the application may act on
    /// the new content even though the reveal has not finished
    pub scenes_ready: Arc<EventChannel<TransitionContext>>,
    /// Reveal finished, sequence over
    pub completed: Arc<EventChannel<TransitionContext>>,
}

impl FlowEvents {
    /// Create the flow channels, registered for teardown
    pub fn new(teardown: &EventTeardown) -> Self {
        Self {
            started: EventChannel::registered("transition.started", teardown),
            scenes_ready: EventChannel::registered("transition.scenes_ready", teardown),
            completed: EventChannel::registered("transition.completed", teardown),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════
