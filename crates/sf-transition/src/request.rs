//! # Transition Requests
//!
//! A request is the immutable description of one transition attempt:
//! which scene units change, which unit becomes active, whether the
//! screen fades, and the correlation signature threading the attempt
//! through events and logs. Built through a sanitizing builder and
//! consumed exactly once by the orchestrator.

use serde::{Deserialize, Serialize};
use sf_catalog::sanitize_scene_list;
use sf_core::Signature;

/// Immutable description of one transition attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    scenes_to_load: Vec<String>,
    scenes_to_unload: Vec<String>,
    target_active_scene: String,
    use_fade: bool,
    style_id: String,
    signature: Signature,
    requested_by: String,
}

impl TransitionRequest {
    pub fn builder() -> TransitionRequestBuilder {
        TransitionRequestBuilder::default()
    }

    /// Units to load, in order, sanitized
    pub fn scenes_to_load(&self) -> &[String] {
        &self.scenes_to_load
    }

    /// Units to unload first, sanitized
    pub fn scenes_to_unload(&self) -> &[String] {
        &self.scenes_to_unload
    }

    /// Unit made active after loading. Empty keeps the current one.
    pub fn target_active_scene(&self) -> &str {
        &self.target_active_scene
    }

    /// Whether the screen is obscured and revealed around the swap
    pub fn use_fade(&self) -> bool {
        self.use_fade
    }

    /// Style label carried into events and diagnostics
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    /// Correlation signature of this attempt
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Label of whoever asked for the transition
    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }
}

/// Builder applying the scene-list invariants at `build`.
#[derive(Debug, Default)]
pub struct TransitionRequestBuilder {
    load: Vec<String>,
    unload: Vec<String>,
    active: String,
    use_fade: bool,
    style: String,
    signature: Option<Signature>,
    requested_by: String,
}

impl TransitionRequestBuilder {
    /// Append units to the load set
    pub fn load<I, S>(mut self, scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load.extend(scenes.into_iter().map(Into::into));
        self
    }

    /// Append units to the unload set
    pub fn unload<I, S>(mut self, scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unload.extend(scenes.into_iter().map(Into::into));
        self
    }

    /// Unit to activate once loaded. Empty keeps the current one.
    pub fn activate(mut self, scene: &str) -> Self {
        self.active = scene.to_string();
        self
    }

    pub fn use_fade(mut self, on: bool) -> Self {
        self.use_fade = on;
        self
    }

    pub fn style(mut self, id: &str) -> Self {
        self.style = id.to_string();
        self
    }

    /// Carry an externally generated signature instead of a fresh one
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn requested_by(mut self, who: &str) -> Self {
        self.requested_by = who.to_string();
        self
    }

    pub fn build(self) -> TransitionRequest {
        TransitionRequest {
            scenes_to_load: sanitize_scene_list(self.load),
            scenes_to_unload: sanitize_scene_list(self.unload),
            target_active_scene: self.active.trim().to_string(),
            use_fade: self.use_fade,
            style_id: self.style,
            signature: self.signature.unwrap_or_else(Signature::generate),
            requested_by: self.requested_by,
        }
    }
}

/// Event payload describing a transition in flight. Cloned into every
/// lifecycle event of the attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionContext {
    pub signature: Signature,
    /// Style label, also the degrade-report profile
    pub style: String,
    pub scenes_to_load: Vec<String>,
    pub scenes_to_unload: Vec<String>,
    pub target_active_scene: String,
    pub requested_by: String,
}

impl TransitionContext {
    pub fn from_request(request: &TransitionRequest) -> Self {
        Self {
            signature: request.signature().clone(),
            style: request.style_id().to_string(),
            scenes_to_load: request.scenes_to_load().to_vec(),
            scenes_to_unload: request.scenes_to_unload().to_vec(),
            target_active_scene: request.target_active_scene().to_string(),
            requested_by: request.requested_by().to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sanitizes_lists() {
        let request = TransitionRequest::builder()
            .load(["GameplayScene", " ", "UIGlobalScene", "GameplayScene"])
            .unload([""])
            .activate(" GameplayScene ")
            .style("gameplay")
            .use_fade(true)
            .requested_by("test")
            .build();

        assert_eq!(
            request.scenes_to_load(),
            ["GameplayScene", "UIGlobalScene"]
        );
        assert!(request.scenes_to_unload().is_empty());
        assert_eq!(request.target_active_scene(), "GameplayScene");
    }

    #[test]
    fn test_builder_generates_signature_when_absent() {
        let a = TransitionRequest::builder().build();
        let b = TransitionRequest::builder().build();
        assert_ne!(a.signature(), b.signature());
        assert!(a.signature().as_str().starts_with("sf-"));
    }

    #[test]
    fn test_builder_keeps_given_signature() {
        let sig = Signature::new("sf-fixed");
        let request = TransitionRequest::builder()
            .signature(sig.clone())
            .build();
        assert_eq!(request.signature(), &sig);
    }

    #[test]
    fn test_context_mirrors_request() {
        let request = TransitionRequest::builder()
            .load(["A", "B"])
            .unload(["C"])
            .activate("A")
            .style("frontend")
            .requested_by("menu")
            .build();

        let ctx = TransitionContext::from_request(&request);
        assert_eq!(ctx.signature, *request.signature());
        assert_eq!(ctx.style, "frontend");
        assert_eq!(ctx.scenes_to_load, ["A", "B"]);
        assert_eq!(ctx.scenes_to_unload, ["C"]);
        assert_eq!(ctx.target_active_scene, "A");
        assert_eq!(ctx.requested_by, "menu");
    }
}
