//! Style Catalog
//!
//! A style is a named transition visual policy: whether the screen fades at
//! all, and the fade profile when it does.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sf_core::{EasingCurve, FadeConfig};

use crate::normalize_id;

/// One resolved transition style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Resolved style id (normalized), also used as the profile label in
    /// events and diagnostics
    #[serde(default)]
    pub id: String,
    /// Fade profile applied when `use_fade` is set
    #[serde(default)]
    pub fade: FadeConfig,
    /// Whether this style obscures/reveals the screen at all
    #[serde(default = "default_use_fade")]
    pub use_fade: bool,
}

fn default_use_fade() -> bool {
    true
}

impl StyleDefinition {
    pub fn new(fade: FadeConfig, use_fade: bool) -> Self {
        Self {
            id: String::new(),
            fade,
            use_fade,
        }
    }
}

/// Style id → definition, case-insensitive
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: HashMap<String, StyleDefinition>,
}

#[derive(Deserialize)]
struct StyleFile {
    #[serde(default)]
    styles: HashMap<String, StyleDefinition>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the stock styles:
    /// - `frontend` — soft 400/300 ms fade
    /// - `gameplay` — symmetric 500 ms fade
    /// - `instant` — no fade at all
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();

        catalog.register(
            "frontend",
            StyleDefinition::new(
                FadeConfig::new(
                    400,
                    300,
                    EasingCurve::EaseOutQuad,
                    EasingCurve::EaseInQuad,
                ),
                true,
            ),
        );
        catalog.register(
            "gameplay",
            StyleDefinition::new(
                FadeConfig::symmetric(500, EasingCurve::EaseInOutQuad),
                true,
            ),
        );
        catalog.register("instant", StyleDefinition::new(FadeConfig::instant(), false));

        catalog
    }

    /// Load a catalog from its JSON form: `{"styles": {"id": {...}}}`
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let file: StyleFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (id, def) in file.styles {
            catalog.register(&id, def);
        }
        Ok(catalog)
    }

    /// Register a style; the stored definition carries the normalized id.
    pub fn register(&mut self, id: &str, mut definition: StyleDefinition) {
        let id = normalize_id(id);
        definition.id = id.clone();
        self.styles.insert(id, definition);
    }

    /// Case-insensitive lookup; `None` means the id is unknown.
    pub fn try_get(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.get(&normalize_id(id))
    }

    pub fn style_ids(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
