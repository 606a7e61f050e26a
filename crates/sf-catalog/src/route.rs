//! Route Catalog
//!
//! A route is a named bundle of scene units: what to load (ordered), what to
//! unload, and which loaded unit becomes active afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{normalize_id, sanitize_scene_list};

/// Broad classification of what a route leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Menus, lobby, out-of-game screens
    Frontend,
    /// A playable level
    Gameplay,
    /// Additive overlay on top of the current content
    Overlay,
    #[default]
    Unspecified,
}

impl RouteKind {
    pub fn name(&self) -> &'static str {
        match self {
            RouteKind::Frontend => "frontend",
            RouteKind::Gameplay => "gameplay",
            RouteKind::Overlay => "overlay",
            RouteKind::Unspecified => "unspecified",
        }
    }
}

/// One resolved route: scene lists plus the target active unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Units to load, in order
    pub load: Vec<String>,
    /// Units to unload first
    #[serde(default)]
    pub unload: Vec<String>,
    /// Unit made active once loading finishes. Empty keeps the current
    /// active unit (overlay routes).
    #[serde(default)]
    pub active: String,
    #[serde(default)]
    pub kind: RouteKind,
}

impl RouteDefinition {
    pub fn new(
        load: impl IntoIterator<Item = impl Into<String>>,
        unload: impl IntoIterator<Item = impl Into<String>>,
        active: impl Into<String>,
        kind: RouteKind,
    ) -> Self {
        Self {
            load: load.into_iter().map(Into::into).collect(),
            unload: unload.into_iter().map(Into::into).collect(),
            active: active.into(),
            kind,
        }
        .sanitized()
    }

    /// Apply the scene-list invariants: no blanks, no duplicates, order
    /// preserved. Deserialized definitions are sanitized on registration.
    pub fn sanitized(mut self) -> Self {
        self.load = sanitize_scene_list(self.load);
        self.unload = sanitize_scene_list(self.unload);
        self.active = self.active.trim().to_string();
        self
    }
}

/// Route id → definition, case-insensitive
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: HashMap<String, RouteDefinition>,
}

#[derive(Deserialize)]
struct RouteFile {
    #[serde(default)]
    routes: HashMap<String, RouteDefinition>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the stock frontend/gameplay/overlay routes
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();

        catalog.register(
            "frontend",
            RouteDefinition::new(
                ["FrontendScene", "UIGlobalScene"],
                ["GameplayScene"],
                "FrontendScene",
                RouteKind::Frontend,
            ),
        );
        catalog.register(
            "gameplay",
            RouteDefinition::new(
                ["GameplayScene", "UIGlobalScene"],
                ["FrontendScene"],
                "GameplayScene",
                RouteKind::Gameplay,
            ),
        );
        catalog.register(
            "pause_overlay",
            RouteDefinition::new(
                ["PauseOverlayScene"],
                [] as [&str; 0],
                "",
                RouteKind::Overlay,
            ),
        );

        catalog
    }

    /// Load a catalog from its JSON form: `{"routes": {"id": {...}}}`
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let file: RouteFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (id, def) in file.routes {
            catalog.register(&id, def);
        }
        Ok(catalog)
    }

    /// Register a route. The id is normalized; the definition is sanitized.
    pub fn register(&mut self, id: &str, definition: RouteDefinition) {
        self.routes
            .insert(normalize_id(id), definition.sanitized());
    }

    /// Case-insensitive lookup. `None` means the id is unknown; whether
    /// that is fatal is the caller's decision.
    pub fn try_get(&self, id: &str) -> Option<&RouteDefinition> {
        self.routes.get(&normalize_id(id))
    }

    pub fn route_ids(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = RouteCatalog::with_builtins();
        assert!(catalog.try_get("gameplay").is_some());
        assert!(catalog.try_get("GAMEPLAY").is_some());
        assert!(catalog.try_get("  Gameplay ").is_some());
        assert!(catalog.try_get("no_such_route").is_none());
    }

    #[test]
    fn test_registration_sanitizes_lists() {
        let mut catalog = RouteCatalog::new();
        catalog.register(
            "Messy",
            RouteDefinition {
                load: vec![
                    "A".to_string(),
                    " ".to_string(),
                    "B".to_string(),
                    "A".to_string(),
                ],
                unload: vec!["".to_string()],
                active: " A ".to_string(),
                kind: RouteKind::Unspecified,
            },
        );

        let def = catalog.try_get("messy").unwrap();
        assert_eq!(def.load, vec!["A", "B"]);
        assert!(def.unload.is_empty());
        assert_eq!(def.active, "A");
    }

    #[test]
    fn test_builtin_gameplay_route() {
        let catalog = RouteCatalog::with_builtins();
        let def = catalog.try_get("gameplay").unwrap();
        assert_eq!(def.load, vec!["GameplayScene", "UIGlobalScene"]);
        assert_eq!(def.active, "GameplayScene");
        assert_eq!(def.kind, RouteKind::Gameplay);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "routes": {
                "Boot": {
                    "load": ["BootScene", "BootScene", " "],
                    "active": "BootScene",
                    "kind": "frontend"
                }
            }
        }"#;

        let catalog = RouteCatalog::from_json_str(json).unwrap();
        let def = catalog.try_get("boot").unwrap();
        assert_eq!(def.load, vec!["BootScene"]);
        assert_eq!(def.kind, RouteKind::Frontend);
        assert!(def.unload.is_empty());
    }
}
