//! # sf-catalog — SceneForge Route & Style Catalogs
//!
//! Static lookup tables resolved once per transition request:
//! - **Routes** map a route id to the scene units to load/unload and the
//!   target active unit.
//! - **Styles** map a style id to a fade profile (durations, easing,
//!   use-fade flag).
//!
//! Ids are normalized (trim + ASCII case-fold) at insert and lookup, so
//! lookups are case-insensitive. An unknown id is `None`, never an error;
//! whether that is fatal is the caller's decision.

pub mod route;
pub mod style;

pub use route::{RouteCatalog, RouteDefinition, RouteKind};
pub use style::{StyleCatalog, StyleDefinition};

/// Normalize a catalog id: trim and ASCII case-fold
pub(crate) fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

/// Sanitize a scene list: trim entries, drop blanks, collapse duplicates,
/// preserve first-occurrence order. Applied to route definitions at
/// registration and to transition requests at construction.
pub fn sanitize_scene_list(list: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    list.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("  Gameplay "), "gameplay");
        assert_eq!(normalize_id("FRONTEND"), "frontend");
    }

    #[test]
    fn test_sanitize_scene_list_drops_blanks_and_duplicates() {
        let raw = vec![
            "GameplayScene".to_string(),
            "  ".to_string(),
            "UIGlobalScene".to_string(),
            "".to_string(),
            "GameplayScene".to_string(),
            " UIGlobalScene".to_string(),
        ];
        assert_eq!(
            sanitize_scene_list(raw),
            vec!["GameplayScene".to_string(), "UIGlobalScene".to_string()]
        );
    }
}
