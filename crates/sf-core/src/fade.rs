//! Fade Configuration
//!
//! Durations and easing for the screen obscure/reveal pass. A zero duration
//! is the valid "skip" state, not an error; negative durations are
//! unrepresentable by construction.

use serde::{Deserialize, Serialize};

use crate::curve::EasingCurve;

/// Fade timing and shaping for one transition style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FadeConfig {
    /// Fade-in (reveal) duration in milliseconds
    #[serde(default = "default_fade_ms")]
    pub fade_in_ms: u32,
    /// Fade-out (obscure) duration in milliseconds
    #[serde(default = "default_fade_ms")]
    pub fade_out_ms: u32,
    /// Curve sampled while revealing
    #[serde(default)]
    pub fade_in_curve: EasingCurve,
    /// Curve sampled while obscuring
    #[serde(default)]
    pub fade_out_curve: EasingCurve,
}

fn default_fade_ms() -> u32 {
    300
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 300,
            fade_out_ms: 300,
            fade_in_curve: EasingCurve::default(),
            fade_out_curve: EasingCurve::default(),
        }
    }
}

impl FadeConfig {
    /// Create a config with explicit durations and curves
    pub fn new(
        fade_in_ms: u32,
        fade_out_ms: u32,
        fade_in_curve: EasingCurve,
        fade_out_curve: EasingCurve,
    ) -> Self {
        Self {
            fade_in_ms,
            fade_out_ms,
            fade_in_curve,
            fade_out_curve,
        }
    }

    /// Same duration and curve in both directions
    pub fn symmetric(duration_ms: u32, curve: EasingCurve) -> Self {
        Self::new(duration_ms, duration_ms, curve, curve)
    }

    /// Zero-duration config: both directions resolve immediately
    pub fn instant() -> Self {
        Self::symmetric(0, EasingCurve::Linear)
    }

    /// Whether fade-in resolves without animating
    #[inline]
    pub fn skips_fade_in(&self) -> bool {
        self.fade_in_ms == 0
    }

    /// Whether fade-out resolves without animating
    #[inline]
    pub fn skips_fade_out(&self) -> bool {
        self.fade_out_ms == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_skips_both() {
        let config = FadeConfig::instant();
        assert!(config.skips_fade_in());
        assert!(config.skips_fade_out());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: FadeConfig = serde_json::from_str("{\"fade_in_ms\": 750}").unwrap();
        assert_eq!(config.fade_in_ms, 750);
        assert_eq!(config.fade_out_ms, 300);
        assert_eq!(config.fade_out_curve, EasingCurve::EaseInOutQuad);
    }

    #[test]
    fn test_symmetric() {
        let config = FadeConfig::symmetric(500, EasingCurve::SCurve);
        assert_eq!(config.fade_in_ms, 500);
        assert_eq!(config.fade_out_ms, 500);
        assert_eq!(config.fade_in_curve, EasingCurve::SCurve);
    }
}
