//! Easing Curve Types
//!
//! Monotonic [0,1] → [0,1] curves for screen fade shaping.

use serde::{Deserialize, Serialize};

/// Easing curve applied to fade progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingCurve {
    /// Linear interpolation (constant rate)
    Linear,
    /// Quadratic ease-in (slow start)
    EaseInQuad,
    /// Quadratic ease-out (slow end)
    EaseOutQuad,
    /// Quadratic ease-in-out
    #[default]
    EaseInOutQuad,
    /// Cubic ease-in
    EaseInCubic,
    /// Cubic ease-out
    EaseOutCubic,
    /// Cubic ease-in-out
    EaseInOutCubic,
    /// Exponential ease-in
    EaseInExpo,
    /// Exponential ease-out
    EaseOutExpo,
    /// S-curve (sine-based)
    SCurve,
}

impl EasingCurve {
    /// Apply the curve to a linear progress value (0.0 - 1.0)
    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingCurve::Linear => t,
            EasingCurve::EaseInQuad => t * t,
            EasingCurve::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingCurve::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingCurve::EaseInCubic => t * t * t,
            EasingCurve::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingCurve::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingCurve::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    (2.0_f32).powf(10.0 * t - 10.0)
                }
            }
            EasingCurve::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - (2.0_f32).powf(-10.0 * t)
                }
            }
            EasingCurve::SCurve => (1.0 - (t * std::f32::consts::PI).cos()) / 2.0,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            EasingCurve::Linear => "Linear",
            EasingCurve::EaseInQuad => "EaseInQuad",
            EasingCurve::EaseOutQuad => "EaseOutQuad",
            EasingCurve::EaseInOutQuad => "EaseInOutQuad",
            EasingCurve::EaseInCubic => "EaseInCubic",
            EasingCurve::EaseOutCubic => "EaseOutCubic",
            EasingCurve::EaseInOutCubic => "EaseInOutCubic",
            EasingCurve::EaseInExpo => "EaseInExpo",
            EasingCurve::EaseOutExpo => "EaseOutExpo",
            EasingCurve::SCurve => "SCurve",
        }
    }

    /// All curves, for validation and sweep tests
    pub fn all() -> &'static [EasingCurve] {
        &[
            EasingCurve::Linear,
            EasingCurve::EaseInQuad,
            EasingCurve::EaseOutQuad,
            EasingCurve::EaseInOutQuad,
            EasingCurve::EaseInCubic,
            EasingCurve::EaseOutCubic,
            EasingCurve::EaseInOutCubic,
            EasingCurve::EaseInExpo,
            EasingCurve::EaseOutExpo,
            EasingCurve::SCurve,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_boundaries() {
        for curve in EasingCurve::all() {
            assert!(curve.apply(0.0).abs() < 0.001, "{:?} at 0.0", curve);
            assert!((curve.apply(1.0) - 1.0).abs() < 0.001, "{:?} at 1.0", curve);

            let mid = curve.apply(0.5);
            assert!(mid > 0.0 && mid < 1.0, "{:?} at 0.5 = {}", curve, mid);
        }
    }

    #[test]
    fn test_curve_monotonic() {
        for curve in EasingCurve::all() {
            let mut prev = 0.0;
            for i in 0..=100 {
                let t = i as f32 / 100.0;
                let val = curve.apply(t);
                assert!(
                    val >= prev - 0.0001,
                    "{:?}: {} < {} at t={}",
                    curve,
                    val,
                    prev,
                    t
                );
                prev = val;
            }
        }
    }

    #[test]
    fn test_input_clamped() {
        for curve in EasingCurve::all() {
            assert_eq!(curve.apply(-1.0), curve.apply(0.0), "{:?} below", curve);
            assert_eq!(curve.apply(2.0), curve.apply(1.0), "{:?} above", curve);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&EasingCurve::EaseInOutCubic).unwrap();
        assert_eq!(json, "\"ease_in_out_cubic\"");

        let back: EasingCurve = serde_json::from_str("\"s_curve\"").unwrap();
        assert_eq!(back, EasingCurve::SCurve);
    }
}
