//! Spring presets
//!
//! Stiffness/damping pairs tuned for common UI motion, plus the
//! [`spring`] constructors that turn a target into an animated style value.

use serde::{Deserialize, Serialize};

use crate::style::{SpringValue, StyleValue};

/// Precision used when none is given
pub const DEFAULT_PRECISION: f64 = 0.01;

/// Physical parameters of a spring, without its target
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    #[serde(default = "default_precision")]
    pub precision: f64,
}

fn default_precision() -> f64 {
    DEFAULT_PRECISION
}

impl SpringConfig {
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Critically damped-looking settle with no overshoot
    pub const fn no_wobble() -> Self {
        Self::new(170.0, 26.0)
    }

    /// Soft and slow
    pub const fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    /// Visible overshoot
    pub const fn wobbly() -> Self {
        Self::new(180.0, 12.0)
    }

    /// Quick, slight overshoot
    pub const fn stiff() -> Self {
        Self::new(210.0, 20.0)
    }

    /// Builder: set precision
    pub const fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::no_wobble()
    }
}

pub const NO_WOBBLE: SpringConfig = SpringConfig::no_wobble();
pub const GENTLE: SpringConfig = SpringConfig::gentle();
pub const WOBBLY: SpringConfig = SpringConfig::wobbly();
pub const STIFF: SpringConfig = SpringConfig::stiff();

/// Animate toward `target` with the default spring
pub fn spring(target: f64) -> StyleValue {
    spring_with(target, SpringConfig::default())
}

/// Animate toward `target` with a specific spring
pub fn spring_with(target: f64, config: SpringConfig) -> StyleValue {
    StyleValue::Spring(SpringValue::new(target, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spring_is_no_wobble() {
        assert_eq!(SpringConfig::default(), NO_WOBBLE);
        assert_eq!(NO_WOBBLE.stiffness, 170.0);
        assert_eq!(NO_WOBBLE.damping, 26.0);
        assert_eq!(NO_WOBBLE.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_wobbly_is_less_damped_than_stiff() {
        assert!(WOBBLY.damping < STIFF.damping);
        assert!(GENTLE.stiffness < STIFF.stiffness);
    }

    #[test]
    fn test_spring_constructor_keeps_config() {
        let value = spring_with(42.0, GENTLE.with_precision(0.5));
        match value {
            StyleValue::Spring(s) => {
                assert_eq!(s.target, 42.0);
                assert_eq!(s.stiffness, 120.0);
                assert_eq!(s.damping, 14.0);
                assert_eq!(s.precision, 0.5);
            }
            StyleValue::Numeric(_) => panic!("expected a spring value"),
        }
    }
}
