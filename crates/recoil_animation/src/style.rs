//! Style data model
//!
//! A [`Style`] is what the caller wants: each property is either a plain
//! number (snaps immediately) or a [`SpringValue`] (animates). A
//! [`PlainStyle`] is what is rendered: every property resolved to a number.
//! Velocities use the same shape as plain styles.
//!
//! Both maps keep insertion order so snapshots iterate deterministically.
//!
//! Styles serialize in the familiar shape:
//!
//! ```json
//! { "opacity": 1, "x": { "val": 100, "stiffness": 170, "damping": 26, "precision": 0.01 } }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};
use crate::presets::{SpringConfig, DEFAULT_PRECISION};

/// A spring target with its physical parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringValue {
    /// Position the spring settles at
    #[serde(rename = "val")]
    pub target: f64,
    pub stiffness: f64,
    pub damping: f64,
    #[serde(default = "default_precision")]
    pub precision: f64,
}

fn default_precision() -> f64 {
    DEFAULT_PRECISION
}

impl SpringValue {
    pub fn new(target: f64, config: SpringConfig) -> Self {
        Self {
            target,
            stiffness: config.stiffness,
            damping: config.damping,
            precision: config.precision,
        }
    }

    /// The spring's parameters without its target
    pub fn config(&self) -> SpringConfig {
        SpringConfig {
            stiffness: self.stiffness,
            damping: self.damping,
            precision: self.precision,
        }
    }

    /// Reject springs that can never settle
    pub fn validate(&self, property: &str) -> Result<()> {
        let invalid = |reason: &str| invalid_spring(property, reason);

        if !self.target.is_finite() {
            return Err(invalid("target is not finite"));
        }
        if !self.stiffness.is_finite() || self.stiffness <= 0.0 {
            return Err(invalid("stiffness must be finite and positive"));
        }
        if !self.damping.is_finite() || self.damping <= 0.0 {
            return Err(invalid("damping must be finite and positive"));
        }
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(invalid("precision must be finite and positive"));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), and also reject springs the integrator
    /// diverges on when stepped every `step_seconds`.
    ///
    /// With `a = stiffness * dt²` and `b = damping * dt`, semi-implicit Euler
    /// is stable while `a + 2b < 4`. A spring must stay within
    /// [`STABILITY_MARGIN`] of that bound. Precision must also be coarser than
    /// the speed rounding can leave behind near the target, about
    /// `eps * |target| / dt`.
    pub fn validate_for_step(&self, property: &str, step_seconds: f64) -> Result<()> {
        self.validate(property)?;

        let floor =
            PRECISION_FLOOR_ULPS * f64::EPSILON * self.target.abs().max(1.0) / step_seconds;
        if self.precision < floor {
            return Err(invalid_spring(
                property,
                &format!("precision {} is finer than {floor:e} at this step", self.precision),
            ));
        }

        let a = self.stiffness * step_seconds * step_seconds;
        let b = self.damping * step_seconds;
        if a + 2.0 * b >= 4.0 * STABILITY_MARGIN {
            return Err(invalid_spring(
                property,
                &format!(
                    "stiffness {} and damping {} diverge at a {:.3} ms step",
                    self.stiffness,
                    self.damping,
                    step_seconds * 1000.0
                ),
            ));
        }
        Ok(())
    }
}

/// Fraction of the integrator's stability bound a spring may reach
pub const STABILITY_MARGIN: f64 = 0.9;

/// Rounding steps near the target a spring's precision must clear
const PRECISION_FLOOR_ULPS: f64 = 64.0;

fn invalid_spring(property: &str, reason: &str) -> AnimationError {
    AnimationError::InvalidSpring {
        property: property.to_string(),
        reason: reason.to_string(),
    }
}

/// One property of a target style
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Snaps to the value on the next update
    Numeric(f64),
    /// Animates toward the spring's target
    Spring(SpringValue),
}

impl StyleValue {
    /// The value this property settles at
    pub fn target(&self) -> f64 {
        match self {
            StyleValue::Numeric(value) => *value,
            StyleValue::Spring(spring) => spring.target,
        }
    }

    pub fn is_spring(&self) -> bool {
        matches!(self, StyleValue::Spring(_))
    }

    pub fn validate(&self, property: &str) -> Result<()> {
        match self {
            StyleValue::Numeric(value) if !value.is_finite() => Err(AnimationError::InvalidValue {
                property: property.to_string(),
            }),
            StyleValue::Numeric(_) => Ok(()),
            StyleValue::Spring(spring) => spring.validate(property),
        }
    }

    /// [`validate`](Self::validate) against a driver's step size
    pub fn validate_for_step(&self, property: &str, step_seconds: f64) -> Result<()> {
        match self {
            StyleValue::Spring(spring) => spring.validate_for_step(property, step_seconds),
            StyleValue::Numeric(_) => self.validate(property),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Numeric(value)
    }
}

impl From<SpringValue> for StyleValue {
    fn from(spring: SpringValue) -> Self {
        StyleValue::Spring(spring)
    }
}

/// Target style: property name to number-or-spring
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(IndexMap<String, StyleValue>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a property
    pub fn with(mut self, property: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.0.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Properties that snap rather than animate
    pub fn numeric(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter_map(|(k, v)| match v {
            StyleValue::Numeric(value) => Some((k, *value)),
            StyleValue::Spring(_) => None,
        })
    }

    /// Resolve every property to its destination value
    pub fn strip(&self) -> PlainStyle {
        self.iter().map(|(k, v)| (k, v.target())).collect()
    }

    /// Same properties, all zero
    pub fn zeroed(&self) -> PlainStyle {
        self.keys().map(|k| (k, 0.0)).collect()
    }

    /// Reject non-finite numbers and springs that cannot settle
    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(|(k, v)| v.validate(k))
    }

    /// Like [`validate`](Self::validate), and also reject springs that
    /// diverge when stepped every `step_seconds`
    pub fn validate_for_step(&self, step_seconds: f64) -> Result<()> {
        self.iter()
            .try_for_each(|(k, v)| v.validate_for_step(k, step_seconds))
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&PlainStyle> for Style {
    fn from(plain: &PlainStyle) -> Self {
        plain.iter().collect()
    }
}

/// Resolved style: property name to number
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlainStyle(IndexMap<String, f64>);

/// Per-property velocity, parallel to a [`PlainStyle`]
pub type Velocity = PlainStyle;

impl PlainStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Builder: set a property
    pub fn with(mut self, property: impl Into<String>, value: f64) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: impl Into<String>, value: f64) {
        self.0.insert(property.into(), value);
    }

    pub fn get(&self, property: &str) -> Option<f64> {
        self.0.get(property).copied()
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Same properties, all zero
    pub fn zeroed(&self) -> PlainStyle {
        self.keys().map(|k| (k, 0.0)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        match self.iter().find(|(_, v)| !v.is_finite()) {
            Some((k, _)) => Err(AnimationError::InvalidValue {
                property: k.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PlainStyle {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
