//! Frame catch-up clock and per-style integration
//!
//! Physics is always stepped at the nominal interval from
//! [`MotionConfig`]. Real frames arrive whenever the host fires them, so each
//! frame:
//!
//! 1. adds the wall-clock delta to an accumulator,
//! 2. steps the ideal state once per whole nominal interval accumulated,
//! 3. steps once more to find the next ideal point and renders the linear
//!    blend between the two by the leftover fraction.
//!
//! The leftover stays in the accumulator for the next frame, so two frames of
//! `d` land on the same ideal state as one frame of `2d`.

use crate::config::MotionConfig;
use crate::stepper::step;
use crate::stop::should_stop_animation;
use crate::style::{PlainStyle, Style, StyleValue, Velocity};

/// Whole nominal frames to integrate and the leftover fraction to render
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStep {
    pub frames_to_catch_up: u32,
    /// In `[0, 1)`
    pub frame_completion: f64,
}

/// Accumulated-time clock shared by every driver
#[derive(Clone, Debug)]
pub struct FrameClock {
    config: MotionConfig,
    prev_time: f64,
    accumulated: f64,
}

impl FrameClock {
    pub fn new(config: MotionConfig, now: f64) -> Self {
        Self {
            config,
            prev_time: now,
            accumulated: 0.0,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Restart timing from `now`, used when an idle driver schedules again
    pub fn restart(&mut self, now: f64) {
        self.prev_time = now;
    }

    /// Drop any leftover time, used when a driver comes to rest
    pub fn settle(&mut self) {
        self.accumulated = 0.0;
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Account for a frame at `timestamp`.
    ///
    /// Returns `None` when there is no time to integrate: either the frame
    /// landed on the previous timestamp, or so much time passed that the
    /// clock restarted instead of catching up.
    pub fn advance(&mut self, timestamp: f64) -> Option<FrameStep> {
        let delta = (timestamp - self.prev_time).max(0.0);
        self.prev_time = timestamp;
        self.accumulated += delta;

        if self.accumulated > self.config.stall_threshold_ms() {
            tracing::debug!(
                accumulated_ms = self.accumulated,
                "frame clock stalled, restarting without catch-up"
            );
            self.accumulated = 0.0;
        }

        if self.accumulated == 0.0 {
            return None;
        }

        let interval = self.config.frame_interval_ms;
        let whole = (self.accumulated / interval).floor();
        let frame_completion = (self.accumulated - whole * interval) / interval;

        Some(FrameStep {
            frames_to_catch_up: whole as u32,
            frame_completion,
        })
    }

    /// Consume the whole frames integrated for `step`, keeping the leftover
    pub fn commit(&mut self, step: FrameStep) {
        self.accumulated -= f64::from(step.frames_to_catch_up) * self.config.frame_interval_ms;
    }
}

/// Rendered and ideal state of one style
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleState {
    /// Ideal state blended to the rendered instant
    pub current: PlainStyle,
    pub current_velocity: Velocity,
    /// State as if frames were infinitely dense, at the last whole interval
    pub ideal: PlainStyle,
    pub ideal_velocity: Velocity,
}

impl StyleState {
    /// Start at `plain` with zero velocity
    pub fn at_rest(plain: PlainStyle) -> Self {
        let velocity = plain.zeroed();
        Self::from_parts(plain, velocity)
    }

    /// Start at `plain` with a given velocity
    pub fn from_parts(plain: PlainStyle, velocity: Velocity) -> Self {
        Self {
            current: plain.clone(),
            current_velocity: velocity.clone(),
            ideal: plain,
            ideal_velocity: velocity,
        }
    }

    /// Whether `style` has fully converged from this state
    pub fn is_at_rest(&self, style: &Style) -> bool {
        should_stop_animation(&self.current, style, &self.current_velocity)
    }

    /// Apply the numeric properties of `style` right away.
    ///
    /// Used for targets that were set and then replaced before any frame
    /// read them, so their snaps are not lost.
    pub fn snap_numeric(&mut self, style: &Style) {
        for (key, value) in style.numeric() {
            self.current.insert(key, value);
            self.current_velocity.insert(key, 0.0);
            self.ideal.insert(key, value);
            self.ideal_velocity.insert(key, 0.0);
        }
    }

    /// Integrate toward `style` for one real frame.
    ///
    /// The result holds exactly the properties of `style`. Springs with no
    /// recorded state start at their target.
    pub fn advance(&self, style: &Style, frame: FrameStep, step_seconds: f64) -> StyleState {
        let mut next = StyleState {
            current: PlainStyle::with_capacity(style.len()),
            current_velocity: PlainStyle::with_capacity(style.len()),
            ideal: PlainStyle::with_capacity(style.len()),
            ideal_velocity: PlainStyle::with_capacity(style.len()),
        };

        for (key, value) in style.iter() {
            match value {
                StyleValue::Numeric(target) => {
                    next.current.insert(key, *target);
                    next.current_velocity.insert(key, 0.0);
                    next.ideal.insert(key, *target);
                    next.ideal_velocity.insert(key, 0.0);
                }
                StyleValue::Spring(spring) => {
                    let mut x = self.ideal.get(key).unwrap_or(spring.target);
                    let mut v = self.ideal_velocity.get(key).unwrap_or(0.0);
                    let advance = |x: f64, v: f64| {
                        step(
                            step_seconds,
                            x,
                            v,
                            spring.target,
                            spring.stiffness,
                            spring.damping,
                            spring.precision,
                        )
                    };

                    for _ in 0..frame.frames_to_catch_up {
                        let s = advance(x, v);
                        x = s.position;
                        v = s.velocity;
                    }
                    let upcoming = advance(x, v);

                    let t = frame.frame_completion;
                    next.current.insert(key, x + (upcoming.position - x) * t);
                    next.current_velocity.insert(key, v + (upcoming.velocity - v) * t);
                    next.ideal.insert(key, x);
                    next.ideal_velocity.insert(key, v);
                }
            }
        }

        next
    }
}
