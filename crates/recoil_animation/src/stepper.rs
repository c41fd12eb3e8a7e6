//! Damped spring integrator
//!
//! One fixed-size step of a unit-mass spring-damper using semi-implicit
//! Euler: velocity is updated first, then position from the new velocity.

/// Position and velocity after one step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
}

impl SpringState {
    pub const fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }

    pub const fn at_rest(position: f64) -> Self {
        Self::new(position, 0.0)
    }
}

/// Advance a spring by `dt` seconds.
///
/// When both speed and distance to the target are below `precision` the
/// spring snaps to exactly `(target, 0)`. This is checked on entry and after
/// integrating, so a settled spring stays settled bit for bit and callers may
/// compare against the target with `==`.
pub fn step(
    dt: f64,
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    precision: f64,
) -> SpringState {
    if is_settled(position, velocity, target, precision) {
        return SpringState::at_rest(target);
    }

    let spring_force = -stiffness * (position - target);
    let damper_force = -damping * velocity;
    let acceleration = spring_force + damper_force;

    let new_velocity = velocity + acceleration * dt;
    let new_position = position + new_velocity * dt;

    if is_settled(new_position, new_velocity, target, precision) {
        SpringState::at_rest(target)
    } else {
        SpringState::new(new_position, new_velocity)
    }
}

#[inline]
fn is_settled(position: f64, velocity: f64, target: f64, precision: f64) -> bool {
    velocity.abs() < precision && (position - target).abs() < precision
}
