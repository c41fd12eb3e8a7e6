//! Termination detection
//!
//! Comparisons here are exact. The stepper snaps settled springs to their
//! target with zero velocity, so `==` is reachable and no tolerance is needed.

use crate::frame_clock::StyleState;
use crate::style::{PlainStyle, Style, Velocity};
use crate::transition::TransitionStyle;

/// True when every property of `style` sits exactly at its target with zero
/// velocity. Missing current values or velocities count as not converged.
pub fn should_stop_animation(current: &PlainStyle, style: &Style, velocity: &Velocity) -> bool {
    style.iter().all(|(key, value)| {
        if velocity.get(key) != Some(0.0) {
            return false;
        }
        current.get(key) == Some(value.target())
    })
}

/// Keyed collection test: the merged key order must equal the destination
/// key order, and every item must have individually converged. `states` is
/// aligned with `merged`.
pub fn should_stop_keyed<D>(
    states: &[StyleState],
    destination: &[TransitionStyle<D>],
    merged: &[TransitionStyle<D>],
) -> bool {
    if merged.len() != destination.len() || states.len() != destination.len() {
        return false;
    }
    if merged.iter().zip(destination).any(|(m, d)| m.key != d.key) {
        return false;
    }
    destination
        .iter()
        .zip(states)
        .all(|(dest, state)| state.is_at_rest(&dest.style))
}

/// Index-aligned collection test used by staggered motion
pub fn should_stop_indexed(states: &[StyleState], styles: &[Style]) -> bool {
    states.len() == styles.len()
        && styles
            .iter()
            .zip(states)
            .all(|(style, state)| state.is_at_rest(style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::spring;

    #[test]
    fn test_stops_when_all_properties_converged() {
        let style = Style::new().with("x", spring(10.0)).with("o", 1.0);
        let current = PlainStyle::new().with("x", 10.0).with("o", 1.0);
        let velocity = PlainStyle::new().with("x", 0.0).with("o", 0.0);
        assert!(should_stop_animation(&current, &style, &velocity));
    }

    #[test]
    fn test_does_not_stop_while_moving() {
        let style = Style::new().with("x", spring(10.0));
        let current = PlainStyle::new().with("x", 10.0);
        let velocity = PlainStyle::new().with("x", 0.5);
        assert!(!should_stop_animation(&current, &style, &velocity));
    }

    #[test]
    fn test_does_not_stop_short_of_target() {
        let style = Style::new().with("x", spring(10.0));
        let current = PlainStyle::new().with("x", 9.999_999);
        let velocity = PlainStyle::new().with("x", 0.0);
        assert!(!should_stop_animation(&current, &style, &velocity));
    }

    #[test]
    fn test_missing_state_is_not_converged() {
        let style = Style::new().with("x", 1.0);
        assert!(!should_stop_animation(
            &PlainStyle::new(),
            &style,
            &PlainStyle::new().with("x", 0.0)
        ));
        assert!(!should_stop_animation(
            &PlainStyle::new().with("x", 1.0),
            &style,
            &PlainStyle::new()
        ));
    }

    #[test]
    fn test_empty_style_is_stopped() {
        assert!(should_stop_animation(
            &PlainStyle::new(),
            &Style::new(),
            &PlainStyle::new()
        ));
    }

    #[test]
    fn test_keyed_requires_identical_key_order() {
        let a = TransitionStyle::new("a", (), Style::new().with("x", 1.0));
        let b = TransitionStyle::new("b", (), Style::new().with("x", 2.0));
        let states = vec![
            StyleState::at_rest(PlainStyle::new().with("x", 1.0)),
            StyleState::at_rest(PlainStyle::new().with("x", 2.0)),
        ];

        let dest = vec![a.clone(), b.clone()];
        assert!(should_stop_keyed(&states, &dest, &dest));

        let reordered = vec![b.clone(), a.clone()];
        assert!(!should_stop_keyed(&states, &dest, &reordered));

        let shorter = vec![a];
        assert!(!should_stop_keyed(&states[..1], &dest, &shorter));
    }

    #[test]
    fn test_keyed_requires_every_item_at_rest() {
        let dest = vec![
            TransitionStyle::new("a", (), Style::new().with("x", spring(1.0))),
            TransitionStyle::new("b", (), Style::new().with("x", spring(2.0))),
        ];
        let states = vec![
            StyleState::at_rest(PlainStyle::new().with("x", 1.0)),
            StyleState::from_parts(
                PlainStyle::new().with("x", 2.0),
                PlainStyle::new().with("x", 0.3),
            ),
        ];
        assert!(!should_stop_keyed(&states, &dest, &dest));
    }

    #[test]
    fn test_indexed_requires_same_length() {
        let styles = vec![Style::new().with("x", 1.0)];
        let states = vec![StyleState::at_rest(PlainStyle::new().with("x", 1.0))];
        assert!(should_stop_indexed(&states, &styles));

        let longer = vec![Style::new().with("x", 1.0), Style::new().with("x", 1.0)];
        assert!(!should_stop_indexed(&states, &longer));
    }
}
