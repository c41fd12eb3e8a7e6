//! Recoil Animation Engine
//!
//! Spring-driven styles that stay in sync with wall-clock time, and keyed
//! lists that animate items in and out as the list changes.
//!
//! # Features
//!
//! - **Springs**: damped springs stepped at a fixed nominal rate, snapping
//!   exactly to rest so convergence is an equality check
//! - **Frame catch-up**: physics runs in whole nominal frames and rendered
//!   values are blended by the leftover fraction, independent of display rate
//! - **Keyed transitions**: a merge-diff keeps leaving items in place while
//!   they animate out, with caller policies for enter and leave
//! - **Staggered chains**: targets recomputed every frame from the previous
//!   frame's values
//!
//! # Example
//!
//! ```rust
//! use recoil_animation::{spring, Motion, PlainStyle, Style};
//! use recoil_core::ManualHost;
//!
//! let host = ManualHost::new();
//! let mut motion = Motion::builder(Style::new().with("x", spring(100.0)))
//!     .default_style(PlainStyle::new().with("x", 0.0))
//!     .mount(host.clone())
//!     .unwrap();
//!
//! while motion.pending_frame().is_some() {
//!     let now = host.advance(1000.0 / 60.0);
//!     motion.tick(now);
//! }
//! assert_eq!(motion.current_style().get("x"), Some(100.0));
//! ```

pub mod config;
pub mod error;
pub mod frame_clock;
pub mod merge;
pub mod motion;
pub mod presets;
pub mod staggered;
pub mod stepper;
pub mod stop;
pub mod style;
pub mod transition;

pub use config::MotionConfig;
pub use error::{AnimationError, PolicyError, PolicyResult, Result};
pub use frame_clock::{FrameClock, FrameStep, StyleState};
pub use merge::{ensure_unique_keys, merge_diff, Keyed};
pub use motion::{FrameListener, Motion, MotionBuilder, RestListener};
pub use presets::{
    spring, spring_with, SpringConfig, DEFAULT_PRECISION, GENTLE, NO_WOBBLE, STIFF, WOBBLY,
};
pub use staggered::{StaggeredFrameListener, StaggeredMotion, StaggeredMotionBuilder, StylesFn};
pub use stepper::{step, SpringState};
pub use stop::{should_stop_animation, should_stop_indexed, should_stop_keyed};
pub use style::{PlainStyle, SpringValue, Style, StyleValue, Velocity, STABILITY_MARGIN};
pub use transition::{
    DefaultTransitionPolicy, ListFrameListener, TransitionMotion, TransitionMotionBuilder,
    TransitionPlainStyle, TransitionPolicy, TransitionStyle,
};
